use crate::domain::UserId;
use crate::domain::event::{Action, EventKind, InboundEvent, Location};
use crate::error::{BotError, Result};
use serde::Deserialize;
use std::io::Read;

/// One scripted event as it appears in the CSV file.
#[derive(Debug, Deserialize)]
struct EventRecord {
    user: UserId,
    #[serde(default)]
    handle: Option<String>,
    kind: String,
    #[serde(default)]
    payload: String,
}

impl TryFrom<EventRecord> for InboundEvent {
    type Error = BotError;

    fn try_from(record: EventRecord) -> Result<Self> {
        let kind = match record.kind.to_ascii_lowercase().as_str() {
            "text" => EventKind::Text(record.payload),
            "location" => EventKind::Location(record.payload.parse::<Location>()?),
            "photo" => EventKind::Photo {
                file_id: record.payload,
            },
            "document" => EventKind::Document {
                file_id: record.payload,
            },
            "button" => EventKind::Button(record.payload.parse::<Action>()?),
            other => {
                return Err(BotError::InvalidEvent(format!(
                    "unknown event kind: {:?}",
                    other
                )));
            }
        };
        Ok(InboundEvent {
            user: record.user,
            handle: record.handle.filter(|h| !h.is_empty()),
            kind,
        })
    }
}

/// Reads inbound events from a CSV source with the header `user,handle,kind,payload`.
///
/// Locations are given as a quoted `"lat,lon"` payload, buttons by their callback data.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    /// Creates a new `EventReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and converts events.
    ///
    /// A malformed row yields an error for that row only; reading continues with the next one.
    pub fn events(self) -> impl Iterator<Item = Result<InboundEvent>> {
        self.reader
            .into_deserialize::<EventRecord>()
            .map(|result| result.map_err(BotError::from).and_then(InboundEvent::try_from))
    }
}
