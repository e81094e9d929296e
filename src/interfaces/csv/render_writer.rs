use crate::domain::UserId;
use crate::domain::event::{Keyboard, Render, RenderBody};
use crate::error::{BotError, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct RenderRecord {
    user: UserId,
    kind: &'static str,
    text: String,
    media: String,
    keyboard: String,
}

impl From<&Render> for RenderRecord {
    fn from(render: &Render) -> Self {
        let (kind, text, media) = match &render.body {
            RenderBody::Text(text) => ("text", text.clone(), String::new()),
            RenderBody::Photo { path, caption } => {
                ("photo", caption.clone(), path.display().to_string())
            }
            RenderBody::Album(items) => (
                "album",
                items
                    .iter()
                    .map(|item| item.caption.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
                items
                    .iter()
                    .map(|item| item.path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(";"),
            ),
        };
        Self {
            user: render.user,
            kind,
            text,
            media,
            keyboard: render.keyboard.as_ref().map(encode_keyboard).unwrap_or_default(),
        }
    }
}

/// Inline buttons are written as `[label](callback)`, space separated, rows joined by ` ; `.
pub fn encode_keyboard(keyboard: &Keyboard) -> String {
    match keyboard {
        Keyboard::Inline(rows) => rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|choice| format!("[{}]({})", choice.label, choice.action))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join(" ; "),
        Keyboard::MainMenu => "main_menu".to_string(),
        Keyboard::RequestLocation => "request_location".to_string(),
        Keyboard::Remove => "remove".to_string(),
    }
}

/// Writes outbound renders as CSV (`user,kind,text,media,keyboard`).
pub struct RenderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RenderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_render(&mut self, render: &Render) -> Result<()> {
        self.writer.serialize(RenderRecord::from(render))?;
        Ok(())
    }

    pub fn write_renders<'a>(
        &mut self,
        renders: impl IntoIterator<Item = &'a Render>,
    ) -> Result<()> {
        for render in renders {
            self.write_render(render)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| BotError::IoError(e.into_error()))
    }
}
