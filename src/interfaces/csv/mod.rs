//! Scripted transport: inbound events are replayed from CSV and outbound renders
//! and committed orders are written back as CSV.

pub mod event_reader;
pub mod order_writer;
pub mod render_writer;
