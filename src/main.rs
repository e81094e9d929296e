use checkout_bot::application::bot::OrderBot;
use checkout_bot::config::BotConfig;
use checkout_bot::domain::ports::OperatorChannelBox;
use checkout_bot::infrastructure::operator_log::LogOperatorChannel;
use checkout_bot::interfaces::csv::event_reader::EventReader;
use checkout_bot::interfaces::csv::order_writer::OrderWriter;
use checkout_bot::interfaces::csv::render_writer::RenderWriter;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the rendered CSV.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = BotConfig::parse();

    let catalog = Arc::new(config.catalog());
    let store = config.order_store().into_diagnostic()?;
    let channel: OperatorChannelBox = Box::new(LogOperatorChannel::new(config.operator_chat));
    let bot = OrderBot::new(catalog, store, channel, config.settings());

    // Replay events in file order
    let file = File::open(&config.input).into_diagnostic()?;
    let reader = EventReader::new(file);
    let stdout = io::stdout();
    let mut writer = RenderWriter::new(stdout.lock());
    for event_result in reader.events() {
        match event_result {
            Ok(event) => {
                let renders = bot.handle(event).await;
                writer.write_renders(&renders).into_diagnostic()?;
            }
            Err(e) => {
                eprintln!("Error reading event: {}", e);
            }
        }
    }

    if let Some(path) = &config.orders_out {
        let orders = bot.orders().await.into_diagnostic()?;
        let file = File::create(path).into_diagnostic()?;
        let mut order_writer = OrderWriter::new(file);
        order_writer.write_orders(&orders).into_diagnostic()?;
    }

    Ok(())
}
