//! Bridge command implementation.

use std::io;

use anyhow::{Context, Result};

use bytepipe_core::bridge::{self, Direction};
use bytepipe_core::copy::CopyEvent;

use super::BridgeArgs;

/// Run the bridge command.
pub fn run(args: BridgeArgs) -> Result<()> {
    let host = args.host.unwrap_or_else(|| super::load_config().bridge.host);

    let stream = bridge::connect(&host, args.port)
        .with_context(|| format!("Failed to connect to {}:{}", host, args.port))?;
    tracing::info!("Connected to {}:{}", host, args.port);

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();

    let report = bridge::bridge(stream, &mut input, &mut output, log_event)
        .context("Bridge session failed")?;

    tracing::info!(
        "Bridge closed, sent {} bytes, received {} bytes",
        report.sent,
        report.received
    );
    Ok(())
}

fn log_event(direction: Direction, event: &CopyEvent) {
    tracing::info!("{direction}: {event}");
}
