//! bytepipe CLI - chunked byte-stream copier with timestamped diagnostics
//!
//! Copies an input stream to an output stream 4 KiB at a time and reports
//! every chunk on stderr, so a long-running transfer can be watched without
//! touching the data path.
//!
//! ## Quick Start
//!
//! ```bash
//! # Copy a file
//! bytepipe disk.img backup.img
//!
//! # Watch a pipe
//! cat /dev/urandom | bytepipe > /dev/null
//!
//! # Send stdin to a local service and print its reply
//! echo ping | bytepipe --bridge 8080
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod commands;
mod diag;

use commands::{Cli, Mode};

fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.into_mode() {
        Mode::Copy(args) => commands::copy::run(&args),
        Mode::Bridge(args) => commands::bridge::run(args),
        Mode::Probe(args) => commands::probe::run(&args),
        Mode::Config(action) => commands::config::run(action),
        Mode::Completions(shell) => {
            commands::completions::run(shell);
            Ok(())
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,bytepipe=info,bytepipe_core=info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .event_format(diag::DiagnosticFormat::new(bytepipe_core::TOOL_NAME))
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
