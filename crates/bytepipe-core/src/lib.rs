//! # bytepipe Core Library
//!
//! `bytepipe-core` provides the building blocks of the `bytepipe` tool: a
//! `dd`-style chunked stream copier that reports progress through observer
//! events, plus two small network diagnostics built on the same loop.
//!
//! ## Modules
//!
//! - [`bridge`] - Forward a byte stream through a TCP socket and back
//! - [`clock`] - Nanosecond timestamps for diagnostic lines
//! - [`config`] - Configuration management
//! - [`copy`] - The chunked stream copier and its events
//! - [`probe`] - Ephemeral port collision probing
//! - [`stream`] - Input/output endpoints (paths or standard streams)
//!
//! ## Example
//!
//! ```rust,no_run
//! use bytepipe_core::copy::copy;
//! use bytepipe_core::stream::Endpoint;
//!
//! let input = Endpoint::from_arg(Some("in.bin".as_ref()));
//! let output = Endpoint::Standard;
//! let total = copy(&input, &output, |event| eprintln!("{event}"))?;
//! assert!(total > 0);
//! # Ok::<(), bytepipe_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]

pub mod bridge;
pub mod clock;
pub mod config;
pub mod copy;
pub mod error;
pub mod probe;
pub mod stream;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name printed in the tool slot of every diagnostic line
pub const TOOL_NAME: &str = "bytepipe";

/// Size of one chunk moved per read/write cycle (4 KiB)
pub const CHUNK_SIZE: usize = 4096;

/// Default number of probe iterations
pub const DEFAULT_PROBE_ITERATIONS: u32 = 10_000;

/// Default probe progress interval
pub const DEFAULT_PROBE_REPORT_EVERY: u32 = 100;

/// Default host the bridge connects to
pub const DEFAULT_BRIDGE_HOST: &str = "127.0.0.1";
