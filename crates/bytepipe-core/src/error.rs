//! Error types for bytepipe.
//!
//! This module provides a unified error type for all bytepipe operations,
//! with specific error variants for different failure modes.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized `Result` type for bytepipe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for bytepipe.
#[derive(Error, Debug)]
pub enum Error {
    /// Input stream could not be opened
    #[error("cannot open input stream '{path}': {source}")]
    OpenInput {
        /// Display form of the input endpoint
        path: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Output stream could not be opened
    #[error("cannot open output stream '{path}': {source}")]
    OpenOutput {
        /// Display form of the output endpoint
        path: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Input and output resolve to the same regular file
    #[error("input and output are the same file: {0}")]
    SameFile(PathBuf),

    /// Reading from the input failed mid-transfer
    #[error("read failed after {transferred} bytes: {source}")]
    Read {
        /// Bytes written to the output before the failing read
        transferred: u64,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Writing to the output failed mid-transfer
    #[error("write failed after {transferred} bytes: {source}")]
    Write {
        /// Bytes the output accepted before the failure, including any
        /// leading part of the chunk that failed
        transferred: u64,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Connecting the bridge socket failed
    #[error("cannot connect to {addr}: {source}")]
    Connect {
        /// Address the bridge tried to reach
        addr: SocketAddr,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Address could not be resolved
    #[error("cannot resolve address '{0}'")]
    Resolve(String),

    /// Port probing failed
    #[error("port probe failed: {0}")]
    Probe(String),

    /// Operation is not available on this platform
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    /// Configuration file error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns how many bytes reached the output before a mid-transfer
    /// failure, if this error happened mid-transfer.
    #[must_use]
    pub const fn transferred(&self) -> Option<u64> {
        match self {
            Self::Read { transferred, .. } | Self::Write { transferred, .. } => Some(*transferred),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transferred_only_for_mid_stream_errors() {
        let err = Error::Write {
            transferred: 8192,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
        };
        assert_eq!(err.transferred(), Some(8192));

        let err = Error::OpenInput {
            path: "missing.bin".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.transferred(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = Error::SameFile(PathBuf::from("/tmp/data.bin"));
        assert_eq!(
            err.to_string(),
            "input and output are the same file: /tmp/data.bin"
        );

        let err = Error::Unsupported("listing socket owners");
        assert_eq!(
            err.to_string(),
            "listing socket owners is not supported on this platform"
        );
    }
}
