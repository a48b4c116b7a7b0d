//! The chunked stream copier.
//!
//! [`copy`] opens two [`Endpoint`]s and moves bytes between them in chunks of
//! at most [`CHUNK_SIZE`] bytes. Every step is reported to an observer as a
//! [`CopyEvent`]; the observer decides where diagnostics go, so they never
//! mix with the data path.
//!
//! ## Lifecycle
//!
//! ```text
//! Unopened -> InputOpen -> BothOpen -> (Copying)* -> Closed
//! ```
//!
//! Streams are owned by the call and dropped in reverse order of
//! acquisition, whether the loop ends at end-of-input or on an error.

use std::fmt;
use std::io::{self, ErrorKind, Read, Write};

use crate::error::{Error, Result};
use crate::stream::{ensure_distinct, Endpoint, InputStream, OutputStream};
use crate::CHUNK_SIZE;

/// A progress event emitted during a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyEvent {
    /// About to open the input endpoint
    OpeningInput,
    /// Input endpoint is open
    OpenedInput,
    /// About to open the output endpoint
    OpeningOutput,
    /// Output endpoint is open
    OpenedOutput,
    /// One chunk has been written in full
    Chunk {
        /// Length of the chunk just written
        size: usize,
        /// Running total including this chunk
        total: u64,
    },
    /// End of input reached
    Finished {
        /// Total bytes copied
        total: u64,
    },
}

impl fmt::Display for CopyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpeningInput => f.write_str("Opening input stream"),
            Self::OpenedInput => f.write_str("Opened input stream"),
            Self::OpeningOutput => f.write_str("Opening output stream"),
            Self::OpenedOutput => f.write_str("Opened output stream"),
            Self::Chunk { size, total } => write!(f, "Transferred {size} bytes, total {total}"),
            Self::Finished { total } => write!(f, "Transferred total {total} bytes"),
        }
    }
}

/// Copy `input` to `output`, returning the number of bytes transferred.
///
/// Fails before any byte moves when either endpoint cannot be opened or when
/// both name the same regular file. A failure mid-stream leaves the output
/// holding whatever was written so far.
pub fn copy<F>(input: &Endpoint, output: &Endpoint, mut observer: F) -> Result<u64>
where
    F: FnMut(&CopyEvent),
{
    observer(&CopyEvent::OpeningInput);
    let mut reader = InputStream::open(input)?;
    tracing::debug!("Opened input {}", input);
    observer(&CopyEvent::OpenedInput);

    ensure_distinct(&reader, input, output)?;

    observer(&CopyEvent::OpeningOutput);
    let mut writer = OutputStream::create(output)?;
    tracing::debug!("Opened output {}", output);
    observer(&CopyEvent::OpenedOutput);

    copy_stream(&mut reader, &mut writer, observer)
}

/// Copy from an already-open reader to an already-open writer.
///
/// Reads up to [`CHUNK_SIZE`] bytes at a time; a zero-length read ends the
/// loop. Each chunk is written and flushed before the next read.
pub fn copy_stream<R, W, F>(reader: &mut R, writer: &mut W, mut observer: F) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: FnMut(&CopyEvent),
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let size = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::Read {
                    transferred: total,
                    source,
                })
            }
        };

        write_chunk(writer, &buf[..size], &mut total)?;
        observer(&CopyEvent::Chunk { size, total });
    }

    observer(&CopyEvent::Finished { total });
    Ok(total)
}

/// Write one chunk in full and flush it, adding every accepted byte to
/// `total` as it lands so a failure reports what the output really holds.
fn write_chunk<W>(writer: &mut W, mut chunk: &[u8], total: &mut u64) -> Result<()>
where
    W: Write + ?Sized,
{
    let failed = |transferred: u64, source| Error::Write {
        transferred,
        source,
    };

    while !chunk.is_empty() {
        match writer.write(chunk) {
            Ok(0) => {
                return Err(failed(
                    *total,
                    io::Error::new(ErrorKind::WriteZero, "output accepted no bytes"),
                ))
            }
            Ok(n) => {
                *total += n as u64;
                chunk = &chunk[n..];
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(source) => return Err(failed(*total, source)),
        }
    }

    writer.flush().map_err(|source| failed(*total, source))
}
