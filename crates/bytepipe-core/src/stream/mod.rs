//! Input and output endpoints.
//!
//! An [`Endpoint`] names one side of a transfer: either an explicit
//! filesystem path or the process's standard stream. Opening an endpoint
//! yields an [`InputStream`] or [`OutputStream`] that owns the underlying
//! handle, so dropping it releases the resource on every exit path.
//!
//! ## Same-file detection
//!
//! Copying a regular file onto itself would truncate the input before the
//! first read. [`ensure_distinct`] compares the identity of the opened input
//! with the output target *before* the output is opened for writing.
//! Terminals, pipes and devices are never compared: `bytepipe` on an
//! interactive terminal reads and writes the same tty on purpose.

use std::fmt;
use std::fs::{File, Metadata};
use std::io::{self, Read, StdinLock, StdoutLock, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One side of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    /// Standard input (as a source) or standard output (as a sink)
    #[default]
    Standard,
    /// A filesystem path
    Path(PathBuf),
}

impl Endpoint {
    /// Build an endpoint from an optional command-line argument.
    ///
    /// A missing argument or the conventional `-` selects the standard stream.
    #[must_use]
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            None => Self::Standard,
            Some(path) if path.as_os_str() == "-" => Self::Standard,
            Some(path) => Self::Path(path.to_path_buf()),
        }
    }

    /// The explicit path, if this endpoint names one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Standard => None,
            Self::Path(path) => Some(path),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("-"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// An opened source of bytes.
#[derive(Debug)]
pub enum InputStream {
    /// Locked standard input
    Stdin(StdinLock<'static>),
    /// A regular file, device or named pipe opened read-only
    File(File),
}

impl InputStream {
    /// Open `endpoint` for reading.
    pub fn open(endpoint: &Endpoint) -> Result<Self> {
        match endpoint {
            Endpoint::Standard => Ok(Self::Stdin(io::stdin().lock())),
            Endpoint::Path(path) => File::open(path).map(Self::File).map_err(|source| {
                Error::OpenInput {
                    path: endpoint.to_string(),
                    source,
                }
            }),
        }
    }

    fn identity(&self, endpoint: &Endpoint) -> Option<FileIdentity> {
        let metadata = match self {
            Self::File(file) => file.metadata().ok()?,
            Self::Stdin(lock) => standard_metadata(lock)?,
        };
        FileIdentity::of(&metadata, endpoint.path())
    }
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stdin(lock) => lock.read(buf),
            Self::File(file) => file.read(buf),
        }
    }
}

/// An opened sink for bytes.
#[derive(Debug)]
pub enum OutputStream {
    /// Locked standard output
    Stdout(StdoutLock<'static>),
    /// A file created or truncated for writing
    File(File),
}

impl OutputStream {
    /// Open `endpoint` for writing, creating or truncating a file path.
    pub fn create(endpoint: &Endpoint) -> Result<Self> {
        match endpoint {
            Endpoint::Standard => Ok(Self::Stdout(io::stdout().lock())),
            Endpoint::Path(path) => File::create(path).map(Self::File).map_err(|source| {
                Error::OpenOutput {
                    path: endpoint.to_string(),
                    source,
                }
            }),
        }
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(lock) => lock.write(buf),
            Self::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(lock) => lock.flush(),
            Self::File(file) => file.flush(),
        }
    }
}

/// Reject a transfer whose output would overwrite the already-opened input.
///
/// Must run before the output endpoint is opened, since opening truncates.
pub fn ensure_distinct(
    input: &InputStream,
    input_ep: &Endpoint,
    output_ep: &Endpoint,
) -> Result<()> {
    let Some(input_id) = input.identity(input_ep) else {
        return Ok(());
    };
    let Some(output_id) = output_identity(output_ep) else {
        return Ok(());
    };

    if input_id == output_id {
        let path = output_ep
            .path()
            .or_else(|| input_ep.path())
            .map_or_else(|| PathBuf::from("-"), Path::to_path_buf);
        return Err(Error::SameFile(path));
    }
    Ok(())
}

fn output_identity(endpoint: &Endpoint) -> Option<FileIdentity> {
    match endpoint {
        Endpoint::Path(path) => {
            let metadata = std::fs::metadata(path).ok()?;
            FileIdentity::of(&metadata, Some(path))
        }
        Endpoint::Standard => {
            let stdout = io::stdout();
            let metadata = standard_metadata(&stdout)?;
            FileIdentity::of(&metadata, None)
        }
    }
}

/// Identity of a regular file, comparable across independently opened handles.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileIdentity {
    #[cfg(unix)]
    Inode { dev: u64, ino: u64 },
    #[cfg(not(unix))]
    Canonical(PathBuf),
}

impl FileIdentity {
    #[cfg(unix)]
    fn of(metadata: &Metadata, _path: Option<&Path>) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;

        metadata.is_file().then(|| Self::Inode {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn of(metadata: &Metadata, path: Option<&Path>) -> Option<Self> {
        if !metadata.is_file() {
            return None;
        }
        path.and_then(|p| p.canonicalize().ok()).map(Self::Canonical)
    }
}

/// Metadata of whatever a standard stream is redirected to.
#[cfg(unix)]
fn standard_metadata(stream: &impl std::os::fd::AsFd) -> Option<Metadata> {
    let owned = stream.as_fd().try_clone_to_owned().ok()?;
    File::from(owned).metadata().ok()
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn standard_metadata<T>(_stream: &T) -> Option<Metadata> {
    None
}
