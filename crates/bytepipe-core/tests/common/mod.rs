//! Fixtures for copy tests against real files.

use std::path::PathBuf;

use bytepipe_core::copy::{copy, CopyEvent};
use bytepipe_core::stream::Endpoint;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// A scratch directory holding one source file and a destination path.
///
/// The destination does not exist until something writes it. Both go away
/// with the fixture.
pub struct CopyFixture {
    pub dir: tempfile::TempDir,
    pub src: PathBuf,
    pub dst: PathBuf,
}

impl CopyFixture {
    /// Fixture whose source file holds `content`.
    pub fn new(content: &[u8]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        std::fs::write(&src, content).expect("Failed to write source file");
        Self { dir, src, dst }
    }

    pub fn input(&self) -> Endpoint {
        Endpoint::Path(self.src.clone())
    }

    pub fn output(&self) -> Endpoint {
        Endpoint::Path(self.dst.clone())
    }

    /// Copy source to destination, collecting every event.
    pub fn run(&self) -> (bytepipe_core::Result<u64>, Vec<CopyEvent>) {
        run(&self.input(), &self.output())
    }

    /// Bytes currently in the destination file.
    pub fn copied(&self) -> Vec<u8> {
        std::fs::read(&self.dst).expect("Failed to read destination file")
    }
}

/// Copy between two endpoints, collecting every event.
pub fn run(input: &Endpoint, output: &Endpoint) -> (bytepipe_core::Result<u64>, Vec<CopyEvent>) {
    let mut events = Vec::new();
    let result = copy(input, output, |e| events.push(*e));
    (result, events)
}

/// Reproducible pseudo-random payload of `len` bytes.
pub fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill_bytes(&mut bytes);
    bytes
}

/// Sizes of the chunk events, in order.
pub fn chunk_sizes(events: &[CopyEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            CopyEvent::Chunk { size, .. } => Some(*size),
            _ => None,
        })
        .collect()
}
