//! # Render Sinks
//!
//! Headless consumers of the per-frame feed. Nothing here draws; they stand
//! in for the renderer so runs can be timed and fingerprinted.

use std::fmt;

use dodsim_core::{RenderRecord, RenderSink};

/// Discards every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn consume(&mut self, _records: &[RenderRecord]) {}
}

/// Counts frames and records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSink {
    /// Frames consumed.
    pub frames: u64,
    /// Records consumed over all frames.
    pub records: u64,
    /// Records in the last frame.
    pub last_frame_records: usize,
}

impl RenderSink for StatsSink {
    fn consume(&mut self, records: &[RenderRecord]) {
        self.frames += 1;
        self.records += records.len() as u64;
        self.last_frame_records = records.len();
    }
}

/// CRC32 fingerprint of the feed.
///
/// Two runs with the same config and the same delta times must end with
/// the same checksum, whatever the storage layout.
#[derive(Clone, Default)]
pub struct ChecksumSink {
    running: crc32fast::Hasher,
    last_frame: u32,
    frames: u64,
}

impl ChecksumSink {
    /// Creates a sink with an empty checksum.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checksum over every frame consumed so far.
    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.running.clone().finalize()
    }

    /// Checksum of the last frame alone.
    #[must_use]
    pub fn last_frame_checksum(&self) -> u32 {
        self.last_frame
    }

    /// Frames consumed.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl fmt::Debug for ChecksumSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChecksumSink")
            .field("checksum", &format_args!("{:08x}", self.checksum()))
            .field("frames", &self.frames)
            .finish()
    }
}

impl RenderSink for ChecksumSink {
    fn consume(&mut self, records: &[RenderRecord]) {
        let bytes: &[u8] = bytemuck::cast_slice(records);
        self.running.update(bytes);
        self.last_frame = crc32fast::hash(bytes);
        self.frames += 1;
    }
}
