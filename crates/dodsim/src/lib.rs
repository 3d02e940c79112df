//! # DODSIM Driver
//!
//! Headless frame loop around [`dodsim_core`]. Loads a [`DriverConfig`],
//! picks a storage backend, steps it frame after frame and hands each render
//! feed to a [`RenderSink`](dodsim_core::RenderSink).
//!
//! ## Example
//!
//! ```rust,ignore
//! use dodsim::{run_fixed, ChecksumSink, DriverConfig};
//!
//! let config = DriverConfig::from_path("dodsim.toml")?;
//! let mut sink = ChecksumSink::new();
//! let summary = run_fixed(&config, 1.0 / 60.0, &mut sink)?;
//! println!("{} frames, crc {:08x}", summary.frames, sink.checksum());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod runner;
pub mod sink;
pub mod stats;

pub use config::{DriverConfig, DEFAULT_MAX_SPRITE_COUNT};
pub use error::{DriverError, DriverResult};
pub use runner::{run, run_fixed, run_with_clock, FrameClock, RunSummary};
pub use sink::{ChecksumSink, NullSink, StatsSink};
pub use stats::UpdateStats;
