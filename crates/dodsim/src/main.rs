//! # DODSIM
//!
//! Headless runner for the sprite simulation.
//!
//! ```bash
//! # Reference scene, 1024 frames, struct-of-arrays layout
//! dodsim --frames 1024
//!
//! # Same scene on the object layout, fingerprinted
//! dodsim --backend object --frames 256 --fixed-dt 0.016 --checksum
//!
//! # From a config file, with more logging
//! RUST_LOG=debug dodsim --config dodsim.toml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dodsim::{run_with_clock, ChecksumSink, DriverConfig, DriverResult, FrameClock, StatsSink};
use dodsim_core::BackendKind;
use tracing::{error, info};

/// Headless DODSIM runner
#[derive(Parser, Debug)]
#[command(name = "dodsim")]
#[command(about = "Run the sprite simulation without a window and report update times")]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Storage layout: soa or object
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Stop after this many frames (default: run until killed)
    #[arg(long)]
    frames: Option<u64>,

    /// Number of moving avoiders
    #[arg(long)]
    objects: Option<usize>,

    /// Number of avoid-targets
    #[arg(long)]
    targets: Option<usize>,

    /// Population seed
    #[arg(long)]
    seed: Option<u64>,

    /// Fixed delta time in seconds instead of the wall clock
    #[arg(long)]
    fixed_dt: Option<f32>,

    /// Print a CRC32 of every emitted record when done
    #[arg(long)]
    checksum: bool,
}

impl Args {
    fn driver_config(&self) -> DriverResult<DriverConfig> {
        let mut config = match &self.config {
            Some(path) => DriverConfig::from_path(path)?,
            None => DriverConfig::default(),
        };
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(frames) = self.frames {
            config.frames = Some(frames);
        }
        if let Some(objects) = self.objects {
            config.simulation.object_count = objects;
        }
        if let Some(targets) = self.targets {
            config.simulation.avoid_target_count = targets;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        Ok(config)
    }

    fn clock(&self) -> FrameClock {
        self.fixed_dt.map_or(FrameClock::Wall, FrameClock::Fixed)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "dodsim failed");
            ExitCode::FAILURE
        }
    }
}

fn execute(args: &Args) -> DriverResult<()> {
    let config = args.driver_config()?;
    info!(
        backend = %config.backend,
        objects = config.simulation.object_count,
        targets = config.simulation.avoid_target_count,
        seed = config.simulation.seed,
        "starting"
    );

    if args.checksum {
        let mut sink = ChecksumSink::new();
        let summary = run_with_clock(&config, args.clock(), &mut sink)?;
        info!(?summary, "done");
        println!("{:08x}", sink.checksum());
    } else {
        let mut sink = StatsSink::default();
        let summary = run_with_clock(&config, args.clock(), &mut sink)?;
        info!(?summary, records = sink.records, "done");
    }
    Ok(())
}
