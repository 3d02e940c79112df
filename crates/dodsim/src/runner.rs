//! # Frame Loop
//!
//! ```text
//! initialize (timed)
//! loop:
//!     time, dt   <- wall clock, or a fixed step
//!     records    <- backend.step(time, dt)      (timed)
//!     sink.consume(records)
//!     report mean update time at frames 8, 16, 32, ...
//! shutdown
//! ```

use std::time::Instant;

use dodsim_core::{Backend, BackendKind, RenderSink};
use tracing::{error, info};

use crate::config::DriverConfig;
use crate::error::DriverResult;
use crate::stats::UpdateStats;

/// How each frame's delta time is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameClock {
    /// Seconds elapsed since the previous frame.
    Wall,
    /// The same step every frame; runs are reproducible.
    Fixed(f32),
}

/// Outcome of a finished run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Layout that ran.
    pub backend: BackendKind,
    /// Frames stepped.
    pub frames: u64,
    /// Entities in the store.
    pub entities: usize,
    /// Records in the last frame.
    pub last_frame_records: usize,
    /// Time spent in `initialize`, in milliseconds.
    pub init_ms: f64,
    /// Mean update time over the run, in milliseconds.
    pub mean_update_ms: f64,
}

/// Runs with wall-clock delta times.
///
/// # Errors
///
/// Fails on an invalid config or any simulation error.
pub fn run(config: &DriverConfig, sink: &mut dyn RenderSink) -> DriverResult<RunSummary> {
    run_with_clock(config, FrameClock::Wall, sink)
}

/// Runs with a fixed delta time, so two runs of the same config emit the
/// same feed.
///
/// # Errors
///
/// Fails on an invalid config, an invalid `delta_time`, or any simulation
/// error.
pub fn run_fixed(
    config: &DriverConfig,
    delta_time: f32,
    sink: &mut dyn RenderSink,
) -> DriverResult<RunSummary> {
    run_with_clock(config, FrameClock::Fixed(delta_time), sink)
}

/// Runs the frame loop under the given clock.
///
/// The backend is shut down before returning, on success and on error.
///
/// # Errors
///
/// Fails on an invalid config or any simulation error.
pub fn run_with_clock(
    config: &DriverConfig,
    clock: FrameClock,
    sink: &mut dyn RenderSink,
) -> DriverResult<RunSummary> {
    config.validate()?;

    let mut backend = config.backend.create(config.simulation.clone());
    let started = Instant::now();
    backend.initialize()?;
    let init_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(
        backend = backend.name(),
        entities = backend.entity_count(),
        init_ms,
        "initialization time"
    );

    let result = frame_loop(backend.as_mut(), config, clock, sink);
    let entities = backend.entity_count();
    backend.shutdown();

    match result {
        Ok((stats, last_frame_records)) => Ok(RunSummary {
            backend: config.backend,
            frames: stats.total_frames(),
            entities,
            last_frame_records,
            init_ms,
            mean_update_ms: stats.mean_ms(),
        }),
        Err(err) => {
            error!(%err, "run aborted");
            Err(err)
        }
    }
}

fn frame_loop(
    backend: &mut dyn Backend,
    config: &DriverConfig,
    clock: FrameClock,
    sink: &mut dyn RenderSink,
) -> DriverResult<(UpdateStats, usize)> {
    let mut stats = UpdateStats::new();
    let mut last_frame_records = 0;
    let origin = Instant::now();
    let mut last = origin;
    let mut sim_time = 0.0_f64;

    while config.frames.map_or(true, |limit| stats.total_frames() < limit) {
        let (time, delta_time) = match clock {
            FrameClock::Wall => {
                let now = Instant::now();
                let delta = now.duration_since(last).as_secs_f32();
                last = now;
                (now.duration_since(origin).as_secs_f64(), delta)
            }
            FrameClock::Fixed(delta) => {
                sim_time += f64::from(delta);
                (sim_time, delta)
            }
        };

        let update = Instant::now();
        let records = backend.step(time, delta_time)?;
        let elapsed = update.elapsed();

        last_frame_records = records.len();
        sink.consume(records);

        if let Some(mean_ms) = stats.record(elapsed) {
            info!(frame = stats.total_frames(), mean_ms, "update time");
        }
    }

    Ok((stats, last_frame_records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::StatsSink;
    use dodsim_core::{SimConfig, SimError, DEFAULT_BOUNDS};

    fn small(frames: u64) -> DriverConfig {
        DriverConfig {
            simulation: SimConfig::new(100, 3, DEFAULT_BOUNDS, 1),
            frames: Some(frames),
            ..DriverConfig::default()
        }
    }

    #[test]
    fn test_fixed_run_counts_frames() {
        let mut sink = StatsSink::default();
        let summary = run_fixed(&small(10), 1.0 / 60.0, &mut sink).unwrap();
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.entities, 104);
        assert_eq!(summary.last_frame_records, 103);
        assert_eq!(sink.frames, 10);
        assert_eq!(sink.records, 1_030);
    }

    #[test]
    fn test_wall_clock_run() {
        let mut sink = StatsSink::default();
        let summary = run(&small(3), &mut sink).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(sink.frames, 3);
    }

    #[test]
    fn test_invalid_fixed_step_aborts() {
        let mut sink = StatsSink::default();
        let err = run_fixed(&small(3), -1.0, &mut sink).unwrap_err();
        assert!(matches!(
            err,
            crate::DriverError::Sim(SimError::InvalidDeltaTime(_))
        ));
        assert_eq!(sink.frames, 0);
    }
}
