//! # Simulation Step
//!
//! Orchestrates the struct-of-arrays layout:
//!
//! ```text
//! initialize:  populate store -> set up Movement + Avoidance -> freeze store
//! step:        Movement -> Avoidance -> extract render feed
//! shutdown:    release store
//! ```
//!
//! A step never suspends: when it returns, all three passes are complete.

use std::time::Instant;

use tracing::{info, trace};

use crate::backend::{check_delta_time, Backend};
use crate::config::SimConfig;
use crate::ecs::{ComponentMask, World};
use crate::error::{SimError, SimResult};
use crate::populate::populate;
use crate::random;
use crate::render::{extract, RenderRecord};
use crate::systems::{AvoidanceSystem, MovementSystem};

/// A running scene: the frozen store and the systems built over it.
struct Running {
    world: World,
    movement: MovementSystem,
    avoidance: AvoidanceSystem,
}

/// The struct-of-arrays simulation.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = Simulation::new(SimConfig::new(10_000, 20, DEFAULT_BOUNDS, 42));
/// sim.initialize()?;
/// let records = sim.step(0.0, 1.0 / 60.0)?;
/// ```
pub struct Simulation {
    config: SimConfig,
    state: Option<Running>,
    records: Vec<RenderRecord>,
    frame: u64,
    last_contacts: usize,
}

impl Simulation {
    /// Creates an uninitialized simulation.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            state: None,
            records: Vec::new(),
            frame: 0,
            last_contacts: 0,
        }
    }

    /// The configuration this simulation populates from.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Populates the reference scene from the config and starts the
    /// simulation.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::AlreadyInitialized`] if already running, or the
    /// first configuration error.
    pub fn initialize(&mut self) -> SimResult<()> {
        if self.state.is_some() {
            return Err(SimError::AlreadyInitialized);
        }
        let started = Instant::now();

        let mut world = World::with_capacity(self.config.entity_count());
        populate(&mut world, &self.config, &mut random::seeded(self.config.seed))?;
        self.start(world)?;

        info!(
            backend = "soa",
            entities = self.entity_count(),
            seed = self.config.seed,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "simulation initialized"
        );
        Ok(())
    }

    /// Starts the simulation over a store built by the caller.
    ///
    /// The display scale still comes from the config.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::AlreadyInitialized`] if already running,
    /// [`SimError::MissingWorldBounds`] without bounds, or an incomplete
    /// entity error.
    pub fn initialize_with_world(&mut self, world: World) -> SimResult<()> {
        if self.state.is_some() {
            return Err(SimError::AlreadyInitialized);
        }
        self.start(world)
    }

    fn start(&mut self, mut world: World) -> SimResult<()> {
        let movement = MovementSystem::setup(&world)?;
        let avoidance = AvoidanceSystem::setup(&world)?;
        world.freeze();

        self.records = Vec::with_capacity(world.count_with(ComponentMask::RENDERABLE));
        self.frame = 0;
        self.last_contacts = 0;
        self.state = Some(Running {
            world,
            movement,
            avoidance,
        });
        Ok(())
    }

    /// Advances one frame and returns the render feed, rebuilt from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotInitialized`] before `initialize`, or
    /// [`SimError::InvalidDeltaTime`] for a negative or non-finite
    /// `delta_time`; state is untouched in both cases.
    pub fn step(&mut self, _time: f64, delta_time: f32) -> SimResult<&[RenderRecord]> {
        let running = self.state.as_mut().ok_or(SimError::NotInitialized)?;
        check_delta_time(delta_time)?;

        #[cfg(not(feature = "parallel"))]
        let contacts = {
            running.movement.update(&mut running.world, delta_time);
            running.avoidance.update(&mut running.world, delta_time)
        };
        #[cfg(feature = "parallel")]
        let contacts = {
            running.movement.update_parallel(&mut running.world, delta_time);
            running.avoidance.update_parallel(&mut running.world, delta_time)
        };

        extract(&running.world, self.config.display_scale, &mut self.records);

        self.frame += 1;
        self.last_contacts = contacts;
        trace!(frame = self.frame, contacts, records = self.records.len(), "step");
        Ok(&self.records)
    }

    /// The store, while running.
    #[must_use]
    pub fn world(&self) -> Option<&World> {
        self.state.as_ref().map(|running| &running.world)
    }

    /// The movement system, while running.
    #[must_use]
    pub fn movement(&self) -> Option<&MovementSystem> {
        self.state.as_ref().map(|running| &running.movement)
    }

    /// The avoidance system, while running.
    #[must_use]
    pub fn avoidance(&self) -> Option<&AvoidanceSystem> {
        self.state.as_ref().map(|running| &running.avoidance)
    }

    /// The feed produced by the last step.
    #[must_use]
    pub fn records(&self) -> &[RenderRecord] {
        &self.records
    }

    /// Steps completed since initialization.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Contacts resolved during the last step.
    #[must_use]
    pub fn last_contacts(&self) -> usize {
        self.last_contacts
    }

    /// Entities in the store (0 when not running).
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.world().map_or(0, World::entity_count)
    }

    /// Whether the simulation is running.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Releases all entity storage. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(mut running) = self.state.take() {
            let entities = running.world.entity_count();
            running.world.release();
            info!(backend = "soa", entities, frames = self.frame, "simulation shut down");
        }
        self.records = Vec::new();
        self.frame = 0;
        self.last_contacts = 0;
    }
}

impl Backend for Simulation {
    fn name(&self) -> &'static str {
        "soa"
    }

    fn initialize(&mut self) -> SimResult<()> {
        Simulation::initialize(self)
    }

    fn step(&mut self, time: f64, delta_time: f32) -> SimResult<&[RenderRecord]> {
        Simulation::step(self, time, delta_time)
    }

    fn entity_count(&self) -> usize {
        Simulation::entity_count(self)
    }

    fn is_initialized(&self) -> bool {
        Simulation::is_initialized(self)
    }

    fn shutdown(&mut self) {
        Simulation::shutdown(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BOUNDS;

    fn small() -> Simulation {
        Simulation::new(SimConfig::new(200, 4, DEFAULT_BOUNDS, 5))
    }

    #[test]
    fn test_step_before_initialize() {
        let mut sim = small();
        assert_eq!(sim.step(0.0, 0.016).unwrap_err(), SimError::NotInitialized);
    }

    #[test]
    fn test_initialize_twice() {
        let mut sim = small();
        sim.initialize().unwrap();
        assert_eq!(sim.initialize(), Err(SimError::AlreadyInitialized));
        sim.shutdown();
        assert!(sim.initialize().is_ok());
    }

    #[test]
    fn test_step_counts_frames_and_records() {
        let mut sim = small();
        sim.initialize().unwrap();
        for _ in 0..3 {
            assert_eq!(sim.step(0.0, 0.016).unwrap().len(), 204);
        }
        assert_eq!(sim.frame(), 3);
        assert_eq!(sim.entity_count(), 205);
        assert!(sim.world().unwrap().is_frozen());
    }

    #[test]
    fn test_invalid_delta_time_leaves_state() {
        let mut sim = small();
        sim.initialize().unwrap();
        let before = sim.world().unwrap().positions().to_vec();
        assert!(matches!(
            sim.step(0.0, f32::NAN),
            Err(SimError::InvalidDeltaTime(dt)) if dt.is_nan()
        ));
        assert_eq!(
            sim.step(0.0, -1.0).unwrap_err(),
            SimError::InvalidDeltaTime(-1.0)
        );
        assert_eq!(sim.world().unwrap().positions(), &before[..]);
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut sim = small();
        sim.initialize().unwrap();
        sim.step(0.0, 0.016).unwrap();
        sim.shutdown();
        sim.shutdown();
        assert!(!sim.is_initialized());
        assert_eq!(sim.entity_count(), 0);
        assert!(sim.records().is_empty());
        assert_eq!(sim.step(0.0, 0.016).unwrap_err(), SimError::NotInitialized);
    }

    #[test]
    fn test_initialize_with_world_requires_bounds() {
        let mut sim = small();
        let mut world = World::new();
        world.create_entity("object").unwrap();
        assert_eq!(
            sim.initialize_with_world(world),
            Err(SimError::MissingWorldBounds)
        );
        assert!(!sim.is_initialized());
    }
}
