//! Systems and orchestration for the object-model store.
//!
//! The systems cache object indices, then look every component up through
//! the object's component list each frame. Arithmetic goes through the same
//! helpers as the struct-of-arrays systems, so both layouts agree bit for
//! bit.

use std::time::Instant;

use tracing::{debug, info, trace};

use super::{Avoider, ComponentKind, GameObject, KindOf, ObjectComponent, ObjectWorld};
use crate::backend::{check_delta_time, Backend};
use crate::config::SimConfig;
use crate::ecs::{AvoidTarget, ComponentMask, EntityId, Move, Position, Sprite, WorldBounds};
use crate::error::{SimError, SimResult};
use crate::populate::populate;
use crate::random;
use crate::render::RenderRecord;
use crate::systems::{avoidance::resolve_contact, movement::advance};

fn mask_of(object: &GameObject) -> ComponentMask {
    let mut mask = ComponentMask::EMPTY;
    for kind in object.kinds() {
        mask |= match kind {
            ComponentKind::Position => ComponentMask::POSITION,
            ComponentKind::Sprite => ComponentMask::SPRITE,
            ComponentKind::WorldBounds => ComponentMask::WORLD_BOUNDS,
            ComponentKind::Move => ComponentMask::MOVE,
            ComponentKind::Avoider => ComponentMask::AVOIDER,
            ComponentKind::AvoidTarget => ComponentMask::AVOID_TARGET,
        };
    }
    mask
}

fn copy_of<C: ObjectComponent + KindOf + Copy>(object: &GameObject) -> Option<C> {
    object.get::<C>().copied()
}

fn entity_at(idx: usize) -> EntityId {
    EntityId::new(u32::try_from(idx).unwrap_or(u32::MAX))
}

/// Position and Move of a mover or avoider.
///
/// Setup rejected objects without them and the store is frozen, so callers
/// turn a miss into the configuration error setup would have raised.
fn motion_of(object: &GameObject) -> Option<(Position, Move)> {
    Some((copy_of::<Position>(object)?, copy_of::<Move>(object)?))
}

fn store_motion(object: &mut GameObject, pos: Position, vel: Move) {
    if let Some(slot) = object.get_mut::<Position>() {
        *slot = pos;
    }
    if let Some(slot) = object.get_mut::<Move>() {
        *slot = vel;
    }
}

/// Movement over object indices.
#[derive(Clone, Debug)]
pub struct ObjectMoveSystem {
    bounds: WorldBounds,
    movers: Vec<usize>,
}

impl ObjectMoveSystem {
    /// Looks up the bounds and collects every object with a Move.
    ///
    /// # Errors
    ///
    /// Fails without bounds or for a Move without a Position.
    pub fn setup(world: &ObjectWorld) -> SimResult<Self> {
        let bounds = world.find_world_bounds()?;
        let mut movers = Vec::new();
        for (idx, object) in world.objects().iter().enumerate() {
            if object.has(ComponentKind::Move) {
                if !object.has(ComponentKind::Position) {
                    return Err(SimError::IncompleteMover {
                        entity: entity_at(idx),
                    });
                }
                movers.push(idx);
            }
        }
        debug!(movers = movers.len(), "object move system ready");
        Ok(Self { bounds, movers })
    }

    /// Runs one frame of movement.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IncompleteMover`] if a cached mover lost its
    /// Position or Move.
    pub fn update(&self, world: &mut ObjectWorld, delta_time: f32) -> SimResult<()> {
        let objects = world.objects_mut();
        for &idx in &self.movers {
            let object = &mut objects[idx];
            let (mut pos, mut vel) = motion_of(object).ok_or(SimError::IncompleteMover {
                entity: entity_at(idx),
            })?;
            advance(&mut pos, &mut vel, &self.bounds, delta_time);
            store_motion(object, pos, vel);
        }
        Ok(())
    }
}

/// Avoidance over object indices.
#[derive(Clone, Debug)]
pub struct ObjectAvoidanceSystem {
    bounds: WorldBounds,
    /// (object index, squared contact radius)
    targets: Vec<(usize, f32)>,
    avoiders: Vec<usize>,
}

impl ObjectAvoidanceSystem {
    /// Looks up the bounds and collects every avoid-target and avoider, in
    /// store order.
    ///
    /// # Errors
    ///
    /// Fails without bounds, or for an avoider or target missing a component
    /// it needs.
    pub fn setup(world: &ObjectWorld) -> SimResult<Self> {
        let bounds = world.find_world_bounds()?;
        let mut targets = Vec::new();
        let mut avoiders = Vec::new();

        for (idx, object) in world.objects().iter().enumerate() {
            if let Some(target) = object.get::<AvoidTarget>() {
                let missing = mask_of(object).missing(ComponentMask::AVOID_TARGET_REQUIRES);
                if !missing.is_empty() {
                    return Err(SimError::IncompleteAvoidTarget {
                        entity: entity_at(idx),
                        missing,
                    });
                }
                targets.push((idx, target.distance * target.distance));
            }
        }
        for (idx, object) in world.objects().iter().enumerate() {
            if object.get::<Avoider>().is_some() {
                let missing = mask_of(object).missing(ComponentMask::AVOIDER_REQUIRES);
                if !missing.is_empty() {
                    return Err(SimError::IncompleteAvoider {
                        entity: entity_at(idx),
                        missing,
                    });
                }
                avoiders.push(idx);
            }
        }

        debug!(
            avoiders = avoiders.len(),
            targets = targets.len(),
            "object avoidance system ready"
        );
        Ok(Self {
            bounds,
            targets,
            avoiders,
        })
    }

    /// Runs one frame of avoidance and returns the number of contacts.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IncompleteAvoider`] or
    /// [`SimError::IncompleteAvoidTarget`] if a cached object lost a
    /// component setup checked for.
    pub fn update(&self, world: &mut ObjectWorld, delta_time: f32) -> SimResult<usize> {
        let objects = world.objects_mut();
        let mut contacts = 0;

        for &a in &self.avoiders {
            for &(t, distance_squared) in &self.targets {
                if a == t {
                    continue;
                }
                let target = &objects[t];
                let (Some(target_pos), Some(color)) = (
                    copy_of::<Position>(target),
                    target.get::<Sprite>().map(Sprite::color),
                ) else {
                    return Err(SimError::IncompleteAvoidTarget {
                        entity: entity_at(t),
                        missing: mask_of(target).missing(ComponentMask::AVOID_TARGET_REQUIRES),
                    });
                };
                let avoider = &objects[a];
                let (mut pos, mut vel) =
                    motion_of(avoider).ok_or_else(|| SimError::IncompleteAvoider {
                        entity: entity_at(a),
                        missing: mask_of(avoider).missing(ComponentMask::AVOIDER_REQUIRES),
                    })?;
                if pos.distance_squared(target_pos) >= distance_squared {
                    continue;
                }

                resolve_contact(&mut pos, &mut vel, &self.bounds, delta_time);
                let avoider = &mut objects[a];
                store_motion(avoider, pos, vel);
                if let Some(sprite) = avoider.get_mut::<Sprite>() {
                    sprite.set_color(color);
                }
                contacts += 1;
            }
        }
        Ok(contacts)
    }
}

/// Rebuilds `out` from every object holding Position and Sprite, in store
/// order, looking both up by type.
pub fn extract_objects(world: &ObjectWorld, display_scale: f32, out: &mut Vec<RenderRecord>) {
    out.clear();
    for object in world.objects() {
        if let (Some(pos), Some(sprite)) = (object.get::<Position>(), object.get::<Sprite>()) {
            out.push(RenderRecord::project(*pos, sprite, display_scale));
        }
    }
}

struct Running {
    world: ObjectWorld,
    movement: ObjectMoveSystem,
    avoidance: ObjectAvoidanceSystem,
}

/// The object-model simulation.
pub struct ObjectSimulation {
    config: SimConfig,
    state: Option<Running>,
    records: Vec<RenderRecord>,
    frame: u64,
    last_contacts: usize,
}

impl ObjectSimulation {
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

    /// Starts the simulation over a store built by the caller.
    ///
    /// # Errors
    ///
    /// Same as [`Backend::initialize`], minus population errors.
    pub fn initialize_with_world(&mut self, mut world: ObjectWorld) -> SimResult<()> {
        if self.state.is_some() {
            return Err(SimError::AlreadyInitialized);
        }
        let movement = ObjectMoveSystem::setup(&world)?;
        let avoidance = ObjectAvoidanceSystem::setup(&world)?;
        world.freeze();

        self.records = Vec::with_capacity(world.entity_count());
        self.frame = 0;
        self.last_contacts = 0;
        self.state = Some(Running {
            world,
            movement,
            avoidance,
        });
        Ok(())
    }

    /// The store, while running.
    #[must_use]
    pub fn world(&self) -> Option<&ObjectWorld> {
        self.state.as_ref().map(|running| &running.world)
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
}

impl Backend for ObjectSimulation {
    fn name(&self) -> &'static str {
        "object"
    }

    fn initialize(&mut self) -> SimResult<()> {
        if self.state.is_some() {
            return Err(SimError::AlreadyInitialized);
        }
        let started = Instant::now();

        let mut world = ObjectWorld::new();
        populate(&mut world, &self.config, &mut random::seeded(self.config.seed))?;
        self.initialize_with_world(world)?;

        info!(
            backend = "object",
            entities = self.entity_count(),
            seed = self.config.seed,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "simulation initialized"
        );
        Ok(())
    }

    fn step(&mut self, _time: f64, delta_time: f32) -> SimResult<&[RenderRecord]> {
        let running = self.state.as_mut().ok_or(SimError::NotInitialized)?;
        check_delta_time(delta_time)?;

        running.movement.update(&mut running.world, delta_time)?;
        let contacts = running.avoidance.update(&mut running.world, delta_time)?;
        extract_objects(&running.world, self.config.display_scale, &mut self.records);

        self.frame += 1;
        self.last_contacts = contacts;
        trace!(frame = self.frame, contacts, records = self.records.len(), "step");
        Ok(&self.records)
    }

    fn entity_count(&self) -> usize {
        self.world().map_or(0, ObjectWorld::entity_count)
    }

    fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn shutdown(&mut self) {
        if let Some(mut running) = self.state.take() {
            let entities = running.world.entity_count();
            running.world.release();
            info!(backend = "object", entities, frames = self.frame, "simulation shut down");
        }
        self.records = Vec::new();
        self.frame = 0;
        self.last_contacts = 0;
    }
}
