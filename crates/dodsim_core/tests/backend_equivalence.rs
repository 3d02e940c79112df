//! # Backend Equivalence
//!
//! Both storage layouts, driven with the same config and the same delta
//! times, must emit byte-for-byte identical render feeds.

use dodsim_core::{
    as_bytes, Backend, BackendKind, EntityBuilder, Move, ObjectSimulation, ObjectWorld, SimConfig,
    SimError, Sprite, WorldBounds, DEFAULT_BOUNDS,
};

fn feeds(kind: BackendKind, config: &SimConfig, deltas: &[f32]) -> Vec<Vec<u8>> {
    let mut backend = kind.create(config.clone());
    backend.initialize().unwrap();
    let frames = deltas
        .iter()
        .enumerate()
        .map(|(frame, &dt)| as_bytes(backend.step(frame as f64, dt).unwrap()).to_vec())
        .collect();
    backend.shutdown();
    frames
}

#[test]
fn test_layouts_emit_identical_feeds() {
    let deltas: Vec<f32> = (0..90)
        .map(|frame| if frame % 5 == 0 { 0.2 } else { 1.0 / 60.0 })
        .collect();

    for seed in [0, 17, 90_210] {
        let config = SimConfig::new(1_500, 20, DEFAULT_BOUNDS, seed);
        let soa = feeds(BackendKind::Soa, &config, &deltas);
        let object = feeds(BackendKind::Object, &config, &deltas);
        for (frame, (left, right)) in soa.iter().zip(&object).enumerate() {
            assert_eq!(left, right, "seed {seed}: layouts diverged at frame {frame}");
        }
    }
}

#[test]
fn test_layouts_agree_on_dense_contacts() {
    // Targets spread over the whole world so contacts happen every frame.
    let config = SimConfig {
        target_spread: 1.0,
        avoid_distance: 6.0,
        ..SimConfig::new(800, 40, WorldBounds::new(-20.0, 20.0, -20.0, 20.0), 5)
    };
    let deltas = [0.1_f32; 40];
    assert_eq!(
        feeds(BackendKind::Soa, &config, &deltas),
        feeds(BackendKind::Object, &config, &deltas)
    );
}

#[test]
fn test_lifecycle_is_shared() {
    for kind in BackendKind::ALL {
        let mut backend = kind.create(SimConfig::new(10, 2, DEFAULT_BOUNDS, 1));
        assert_eq!(backend.step(0.0, 0.1).unwrap_err(), SimError::NotInitialized);

        backend.initialize().unwrap();
        assert!(backend.is_initialized());
        assert_eq!(backend.entity_count(), 13);
        assert_eq!(backend.initialize(), Err(SimError::AlreadyInitialized));
        assert!(backend.step(0.0, f32::NAN).is_err());

        backend.shutdown();
        backend.shutdown();
        assert!(!backend.is_initialized());
        assert_eq!(backend.entity_count(), 0);
        backend.initialize().unwrap();
    }
}

#[test]
fn test_invalid_config_fails_on_both_layouts() {
    let config = SimConfig {
        avoid_distance: -1.0,
        ..SimConfig::new(10, 2, DEFAULT_BOUNDS, 1)
    };
    for kind in BackendKind::ALL {
        let mut backend = kind.create(config.clone());
        assert!(matches!(backend.initialize(), Err(SimError::InvalidConfig(_))));
        assert!(!backend.is_initialized());
    }
}

#[test]
fn test_object_layout_bounce_and_recolor() {
    let mut world = ObjectWorld::new();
    let bounds = world.create_entity("bounds").unwrap();
    world.attach_world_bounds(bounds, DEFAULT_BOUNDS).unwrap();

    let target = world.create_entity("toavoid").unwrap();
    world.attach_position(target, 0.0, 0.0).unwrap();
    world
        .attach_sprite(target, Sprite::new([0.9, 0.2, 0.4], 5, 2.0))
        .unwrap();
    world.mark_avoid_target(target, 1.3).unwrap();

    let avoider = world.create_entity("object").unwrap();
    world.attach_position(avoider, 0.5, 0.0).unwrap();
    world
        .attach_sprite(avoider, Sprite::new(Sprite::WHITE, 1, 1.0))
        .unwrap();
    world.attach_move(avoider, Move::new(-0.5, 0.0)).unwrap();
    world.mark_avoider(avoider).unwrap();

    let edge = world.create_entity("object").unwrap();
    world.attach_position(edge, DEFAULT_BOUNDS.x_max, 0.0).unwrap();
    world.attach_move(edge, Move::new(0.6, 0.0)).unwrap();

    let mut sim = ObjectSimulation::new(SimConfig::default());
    sim.initialize_with_world(world).unwrap();
    let records = sim.step(0.0, 0.0).unwrap().to_vec();
    assert_eq!(records.len(), 2);
    assert_eq!(
        [records[1].color_r, records[1].color_g, records[1].color_b],
        [0.9, 0.2, 0.4]
    );

    let world = sim.world().unwrap();
    let edge_move = world.object(edge).unwrap().get::<Move>().copied().unwrap();
    assert_eq!(edge_move, Move::new(-0.6, 0.0));
    let avoider_move = world.object(avoider).unwrap().get::<Move>().copied().unwrap();
    assert_eq!(avoider_move, Move::new(0.5, 0.0));
}
