//! # Render Feed
//!
//! Flat, uniformly typed records handed to the renderer once per frame.
//! Every field is `f32`, sprite index included, so the whole feed can be
//! uploaded as one float buffer.

use bytemuck::{Pod, Zeroable};

use crate::ecs::{ComponentMask, Position, Sprite, World};

/// One renderable entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RenderRecord {
    /// Scaled x position.
    pub pos_x: f32,
    /// Scaled y position.
    pub pos_y: f32,
    /// Scaled sprite scale.
    pub scale: f32,
    /// Red channel.
    pub color_r: f32,
    /// Green channel.
    pub color_g: f32,
    /// Blue channel.
    pub color_b: f32,
    /// Atlas index, encoded as a float.
    pub sprite_index: f32,
}

impl RenderRecord {
    /// Floats per record.
    pub const FLOATS: usize = 7;

    /// Projects a position and sprite through the display scale.
    #[inline]
    #[must_use]
    pub fn project(pos: Position, sprite: &Sprite, display_scale: f32) -> Self {
        Self {
            pos_x: pos.x * display_scale,
            pos_y: pos.y * display_scale,
            scale: sprite.scale * display_scale,
            color_r: sprite.color_r,
            color_g: sprite.color_g,
            color_b: sprite.color_b,
            sprite_index: sprite.sprite_index as f32,
        }
    }
}

/// Views records as the flat float buffer renderers consume.
#[inline]
#[must_use]
pub fn as_floats(records: &[RenderRecord]) -> &[f32] {
    bytemuck::cast_slice(records)
}

/// Views records as raw bytes.
#[inline]
#[must_use]
pub fn as_bytes(records: &[RenderRecord]) -> &[u8] {
    bytemuck::cast_slice(records)
}

/// Rebuilds `out` with one record per entity holding both Position and
/// Sprite, in store order. Other entities are skipped silently.
pub fn extract(world: &World, display_scale: f32, out: &mut Vec<RenderRecord>) {
    out.clear();
    let positions = world.positions();
    let sprites = world.sprites();

    for (idx, mask) in world.masks().iter().enumerate() {
        if mask.contains(ComponentMask::RENDERABLE) {
            out.push(RenderRecord::project(positions[idx], &sprites[idx], display_scale));
        }
    }
}

/// Consumer of the per-frame render feed.
pub trait RenderSink {
    /// Receives one frame's records. The slice is only valid for the call.
    fn consume(&mut self, records: &[RenderRecord]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::WorldBounds;

    #[test]
    fn test_record_layout() {
        assert_eq!(std::mem::size_of::<RenderRecord>(), RenderRecord::FLOATS * 4);
        let records = [RenderRecord::default(); 3];
        assert_eq!(as_floats(&records).len(), 3 * RenderRecord::FLOATS);
        assert_eq!(as_bytes(&records).len(), 3 * RenderRecord::FLOATS * 4);
    }

    #[test]
    fn test_project_scales_position_and_size_only() {
        let sprite = Sprite::new([0.9, 0.2, 0.4], 5, 2.0);
        let record = RenderRecord::project(Position::new(20.0, -40.0), &sprite, 0.05);
        assert!((record.pos_x - 1.0).abs() < 1e-6);
        assert!((record.pos_y + 2.0).abs() < 1e-6);
        assert!((record.scale - 0.1).abs() < 1e-6);
        assert_eq!([record.color_r, record.color_g, record.color_b], [0.9, 0.2, 0.4]);
        assert!((record.sprite_index - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_extract_skips_partial_entities() {
        let mut world = World::new();
        let bounds = world.create_entity("bounds").unwrap();
        world
            .attach_world_bounds(bounds, WorldBounds::new(-1.0, 1.0, -1.0, 1.0))
            .unwrap();

        let only_pos = world.create_entity("marker").unwrap();
        world.attach_position(only_pos, 0.5, 0.5).unwrap();

        let full = world.create_entity("object").unwrap();
        world.attach_position(full, 0.1, 0.2).unwrap();
        world
            .attach_sprite(full, Sprite::new(Sprite::WHITE, 3, 1.0))
            .unwrap();

        let only_sprite = world.create_entity("hud").unwrap();
        world
            .attach_sprite(only_sprite, Sprite::new(Sprite::WHITE, 0, 1.0))
            .unwrap();

        let mut out = vec![RenderRecord::default(); 10];
        extract(&world, 1.0, &mut out);
        assert_eq!(out.len(), 1);
        assert!((out[0].pos_x - 0.1).abs() < f32::EPSILON);
        assert!((out[0].sprite_index - 3.0).abs() < f32::EPSILON);
    }
}
