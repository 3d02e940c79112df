//! # Frame Systems
//!
//! Systems are explicit objects built once from a populated store. They
//! cache entity indices (never component values) and mutate the store in
//! place each frame. Movement must finish before Avoidance starts.

pub mod avoidance;
pub mod movement;

pub use avoidance::{AvoidEntry, AvoidanceSystem, CONTACT_OVERSHOOT};
pub use movement::MovementSystem;
