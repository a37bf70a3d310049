//! 2D physics core for convex polygons.
//!
//! Entities are integrated with semi-implicit Euler, tested pairwise with the
//! Separating Axis Theorem and pushed apart with a positional correction plus
//! a linear impulse along the contact normal.

pub mod core;
pub mod engine;

pub use crate::core::math::{Vector2, Vector2Ext};
pub use crate::engine::geometry::{GeometryError, Polygon, Projection};
pub use crate::engine::physics::{
    EntityBuilder, PhysicsEntity, PhysicsError, PhysicsWorld, SharedEntity, WorldConfig,
};
