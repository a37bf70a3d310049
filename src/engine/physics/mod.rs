// Physics system: SAT collision detection with impulse response

pub mod collision;
mod config;
pub mod entity;
mod world;

use crate::core::math::Vector2;
use crate::engine::geometry::GeometryError;

pub use collision::{Contact, ContactQueue};
pub use config::{PositionalCorrection, RestitutionSource, WorldConfig, PIXELS_PER_METER};
pub use entity::{presets, EntityBuilder, EntityId, PhysicsEntity, SharedEntity};
pub use world::{PhysicsWorld, WorldId};

/// Physics errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    #[error("{entity} is already attached to {world}")]
    AlreadyAttached { entity: EntityId, world: WorldId },

    #[error("{entity} is not attached to {world}")]
    NotAttached { entity: EntityId, world: WorldId },

    #[error("Entity is borrowed elsewhere")]
    EntityBusy,

    #[error("Mass must be positive and finite, got {0}")]
    InvalidMass(f64),

    #[error("Size must be finite and non-negative, got {0}")]
    InvalidSize(f64),

    #[error("Restitution must be within [0, 1], got {0}")]
    InvalidRestitution(f64),

    #[error("Gravity must be finite, got {0}")]
    InvalidGravity(Vector2),

    #[error("Timestep must be finite and non-negative, got {0}")]
    InvalidTimestep(f64),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_error_display() {
        let err = PhysicsError::AlreadyAttached {
            entity: EntityId(7),
            world: WorldId(2),
        };
        assert_eq!(err.to_string(), "entity#7 is already attached to world#2");

        let err = PhysicsError::InvalidTimestep(-1.0);
        assert_eq!(err.to_string(), "Timestep must be finite and non-negative, got -1");
    }

    #[test]
    fn test_geometry_error_converts() {
        let err: PhysicsError = GeometryError::TooFewVertices(1).into();
        assert_eq!(err.to_string(), "A polygon needs at least 3 vertices, got 1");
    }
}
