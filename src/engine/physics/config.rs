// World configuration and collision-response policies

use crate::core::math::Vector2;

use super::PhysicsError;

/// Pixels per meter used to derive the default gravity
pub const PIXELS_PER_METER: f64 = 1000.0;

/// Where the restitution coefficient of a collision comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestitutionSource {
    /// One coefficient for every collision, taken from the world
    #[default]
    World,
    /// The smaller `bounciness` of the two entities involved
    Entities,
}

/// How the minimum translation vector is distributed between two bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionalCorrection {
    /// Each non-static body is moved by the full MTV
    #[default]
    Full,
    /// The MTV is split in proportion to each body's inverse mass
    InverseMass,
}

/// Parameters of a physics world
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Added to every dynamic body's velocity once per step (screen space, y down)
    pub gravity: Vector2,

    /// Restitution used when `restitution_source` is `World`, within [0, 1]
    pub restitution: f64,

    /// Zero the force accumulators after each integration
    pub clear_forces: bool,

    pub restitution_source: RestitutionSource,

    pub correction: PositionalCorrection,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vector2::new(0.0, 9.81 / PIXELS_PER_METER),
            restitution: 0.5,
            clear_forces: true,
            restitution_source: RestitutionSource::World,
            correction: PositionalCorrection::Full,
        }
    }
}

impl WorldConfig {
    pub fn with_gravity(mut self, gravity: Vector2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    /// Keep accumulated forces between steps instead of clearing them
    pub fn with_persistent_forces(mut self) -> Self {
        self.clear_forces = false;
        self
    }

    pub fn with_restitution_source(mut self, source: RestitutionSource) -> Self {
        self.restitution_source = source;
        self
    }

    pub fn with_correction(mut self, correction: PositionalCorrection) -> Self {
        self.correction = correction;
        self
    }

    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<(), PhysicsError> {
        validate_restitution(self.restitution)?;
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidGravity(self.gravity));
        }
        Ok(())
    }
}

pub(crate) fn validate_restitution(restitution: f64) -> Result<(), PhysicsError> {
    if (0.0..=1.0).contains(&restitution) {
        Ok(())
    } else {
        Err(PhysicsError::InvalidRestitution(restitution))
    }
}
