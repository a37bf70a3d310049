use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::math::{Vector2, Vector2Ext};
use crate::engine::geometry::Polygon;

use super::world::WorldId;
use super::PhysicsError;

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a physics entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u64);

impl EntityId {
    fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Entity handle shared between its owner and the world it is attached to
pub type SharedEntity = Rc<RefCell<PhysicsEntity>>;

/// Back-reference to a world, stale once that world drops or clears its
/// registry
#[derive(Debug, Clone)]
struct WorldLink {
    id: WorldId,
    alive: Weak<()>,
}

pub(crate) fn validate_size(size: f64) -> Result<(), PhysicsError> {
    if size.is_finite() && size >= 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::InvalidSize(size))
    }
}

pub(crate) fn validate_bounciness(bounciness: f64) -> Result<(), PhysicsError> {
    if (0.0..=1.0).contains(&bounciness) {
        Ok(())
    } else {
        Err(PhysicsError::InvalidRestitution(bounciness))
    }
}

/// A simulated body: kinematic state, force accumulators, a local-space
/// shape and material parameters
///
/// Forces are not scaled by a timestep: one call to [`PhysicsEntity::integrate`]
/// is one fixed step, so callers wanting physical units pre-scale forces by
/// `dt` themselves.
#[derive(Debug)]
pub struct PhysicsEntity {
    id: EntityId,

    // Linear state
    pub position: Vector2,
    pub velocity: Vector2,
    pub acceleration: Vector2,

    // Angular state (radians)
    pub rotation: f64,
    pub angular_velocity: f64,
    pub angular_acceleration: f64,

    /// Uniform scale applied to the shape (finite, non-negative)
    size: f64,
    mass: f64,
    /// Per-entity restitution within [0, 1], used when the world is
    /// configured to read it
    bounciness: f64,
    /// Friction coefficient; the collision resolver does not read it
    pub friction: f64,
    /// Static bodies never integrate and are never moved by collisions
    pub is_static: bool,

    shape: Polygon,
    world: Option<WorldLink>,
}

impl PhysicsEntity {
    /// Create a dynamic entity at rest at the origin
    pub fn new(shape: Polygon) -> Self {
        Self {
            id: EntityId::next(),
            position: Vector2::ZERO,
            velocity: Vector2::ZERO,
            acceleration: Vector2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            size: 1.0,
            mass: 1.0,
            bounciness: 0.5,
            friction: 0.1,
            is_static: false,
            shape,
            world: None,
        }
    }

    /// Wrap the entity in a shared handle so it can be attached to a world
    pub fn into_shared(self) -> SharedEntity {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// World this entity is attached to, if any
    ///
    /// A link to a world that has since been dropped or cleared reads as
    /// `None`.
    pub fn world(&self) -> Option<WorldId> {
        self.world
            .as_ref()
            .filter(|link| link.alive.strong_count() > 0)
            .map(|link| link.id)
    }

    pub(crate) fn attach(&mut self, world: WorldId, alive: Weak<()>) {
        self.world = Some(WorldLink { id: world, alive });
    }

    pub(crate) fn detach(&mut self) {
        self.world = None;
    }

    /// The local-space shape
    pub fn shape(&self) -> &Polygon {
        &self.shape
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f64) -> Result<(), PhysicsError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        self.mass = mass;
        Ok(())
    }

    /// `1 / mass`, or zero for static bodies
    pub fn inverse_mass(&self) -> f64 {
        if self.is_static {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Shape in world space: translated by the position, then rotated and
    /// scaled about its own center
    ///
    /// Built fresh on every call. Mutating the result has no effect on the
    /// entity.
    pub fn world_shape(&self) -> Polygon {
        let mut shape = self.shape.clone();
        shape.translate(self.position);
        shape.rotate(self.rotation, None);
        shape.scale(self.size, None);
        shape
    }

    /// Advance one step with semi-implicit Euler. Static bodies do not move.
    ///
    /// The accumulators are left untouched; see [`PhysicsEntity::clear_forces`].
    pub fn integrate(&mut self) {
        if self.is_static {
            return;
        }
        self.velocity += self.acceleration;
        self.position += self.velocity;
        self.angular_velocity += self.angular_acceleration;
        self.rotation += self.angular_velocity;
    }

    /// Reset both force accumulators
    pub fn clear_forces(&mut self) {
        self.acceleration = Vector2::ZERO;
        self.angular_acceleration = 0.0;
    }

    pub fn apply_force(&mut self, force: Vector2) {
        self.acceleration += force;
    }

    /// Add a downward (screen-space +y) force
    pub fn apply_gravity(&mut self, gravity: f64) {
        self.apply_force(Vector2::new(0.0, gravity));
    }

    /// Add a force of magnitude `drag` opposing the current velocity
    pub fn apply_drag(&mut self, drag: f64) {
        self.apply_force(-self.velocity.normalized() * drag);
    }

    /// Add a force of magnitude `friction` opposing the current velocity
    pub fn apply_friction(&mut self, friction: f64) {
        self.apply_force(-self.velocity.normalized() * friction);
    }

    /// Change the velocity directly
    pub fn apply_impulse(&mut self, impulse: Vector2) {
        self.velocity += impulse;
    }

    pub fn apply_torque(&mut self, torque: f64) {
        self.angular_acceleration += torque;
    }

    pub fn apply_angular_impulse(&mut self, impulse: f64) {
        self.angular_velocity += impulse;
    }

    /// Damp (or amplify) the spin by multiplying the angular velocity
    pub fn apply_inertia(&mut self, inertia: f64) {
        self.angular_velocity *= inertia;
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Multiply the current size. On error the size is unchanged.
    pub fn scale_by(&mut self, factor: f64) -> Result<(), PhysicsError> {
        self.set_size(self.size * factor)
    }

    pub fn set_size(&mut self, size: f64) -> Result<(), PhysicsError> {
        validate_size(size)?;
        self.size = size;
        Ok(())
    }

    pub fn bounciness(&self) -> f64 {
        self.bounciness
    }

    pub fn set_bounciness(&mut self, bounciness: f64) -> Result<(), PhysicsError> {
        validate_bounciness(bounciness)?;
        self.bounciness = bounciness;
        Ok(())
    }
}

/// Builder for creating entities with common configurations
pub struct EntityBuilder {
    shape: Polygon,
    is_static: bool,
    position: Vector2,
    velocity: Vector2,
    rotation: f64,
    angular_velocity: f64,
    size: f64,
    mass: f64,
    bounciness: f64,
    friction: f64,
}

impl EntityBuilder {
    /// Create a new dynamic entity (affected by gravity and collisions)
    pub fn new_dynamic(shape: Polygon) -> Self {
        Self {
            shape,
            is_static: false,
            position: Vector2::ZERO,
            velocity: Vector2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            size: 1.0,
            mass: 1.0,
            bounciness: 0.5,
            friction: 0.1,
        }
    }

    /// Create a new static entity (completely immovable)
    pub fn new_static(shape: Polygon) -> Self {
        Self {
            is_static: true,
            ..Self::new_dynamic(shape)
        }
    }

    /// Set the initial position of the entity
    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Vector2::new(x, y);
        self
    }

    /// Set the initial linear velocity
    pub fn velocity(mut self, x: f64, y: f64) -> Self {
        self.velocity = Vector2::new(x, y);
        self
    }

    /// Set the initial rotation (radians)
    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the initial angular velocity (radians per step)
    pub fn angular_velocity(mut self, angular_velocity: f64) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Set the uniform scale (finite and non-negative, checked by `build`)
    pub fn size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Set mass (must be positive, checked by `build`)
    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Set restitution (within [0, 1], checked by `build`)
    pub fn bounciness(mut self, bounciness: f64) -> Self {
        self.bounciness = bounciness;
        self
    }

    pub fn friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    /// Build the entity
    pub fn build(self) -> Result<PhysicsEntity, PhysicsError> {
        let mut entity = PhysicsEntity::new(self.shape);
        entity.set_mass(self.mass)?;
        entity.is_static = self.is_static;
        entity.position = self.position;
        entity.velocity = self.velocity;
        entity.rotation = self.rotation;
        entity.angular_velocity = self.angular_velocity;
        entity.set_size(self.size)?;
        entity.set_bounciness(self.bounciness)?;
        entity.friction = self.friction;
        Ok(entity)
    }
}

/// Common entity configurations
pub mod presets {
    use super::*;

    /// Dynamic axis-aligned box centered on `(x, y)`
    pub fn box_body(x: f64, y: f64, width: f64, height: f64) -> Result<PhysicsEntity, PhysicsError> {
        let mut entity = PhysicsEntity::new(Polygon::centered_rectangle(width, height)?);
        entity.position = Vector2::new(x, y);
        Ok(entity)
    }

    /// Static platform centered on `(x, y)`
    pub fn platform(x: f64, y: f64, width: f64, height: f64) -> Result<PhysicsEntity, PhysicsError> {
        let mut entity = box_body(x, y, width, height)?;
        entity.is_static = true;
        entity.bounciness = 0.0;
        Ok(entity)
    }

    /// Dynamic 16-sided approximation of a ball centered on `(x, y)`
    pub fn ball(x: f64, y: f64, radius: f64) -> Result<PhysicsEntity, PhysicsError> {
        let mut entity = PhysicsEntity::new(Polygon::regular(16, radius)?);
        entity.position = Vector2::new(x, y);
        entity.bounciness = 0.8; // Slightly bouncy
        Ok(entity)
    }
}
