use std::cell::RefMut;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace, warn};

use crate::core::math::{Vector2, Vector2Ext};
use crate::engine::geometry::Polygon;
use crate::engine::lifecycle::Lifecycle;

use super::collision::{self, Contact, ContactQueue};
use super::config::{validate_restitution, PositionalCorrection, RestitutionSource, WorldConfig};
use super::entity::{PhysicsEntity, SharedEntity};
use super::PhysicsError;

static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldId(pub(crate) u64);

impl WorldId {
    fn next() -> Self {
        Self(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world#{}", self.0)
    }
}

/// Physics world that manages all physics simulation
///
/// The world only tracks membership: entities are shared handles owned by
/// the caller, and each attached entity records this world's id. Collision
/// detection is exhaustive over all pairs.
pub struct PhysicsWorld {
    id: WorldId,

    /// Entities hold a weak handle to this; replacing it invalidates every
    /// back-reference at once
    membership: Rc<()>,

    /// Gravity, restitution and response policies
    config: WorldConfig,

    /// Attached entities in insertion order
    entities: Vec<SharedEntity>,

    /// Contacts resolved during the last step
    contacts: ContactQueue,

    /// Number of completed steps
    step_count: u64,

    /// Sum of the `dt` values passed to `step`
    elapsed: f64,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        Self::from_valid_config(WorldConfig::default())
    }

    /// Create a new physics world with custom settings
    pub fn with_config(config: WorldConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: WorldConfig) -> Self {
        Self {
            id: WorldId::next(),
            membership: Rc::new(()),
            config,
            entities: Vec::new(),
            contacts: ContactQueue::new(),
            step_count: 0,
            elapsed: 0.0,
        }
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Attach an entity to this world
    ///
    /// Fails if the entity already belongs to a world, this one included.
    /// On failure neither the registry nor the entity is modified.
    pub fn add(&mut self, entity: &SharedEntity) -> Result<(), PhysicsError> {
        let mut body = entity
            .try_borrow_mut()
            .map_err(|_| PhysicsError::EntityBusy)?;

        if let Some(world) = body.world() {
            return Err(PhysicsError::AlreadyAttached {
                entity: body.id(),
                world,
            });
        }

        body.attach(self.id, Rc::downgrade(&self.membership));
        self.entities.push(Rc::clone(entity));
        debug!("{} attached to {}", body.id(), self.id);
        Ok(())
    }

    /// Detach an entity from this world
    ///
    /// Fails if the entity is not attached to this world. On failure neither
    /// the registry nor the entity is modified.
    pub fn remove(&mut self, entity: &SharedEntity) -> Result<(), PhysicsError> {
        let mut body = entity
            .try_borrow_mut()
            .map_err(|_| PhysicsError::EntityBusy)?;

        let index = self
            .entities
            .iter()
            .position(|other| Rc::ptr_eq(other, entity));

        match (body.world(), index) {
            (Some(world), Some(index)) if world == self.id => {
                self.entities.remove(index);
                body.detach();
                debug!("{} detached from {}", body.id(), self.id);
                Ok(())
            }
            _ => Err(PhysicsError::NotAttached {
                entity: body.id(),
                world: self.id,
            }),
        }
    }

    /// Detach every entity
    ///
    /// Entities borrowed elsewhere keep a stale link that already reads as
    /// detached, so they can join any world afterwards.
    pub fn clear(&mut self) {
        self.membership = Rc::new(());
        for entity in self.entities.drain(..) {
            match entity.try_borrow_mut() {
                Ok(mut body) => body.detach(),
                Err(_) => debug!("Left a stale link on a borrowed entity of {}", self.id),
            }
        }
    }

    /// Whether this exact entity handle is attached here
    pub fn contains(&self, entity: &SharedEntity) -> bool {
        self.entities.iter().any(|other| Rc::ptr_eq(other, entity))
    }

    /// Attached entities in insertion order
    pub fn entities(&self) -> impl Iterator<Item = &SharedEntity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Step the physics simulation forward by one tick
    ///
    /// Gravity and forces are applied once per call; `dt` only feeds the
    /// elapsed-time counter. Every entity is borrowed before anything is
    /// mutated, so a borrowed entity fails the step without side effects.
    pub fn step(&mut self, dt: f64) -> Result<(), PhysicsError> {
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(PhysicsError::InvalidTimestep(dt));
        }

        let mut bodies = self
            .entities
            .iter()
            .map(|entity| entity.try_borrow_mut())
            .collect::<Result<Vec<RefMut<'_, PhysicsEntity>>, _>>()
            .map_err(|_| PhysicsError::EntityBusy)?;

        // Clear previous step's contacts
        self.contacts.clear();

        for body in bodies.iter_mut() {
            if !body.is_static {
                body.velocity += self.config.gravity;
            }
            body.integrate();
            if self.config.clear_forces {
                body.clear_forces();
            }
        }

        // Each unordered pair once, in insertion order
        let count = bodies.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (head, tail) = bodies.split_at_mut(j);
                let a: &mut PhysicsEntity = &mut head[i];
                let b: &mut PhysicsEntity = &mut tail[0];

                if a.is_static && b.is_static {
                    continue;
                }
                if !collision::collides(&a.world_shape(), &b.world_shape()) {
                    continue;
                }

                let contact = self.resolve_collision(a, b);
                self.contacts.push(contact);
            }
        }

        self.step_count += 1;
        self.elapsed += dt;
        trace!(
            "{} step {} done: {} entities, {} contacts",
            self.id,
            self.step_count,
            count,
            self.contacts.len()
        );
        Ok(())
    }

    /// Separate two overlapping entities and apply an impulse along the
    /// contact normal
    ///
    /// Static entities are neither moved nor accelerated. Angular velocity is
    /// never changed.
    pub fn resolve_collision(&self, a: &mut PhysicsEntity, b: &mut PhysicsEntity) -> Contact {
        let mtv = collision::overlap(&a.world_shape(), &b.world_shape());
        let inv_mass_a = a.inverse_mass();
        let inv_mass_b = b.inverse_mass();
        let total_inv_mass = inv_mass_a + inv_mass_b;

        match self.config.correction {
            PositionalCorrection::Full => {
                if !a.is_static {
                    a.position -= mtv;
                }
                if !b.is_static {
                    b.position += mtv;
                }
            }
            PositionalCorrection::InverseMass => {
                if total_inv_mass > 0.0 {
                    a.position -= mtv * (inv_mass_a / total_inv_mass);
                    b.position += mtv * (inv_mass_b / total_inv_mass);
                }
            }
        }

        let mut contact = Contact {
            a: a.id(),
            b: b.id(),
            mtv,
            impulse: 0.0,
        };

        // The MTV points from a to b, the normal from b to a
        let normal = -mtv.normalized();
        let relative_velocity = a.velocity - b.velocity;
        let velocity_along_normal = relative_velocity.dot(normal);

        // Already separating
        if velocity_along_normal > 0.0 || total_inv_mass <= 0.0 {
            return contact;
        }

        let restitution = match self.config.restitution_source {
            RestitutionSource::World => self.config.restitution,
            RestitutionSource::Entities => a.bounciness().min(b.bounciness()),
        };

        let impulse_scalar = -(1.0 + restitution) * velocity_along_normal / total_inv_mass;
        let impulse = normal * impulse_scalar;

        if !a.is_static {
            a.velocity += impulse * inv_mass_a;
        }
        if !b.is_static {
            b.velocity -= impulse * inv_mass_b;
        }

        contact.impulse = impulse_scalar;
        debug!(
            "Resolved {} vs {}: depth {:.4}, impulse {:.4}",
            contact.a,
            contact.b,
            contact.depth(),
            impulse_scalar
        );
        contact
    }

    /// Contacts resolved during the last step
    pub fn contacts(&self) -> &[Contact] {
        self.contacts.as_slice()
    }

    /// Get current gravity
    pub fn gravity(&self) -> Vector2 {
        self.config.gravity
    }

    /// Set gravity for the physics world
    pub fn set_gravity(&mut self, gravity: Vector2) -> Result<(), PhysicsError> {
        if !gravity.is_finite() {
            return Err(PhysicsError::InvalidGravity(gravity));
        }
        self.config.gravity = gravity;
        Ok(())
    }

    pub fn restitution(&self) -> f64 {
        self.config.restitution
    }

    pub fn set_restitution(&mut self, restitution: f64) -> Result<(), PhysicsError> {
        validate_restitution(restitution)?;
        self.config.restitution = restitution;
        Ok(())
    }

    /// Number of completed steps
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Sum of all timesteps passed to successful steps
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// SAT overlap test, usable without a world
    pub fn collides(a: &Polygon, b: &Polygon) -> bool {
        collision::collides(a, b)
    }

    /// SAT separation distance, usable without a world
    pub fn distance_between(a: &Polygon, b: &Polygon) -> f64 {
        collision::distance_between(a, b)
    }

    /// SAT separation between a polygon and a point, usable without a world
    pub fn distance_from_polygon_to_point(polygon: &Polygon, point: Vector2) -> f64 {
        collision::distance_to_point(polygon, point)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PhysicsWorld {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Lifecycle for PhysicsWorld {
    fn update(&mut self, dt: f64) {
        if let Err(err) = self.step(dt) {
            warn!("{} skipped a step: {}", self.id, err);
        }
    }

    fn destroy(&mut self) {
        self.clear();
    }
}
