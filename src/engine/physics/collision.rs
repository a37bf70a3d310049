use crate::core::math::Vector2;
use crate::engine::geometry::Polygon;

use super::entity::EntityId;

// Separating Axis Theorem routines. Candidate axes are the unit edge normals
// of both polygons; every routine is O((edges_a + edges_b) * vertices).

/// True when no candidate axis separates the two polygons
///
/// Touching shapes (projections sharing a single point) count as colliding.
/// A polygon with no usable axis (collapsed or non-finite edges) never
/// collides, whatever the other polygon is.
pub fn collides(a: &Polygon, b: &Polygon) -> bool {
    if !(a.has_axes() && b.has_axes()) {
        return false;
    }
    a.axes()
        .chain(b.axes())
        .all(|axis| !a.project(axis).is_disjoint(&b.project(axis)))
}

/// Minimum translation vector between two polygons
///
/// Zero when any axis separates them. Otherwise the axis with the smallest
/// overlap, scaled by that overlap and oriented from `a` toward `b`: moving
/// `a` by `-mtv` or `b` by `+mtv` removes the penetration.
pub fn overlap(a: &Polygon, b: &Polygon) -> Vector2 {
    if !(a.has_axes() && b.has_axes()) {
        return Vector2::ZERO;
    }

    let mut smallest: Option<(f64, Vector2)> = None;

    for axis in a.axes().chain(b.axes()) {
        let amount = a.project(axis).overlap(&b.project(axis));
        if amount < 0.0 {
            return Vector2::ZERO;
        }
        if smallest.map_or(true, |(best, _)| amount < best) {
            smallest = Some((amount, axis));
        }
    }

    match smallest {
        Some((amount, axis)) => {
            let toward_b = b.center() - a.center();
            let axis = if axis.dot(toward_b) < 0.0 { -axis } else { axis };
            axis * amount
        }
        None => Vector2::ZERO,
    }
}

/// Separation between two polygons along the best separating axis
///
/// Zero when they overlap or touch. Otherwise the widest gap found on any
/// candidate axis, which is a lower bound on the true distance and exact
/// for face-to-face configurations.
pub fn distance_between(a: &Polygon, b: &Polygon) -> f64 {
    a.axes()
        .chain(b.axes())
        .map(|axis| a.project(axis).gap(&b.project(axis)))
        .fold(0.0, f64::max)
}

/// Separation between a polygon and a point, zero when the point is inside
pub fn distance_to_point(polygon: &Polygon, point: Vector2) -> f64 {
    polygon
        .axes()
        .map(|axis| {
            let projection = polygon.project(axis);
            let p = axis.dot(point);
            (projection.min - p).max(p - projection.max)
        })
        .fold(0.0, f64::max)
}

/// A resolved collision recorded during a world step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
    /// Minimum translation vector, pointing from `a` toward `b`
    pub mtv: Vector2,
    /// Scalar impulse applied along the contact normal (0 when none was needed)
    pub impulse: f64,
}

impl Contact {
    /// Penetration depth before correction
    pub fn depth(&self) -> f64 {
        self.mtv.length()
    }

    /// Whether the contact involves the given entity
    pub fn involves(&self, id: EntityId) -> bool {
        self.a == id || self.b == id
    }
}

/// Contacts produced by the most recent step
#[derive(Debug, Default)]
pub struct ContactQueue {
    contacts: Vec<Contact>,
}

impl ContactQueue {
    pub fn new() -> Self {
        Self {
            contacts: Vec::with_capacity(32), // Pre-allocate for common case
        }
    }

    /// Clear all contacts (call at start of physics step)
    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    pub fn push(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    pub fn as_slice(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
