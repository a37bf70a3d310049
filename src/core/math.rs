// Math utilities and helper functions

use glam::DVec2;

/// 2D vector used for positions, velocities and directions.
///
/// Everything in the physics core is double precision. Addition, subtraction
/// and scaling come from the operator impls (`a + b`, `a -= b`, `a * s`,
/// `a *= s`); the rest of the vocabulary lives on [`Vector2Ext`].
pub type Vector2 = DVec2;

/// Lengths at or below this are treated as zero when normalizing edges
pub const EPSILON: f64 = 1e-12;

/// Screen-space direction constants (y grows downwards)
pub mod directions {
    use super::Vector2;

    pub const UP: Vector2 = Vector2::new(0.0, -1.0);
    pub const DOWN: Vector2 = Vector2::new(0.0, 1.0);
    pub const LEFT: Vector2 = Vector2::new(-1.0, 0.0);
    pub const RIGHT: Vector2 = Vector2::new(1.0, 0.0);
    pub const ONE: Vector2 = Vector2::new(1.0, 1.0);
}

/// Polar and in-place operations missing from glam's vector type.
///
/// Each mutating method has a pure counterpart returning a new value.
pub trait Vector2Ext: Sized + Copy {
    /// Build a vector from a length and an angle in radians
    fn from_polar(radius: f64, angle: f64) -> Self;

    /// Angle of the vector measured from the +x axis
    fn heading(self) -> f64;

    /// Same magnitude, pointing at `angle`
    fn with_heading(self, angle: f64) -> Self;

    fn set_heading(&mut self, angle: f64) {
        *self = self.with_heading(angle);
    }

    /// Euclidean length
    fn magnitude(self) -> f64;

    /// Same direction, new length. A zero vector stays zero.
    fn with_magnitude(self, magnitude: f64) -> Self;

    fn set_magnitude(&mut self, magnitude: f64) {
        *self = self.with_magnitude(magnitude);
    }

    /// Rotate about the origin by `angle` radians
    fn rotated(self, angle: f64) -> Self;

    fn rotate_by(&mut self, angle: f64) {
        *self = self.rotated(angle);
    }

    /// Scalar 2D cross product (z component of the 3D cross)
    fn cross(self, other: Self) -> f64;

    /// Rotate by +90 degrees
    fn perpendicular(self) -> Self;

    /// Unit vector in the same direction, or zero for a zero vector
    fn normalized(self) -> Self;

    fn normalize_mut(&mut self) {
        *self = self.normalized();
    }

    /// Clamp the magnitude to at most `max`
    fn limited(self, max: f64) -> Self;

    fn limit_mut(&mut self, max: f64) -> Self {
        *self = self.limited(max);
        *self
    }
}

impl Vector2Ext for Vector2 {
    fn from_polar(radius: f64, angle: f64) -> Self {
        Vector2::from_angle(angle) * radius
    }

    fn heading(self) -> f64 {
        self.y.atan2(self.x)
    }

    fn with_heading(self, angle: f64) -> Self {
        Self::from_polar(self.length(), angle)
    }

    fn magnitude(self) -> f64 {
        self.length()
    }

    fn with_magnitude(self, magnitude: f64) -> Self {
        self.normalized() * magnitude
    }

    fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vector2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    fn cross(self, other: Self) -> f64 {
        self.perp_dot(other)
    }

    fn perpendicular(self) -> Self {
        self.perp()
    }

    fn normalized(self) -> Self {
        self.normalize_or_zero()
    }

    fn limited(self, max: f64) -> Self {
        if self.length() > max {
            self.normalized() * max
        } else {
            self
        }
    }
}

/// Convert degrees to radians
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Convert radians to degrees
pub fn radians_to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Linear interpolation between two points
pub fn lerp_vector(a: Vector2, b: Vector2, t: f64) -> Vector2 {
    a.lerp(b, t)
}
