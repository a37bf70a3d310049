use super::GeometryError;
use crate::core::math::{Vector2, Vector2Ext, EPSILON};
use crate::engine::physics::collision;

/// Scalar interval covered by a shape projected onto an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub min: f64,
    pub max: f64,
}

impl Projection {
    /// Length of the shared part of both intervals (negative when disjoint)
    pub fn overlap(&self, other: &Projection) -> f64 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// Size of the empty gap between both intervals (negative when they overlap)
    pub fn gap(&self, other: &Projection) -> f64 {
        (self.min - other.max).max(other.min - self.max)
    }

    /// True when the intervals share no point. Touching intervals are not disjoint.
    pub fn is_disjoint(&self, other: &Projection) -> bool {
        self.max < other.min || other.max < self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Ordered loop of vertices describing a convex polygon
///
/// Vertices are stored as given. Convexity is assumed, not checked; the SAT
/// routines give meaningless answers for concave input.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vector2>,
}

impl Polygon {
    /// Create a polygon from at least three finite vertices
    pub fn new(vertices: Vec<Vector2>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(GeometryError::NonFiniteVertex { index });
        }
        Ok(Self { vertices })
    }

    /// Axis-aligned rectangle with its top-left corner at `(x, y)`
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Result<Self, GeometryError> {
        Self::new(vec![
            Vector2::new(x, y),
            Vector2::new(x + width, y),
            Vector2::new(x + width, y + height),
            Vector2::new(x, y + height),
        ])
    }

    /// Axis-aligned rectangle centered on the origin
    pub fn centered_rectangle(width: f64, height: f64) -> Result<Self, GeometryError> {
        Self::rectangle(-width / 2.0, -height / 2.0, width, height)
    }

    /// Regular polygon centered on the origin, first vertex pointing up
    pub fn regular(sides: usize, radius: f64) -> Result<Self, GeometryError> {
        let step = std::f64::consts::TAU / sides as f64;
        let start = -std::f64::consts::FRAC_PI_2;
        let vertices = (0..sides)
            .map(|i| Vector2::from_polar(radius, start + step * i as f64))
            .collect();
        Self::new(vertices)
    }

    pub fn vertices(&self) -> &[Vector2] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Edge vectors `v[i+1] - v[i]`, wrapping around to close the loop
    pub fn edges(&self) -> Vec<Vector2> {
        self.edge_iter().collect()
    }

    fn edge_iter(&self) -> impl Iterator<Item = Vector2> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| self.vertices[(i + 1) % n] - self.vertices[i])
    }

    /// Unit edge normals used as SAT candidate axes
    ///
    /// Zero-length and non-finite edges have no direction and are skipped.
    pub fn axes(&self) -> impl Iterator<Item = Vector2> + '_ {
        self.edge_iter().filter_map(|edge| {
            let length = edge.length();
            if length.is_finite() && length > EPSILON {
                Some(edge.perpendicular() / length)
            } else {
                None
            }
        })
    }

    /// Whether at least one edge yields a SAT axis
    pub fn has_axes(&self) -> bool {
        self.axes().next().is_some()
    }

    /// Arithmetic mean of the vertices
    ///
    /// This is not the area-weighted centroid: for irregular vertex
    /// distributions the two differ.
    pub fn center(&self) -> Vector2 {
        let sum: Vector2 = self.vertices.iter().copied().sum();
        sum / self.vertices.len() as f64
    }

    /// Same as [`Polygon::center`]
    pub fn position(&self) -> Vector2 {
        self.center()
    }

    /// Translate so that the center lands on `position`
    pub fn set_position(&mut self, position: Vector2) {
        let offset = position - self.center();
        self.translate(offset);
    }

    /// Smallest y (screen space, y grows downwards)
    pub fn top(&self) -> f64 {
        self.vertices.iter().map(|v| v.y).fold(f64::INFINITY, f64::min)
    }

    pub fn set_top(&mut self, top: f64) {
        let dy = top - self.top();
        self.translate(Vector2::new(0.0, dy));
    }

    pub fn bottom(&self) -> f64 {
        self.vertices.iter().map(|v| v.y).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn set_bottom(&mut self, bottom: f64) {
        let dy = bottom - self.bottom();
        self.translate(Vector2::new(0.0, dy));
    }

    pub fn left(&self) -> f64 {
        self.vertices.iter().map(|v| v.x).fold(f64::INFINITY, f64::min)
    }

    pub fn set_left(&mut self, left: f64) {
        let dx = left - self.left();
        self.translate(Vector2::new(dx, 0.0));
    }

    pub fn right(&self) -> f64 {
        self.vertices.iter().map(|v| v.x).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn set_right(&mut self, right: f64) {
        let dx = right - self.right();
        self.translate(Vector2::new(dx, 0.0));
    }

    pub fn width(&self) -> f64 {
        self.right() - self.left()
    }

    pub fn height(&self) -> f64 {
        self.bottom() - self.top()
    }

    /// Enclosed area (shoelace formula), independent of winding order
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        let twice_area: f64 = (0..n)
            .map(|i| self.vertices[i].cross(self.vertices[(i + 1) % n]))
            .sum();
        (twice_area / 2.0).abs()
    }

    pub fn perimeter(&self) -> f64 {
        self.edge_iter().map(|edge| edge.length()).sum()
    }

    /// Project every vertex onto `axis`
    ///
    /// `axis` should be a unit vector for the result to be a distance.
    pub fn project(&self, axis: Vector2) -> Projection {
        let first = axis.dot(self.vertices[0]);
        self.vertices[1..]
            .iter()
            .fold(Projection { min: first, max: first }, |acc, vertex| {
                let p = axis.dot(*vertex);
                Projection {
                    min: acc.min.min(p),
                    max: acc.max.max(p),
                }
            })
    }

    /// Move every vertex by `offset`
    pub fn translate(&mut self, offset: Vector2) {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
    }

    /// Rotate around `pivot`, or around the polygon's center when `None`
    pub fn rotate(&mut self, angle: f64, pivot: Option<Vector2>) {
        let pivot = pivot.unwrap_or_else(|| self.center());
        for vertex in &mut self.vertices {
            *vertex = (*vertex - pivot).rotated(angle) + pivot;
        }
    }

    /// Scale around `pivot`, or around the polygon's center when `None`
    pub fn scale(&mut self, factor: f64, pivot: Option<Vector2>) {
        let pivot = pivot.unwrap_or_else(|| self.center());
        for vertex in &mut self.vertices {
            *vertex = (*vertex - pivot) * factor + pivot;
        }
    }

    /// Point-in-polygon test: the point must fall inside the polygon's
    /// projection on every edge normal
    pub fn contains_point(&self, point: Vector2) -> bool {
        let mut tested = false;
        for axis in self.axes() {
            tested = true;
            if !self.project(axis).contains(axis.dot(point)) {
                return false;
            }
        }
        tested
    }

    /// SAT overlap test against another polygon
    pub fn collides_with(&self, other: &Polygon) -> bool {
        collision::collides(self, other)
    }

    /// Minimum translation vector pointing from `self` toward `other`
    pub fn overlap(&self, other: &Polygon) -> Vector2 {
        collision::overlap(self, other)
    }

    /// SAT separation distance; zero when the polygons overlap or touch
    pub fn distance_to(&self, other: &Polygon) -> f64 {
        collision::distance_between(self, other)
    }

    /// SAT separation distance to a point; zero when the point is inside
    pub fn distance_to_point(&self, point: Vector2) -> f64 {
        collision::distance_to_point(self, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    fn unit_square() -> Polygon {
        Polygon::rectangle(0.0, 0.0, 1.0, 1.0).unwrap()
    }

    #[test]
    fn test_new_rejects_too_few_vertices() {
        let err = Polygon::new(vec![Vector2::ZERO, Vector2::X]).unwrap_err();
        assert_eq!(err, GeometryError::TooFewVertices(2));
    }

    #[test]
    fn test_new_rejects_non_finite_vertex() {
        let err = Polygon::new(vec![Vector2::ZERO, Vector2::new(f64::NAN, 1.0), Vector2::Y])
            .unwrap_err();
        assert_eq!(err, GeometryError::NonFiniteVertex { index: 1 });
    }

    #[test]
    fn test_rectangle_rejects_non_finite_size() {
        let err = Polygon::rectangle(0.0, 0.0, f64::NAN, 1.0).unwrap_err();
        assert_eq!(err, GeometryError::NonFiniteVertex { index: 1 });

        let err = Polygon::centered_rectangle(1.0, f64::INFINITY).unwrap_err();
        assert!(matches!(err, GeometryError::NonFiniteVertex { .. }));
    }

    #[test]
    fn test_edges_wrap_around() {
        let edges = unit_square().edges();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0], Vector2::new(1.0, 0.0));
        assert_eq!(edges[3], Vector2::new(0.0, -1.0));
        let total: Vector2 = edges.iter().copied().sum();
        assert_eq!(total, Vector2::ZERO);
    }

    #[test]
    fn test_center_is_vertex_mean() {
        assert_eq!(unit_square().center(), Vector2::new(0.5, 0.5));

        // Mean of vertices, not area centroid: an extra collinear vertex shifts it
        let skewed = Polygon::new(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(2.0, 2.0),
            Vector2::new(0.0, 2.0),
        ])
        .unwrap();
        assert_relative_eq!(skewed.center().x, 1.0);
        assert_relative_eq!(skewed.center().y, 0.8);
    }

    #[test]
    fn test_bounds_and_size() {
        let rect = Polygon::rectangle(2.0, 3.0, 4.0, 5.0).unwrap();
        assert_eq!(rect.left(), 2.0);
        assert_eq!(rect.right(), 6.0);
        assert_eq!(rect.top(), 3.0);
        assert_eq!(rect.bottom(), 8.0);
        assert_eq!(rect.width(), 4.0);
        assert_eq!(rect.height(), 5.0);
    }

    #[test]
    fn test_bound_setters_translate() {
        let mut rect = Polygon::rectangle(0.0, 0.0, 2.0, 2.0).unwrap();
        rect.set_left(10.0);
        rect.set_bottom(-1.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.right(), 12.0);
        assert_eq!(rect.bottom(), -1.0);
        assert_eq!(rect.top(), -3.0);

        rect.set_right(0.0);
        rect.set_top(0.0);
        assert_eq!(rect, Polygon::rectangle(-2.0, 0.0, 2.0, 2.0).unwrap());
    }

    #[test]
    fn test_set_position_moves_center() {
        let mut rect = Polygon::centered_rectangle(2.0, 4.0).unwrap();
        rect.set_position(Vector2::new(5.0, 5.0));
        assert_eq!(rect.position(), Vector2::new(5.0, 5.0));
        assert_eq!(rect.left(), 4.0);
        assert_eq!(rect.top(), 3.0);
    }

    #[test]
    fn test_area_and_perimeter() {
        let rect = Polygon::rectangle(0.0, 0.0, 3.0, 2.0).unwrap();
        assert_relative_eq!(rect.area(), 6.0);
        assert_relative_eq!(rect.perimeter(), 10.0);

        // Winding order does not change the area
        let reversed = Polygon::new(rect.vertices().iter().rev().copied().collect()).unwrap();
        assert_relative_eq!(reversed.area(), 6.0);
    }

    #[test]
    fn test_regular_polygon() {
        let hexagon = Polygon::regular(6, 1.0).unwrap();
        assert_eq!(hexagon.vertex_count(), 6);
        assert_abs_diff_eq!(hexagon.center(), Vector2::ZERO, epsilon = 1e-12);
        assert_abs_diff_eq!(hexagon.vertices()[0], Vector2::new(0.0, -1.0), epsilon = 1e-12);
        assert_relative_eq!(hexagon.perimeter(), 6.0, epsilon = 1e-12);

        assert_eq!(
            Polygon::regular(2, 1.0).unwrap_err(),
            GeometryError::TooFewVertices(2)
        );
    }

    #[test]
    fn test_project_onto_axis() {
        let rect = Polygon::rectangle(1.0, 0.0, 2.0, 1.0).unwrap();
        assert_eq!(rect.project(Vector2::X), Projection { min: 1.0, max: 3.0 });
        assert_eq!(rect.project(Vector2::Y), Projection { min: 0.0, max: 1.0 });
    }

    #[test]
    fn test_projection_interval_math() {
        let a = Projection { min: 0.0, max: 2.0 };
        let b = Projection { min: 1.5, max: 4.0 };
        let c = Projection { min: 2.0, max: 3.0 };
        let d = Projection { min: 5.0, max: 6.0 };

        assert_eq!(a.overlap(&b), 0.5);
        assert_eq!(a.gap(&b), -0.5);
        assert!(!a.is_disjoint(&b));

        // Touching intervals share a point
        assert_eq!(a.overlap(&c), 0.0);
        assert!(!a.is_disjoint(&c));

        assert_eq!(a.gap(&d), 3.0);
        assert!(a.is_disjoint(&d));
    }

    #[test]
    fn test_translate_rotate_scale() {
        let mut square = Polygon::centered_rectangle(2.0, 2.0).unwrap();
        square.translate(Vector2::new(3.0, 0.0));
        assert_eq!(square.center(), Vector2::new(3.0, 0.0));

        // Rotation around its own center keeps the center in place
        square.rotate(FRAC_PI_2, None);
        assert_abs_diff_eq!(square.center(), Vector2::new(3.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(square.vertices()[0], Vector2::new(4.0, -1.0), epsilon = 1e-12);

        square.scale(2.0, None);
        assert_relative_eq!(square.width(), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(square.center(), Vector2::new(3.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_about_explicit_pivot() {
        let mut square = unit_square();
        square.rotate(FRAC_PI_2, Some(Vector2::ZERO));
        assert_abs_diff_eq!(square.vertices()[1], Vector2::new(0.0, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(square.center(), Vector2::new(-0.5, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = unit_square();
        let mut copy = original.clone();
        copy.translate(Vector2::new(10.0, 0.0));
        assert_eq!(original.left(), 0.0);
        assert_eq!(copy.left(), 10.0);
    }

    #[test]
    fn test_contains_point() {
        let square = unit_square();
        assert!(square.contains_point(Vector2::new(0.5, 0.5)));
        assert!(square.contains_point(Vector2::new(1.0, 0.5)));
        assert!(!square.contains_point(Vector2::new(1.5, 0.5)));
        assert!(!square.contains_point(Vector2::new(-0.1, -0.1)));
    }

    #[test]
    fn test_zero_length_edges_are_skipped() {
        let with_duplicate = Polygon::new(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ])
        .unwrap();
        assert_eq!(with_duplicate.axes().count(), 4);
        assert!(with_duplicate.axes().all(|axis| axis.x.is_finite() && axis.y.is_finite()));
        assert!(with_duplicate.contains_point(Vector2::new(0.5, 0.5)));
    }

    #[test]
    fn test_collapsed_polygon_contains_nothing() {
        let mut collapsed = unit_square();
        collapsed.scale(0.0, None);
        assert_eq!(collapsed.axes().count(), 0);
        assert!(!collapsed.contains_point(collapsed.center()));
    }

    #[test]
    fn test_sat_wrappers_match_free_functions() {
        let a = Polygon::rectangle(0.0, 0.0, 2.0, 2.0).unwrap();
        let b = Polygon::rectangle(1.5, 0.0, 2.0, 2.0).unwrap();
        let far = Polygon::rectangle(5.0, 0.0, 1.0, 1.0).unwrap();

        assert!(a.collides_with(&b));
        assert!(!a.collides_with(&far));

        assert_abs_diff_eq!(a.overlap(&b), Vector2::new(0.5, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(b.overlap(&a), Vector2::new(-0.5, 0.0), epsilon = 1e-12);
        assert_eq!(a.overlap(&far), Vector2::ZERO);

        assert_eq!(a.distance_to(&b), 0.0);
        assert_relative_eq!(a.distance_to(&far), 3.0);
        assert_relative_eq!(a.distance_to_point(Vector2::new(4.0, 1.0)), 2.0);
    }
}
