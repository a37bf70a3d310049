// Convex polygon geometry shared by the physics core

mod polygon;

pub use polygon::{Polygon, Projection};

/// Errors raised when building geometry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("A polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("Vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },
}
