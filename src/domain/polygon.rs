use thiserror::Error;

use super::point::GeoPoint;

/// Number of vertices in a complete delivery-range polygon
pub const VERTEX_COUNT: usize = 4;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("polygon requires exactly {VERTEX_COUNT} vertices, got {0}")]
pub struct IncompletePolygon(pub usize);

/// A closed quadrilateral delivery range.
///
/// Vertex order is insertion order and defines the edge sequence; the last
/// vertex implicitly connects back to the first. A `Polygon` can only be
/// constructed from a complete vertex set, so holders never need to
/// re-check the count. Partial selections live in the wizard state, not
/// here.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: [GeoPoint; VERTEX_COUNT],
}

impl Polygon {
    /// Build a polygon from collected vertices, in pick order.
    pub fn new(vertices: Vec<GeoPoint>) -> Result<Self, IncompletePolygon> {
        let count = vertices.len();
        let vertices: [GeoPoint; VERTEX_COUNT] =
            vertices.try_into().map_err(|_| IncompletePolygon(count))?;
        Ok(Self { vertices })
    }

    pub fn from_corners(corners: [GeoPoint; VERTEX_COUNT]) -> Self {
        Self { vertices: corners }
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }
}
