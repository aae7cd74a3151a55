pub mod point;
pub mod polygon;

pub use point::{CoordinateError, GeoPoint};
pub use polygon::{IncompletePolygon, Polygon, VERTEX_COUNT};
