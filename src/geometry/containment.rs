use crate::domain::{GeoPoint, Polygon};

/// Even-odd ray-casting point-in-polygon test.
///
/// Latitude is treated as the x-axis and longitude as the y-axis. A
/// horizontal ray is cast from the test point and `inside` toggles on each
/// edge crossing, walking edges in vertex order with the last vertex
/// closing back to the first.
///
/// A point exactly on a vertex or edge gets platform-dependent
/// classification; callers must not rely on boundary behavior.
pub fn contains(point: GeoPoint, polygon: &Polygon) -> bool {
    let vertices = polygon.vertices();
    let x = point.lat();
    let y = point.lon();

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let xi = vertices[i].lat();
        let yi = vertices[i].lon();
        let xj = vertices[j].lat();
        let yj = vertices[j].lon();

        let crosses = (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }

    inside
}
