use crate::error::GeometryError;
use crate::geom::COINCIDENT_TOLERANCE;
use crate::geom::polygon::{Polygon, fix_ceiling_orientation, validate_surface};

/// Boundary polygons of one extruded zone volume.
///
/// The floor faces down (tilt 180), the ceiling faces up (tilt 0) and walls face
/// outwards. Walls follow the footprint edge order.
#[derive(Debug, Clone, PartialEq)]
pub struct Extrusion {
    pub floor: Polygon,
    pub ceiling: Polygon,
    pub walls: Vec<Polygon>,
}

/// Extrudes a plan footprint vertically from `base_z` by `height`.
///
/// Only the x and y coordinates of the footprint are used. The footprint must have at
/// least 3 distinct vertices and a positive area, otherwise the whole volume is
/// unusable and a `GeometryError` is returned.
///
/// Wall vertices start at the upper-left corner as seen from outside and run
/// counterclockwise.
pub fn extrude_footprint(
    footprint: &Polygon,
    base_z: f64,
    height: f64,
) -> Result<Extrusion, GeometryError> {
    if !(height.is_finite() && height > 0.) {
        return Err(GeometryError::InvalidHeight { height });
    }
    let base = validate_surface(&footprint.at_z(base_z), COINCIDENT_TOLERANCE, 0.)?;
    // Counterclockwise seen from above
    let base = match base.normal() {
        Some(n) if n.dz < 0. => base.reversed(),
        _ => base,
    };
    let top_z = base_z + height;

    let walls = base
        .edges()
        .into_iter()
        .map(|(a, b)| Polygon::new(vec![a.with_z(top_z), a, b, b.with_z(top_z)]))
        .collect();

    Ok(Extrusion {
        floor: base.reversed(),
        ceiling: fix_ceiling_orientation(&base.at_z(top_z)),
        walls,
    })
}
