use crate::HasName;
use crate::geom::polygon::Polygon;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    Wall,
    Floor,
    Ceiling,
    Roof,
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// What lies on the other side of a surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Adjacency {
    Exterior,
    Ground,
    /// Heat exchange across the surface is neglected (floors between stories).
    Adiabatic,
    /// Interior partition. The neighbour owns its own mirrored surface.
    Zone { zone: String, surface: String },
}

/// One side of a zone boundary.
///
/// Interior partitions are two one-sided surfaces, one per zone, referencing each
/// other by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub name: String,
    pub zone: String,
    pub surface_type: SurfaceType,
    pub polygon: Polygon,
    pub construction: String,
    pub adjacency: Adjacency,
}

impl Surface {
    pub fn new(
        name: &str,
        zone: &str,
        surface_type: SurfaceType,
        polygon: Polygon,
        construction: &str,
        adjacency: Adjacency,
    ) -> Self {
        Self {
            name: name.to_string(),
            zone: zone.to_string(),
            surface_type,
            polygon,
            construction: construction.to_string(),
            adjacency,
        }
    }

    pub fn area(&self) -> f64 {
        self.polygon.area()
    }

    /// Exposed to sun and wind.
    pub fn is_exterior(&self) -> bool {
        self.adjacency == Adjacency::Exterior
    }
}

impl HasName for Surface {
    fn get_name(&self) -> &str {
        &self.name
    }
}
