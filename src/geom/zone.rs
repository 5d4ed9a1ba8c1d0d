//! Thermal zones.
//!
//! Hierarchy: Building → Zone → Surface → Polygon

use crate::Polygon;
use crate::geom::polygon::validate_surface;
use crate::geom::surface::{Surface, SurfaceType};
use crate::{HasName, SortByName};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Space usage, driving internal loads, schedules and design cooling load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    Office,
    Retail,
    Lobby,
    Corridor,
    Storage,
    Mechanical,
    Residential,
    Warehouse,
}

impl UsageType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Office => "Office",
            Self::Retail => "Retail",
            Self::Lobby => "Lobby",
            Self::Corridor => "Corridor",
            Self::Storage => "Storage",
            Self::Mechanical => "Mechanical",
            Self::Residential => "Residential",
            Self::Warehouse => "Warehouse",
        }
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named thermal volume on one story.
///
/// `area` is authoritative: it is assigned by the zone model builder from the
/// authoritative building area and never recomputed from geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub story: u32,
    pub usage: UsageType,
    pub floor_to_floor_height: f64,
    footprint: Polygon,
    area: f64,
    surfaces: Vec<Surface>,
}

impl HasName for Zone {
    fn get_name(&self) -> &str {
        &self.name
    }
}

impl Zone {
    pub fn new(
        name: &str,
        story: u32,
        usage: UsageType,
        footprint: Polygon,
        floor_to_floor_height: f64,
        area: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            story,
            usage,
            floor_to_floor_height,
            footprint,
            area,
            surfaces: Vec::new(),
        }
    }

    /// Authoritative floor area in m^2.
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn footprint(&self) -> &Polygon {
        &self.footprint
    }

    /// Height of the zone floor above the building origin.
    pub fn base_z(&self) -> f64 {
        self.story as f64 * self.floor_to_floor_height
    }

    pub fn volume(&self) -> f64 {
        self.area * self.floor_to_floor_height
    }

    /// Surfaces in attachment order.
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Surfaces sorted by name.
    pub fn surfaces_by_name(&self) -> Vec<&Surface> {
        let mut surfaces: Vec<&Surface> = self.surfaces.iter().collect();
        surfaces.as_mut_slice().sort_by_name();
        surfaces
    }

    pub fn surfaces_of_type(&self, surface_type: SurfaceType) -> impl Iterator<Item = &Surface> {
        self.surfaces
            .iter()
            .filter(move |s| s.surface_type == surface_type)
    }

    pub fn surface(&self, name: &str) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.name == name)
    }

    pub(crate) fn surface_mut(&mut self, name: &str) -> Option<&mut Surface> {
        self.surfaces.iter_mut().find(|s| s.name == name)
    }

    /// Validates and attaches a surface.
    ///
    /// Degenerate surfaces are dropped with a warning instead of failing the zone:
    /// a zone with a missing surface is still usable, a degenerate one is not.
    /// Returns true if the surface was attached.
    pub fn attach_surface(&mut self, mut surface: Surface, tol: f64, min_area: f64) -> bool {
        match validate_surface(&surface.polygon, tol, min_area) {
            Ok(cleaned) => {
                surface.polygon = cleaned;
                surface.zone = self.name.clone();
                self.surfaces.push(surface);
                true
            }
            Err(reason) => {
                warn!(zone = %self.name, surface = %surface.name, %reason, "dropping degenerate surface");
                false
            }
        }
    }

    /// Attaches a surface without validating it.
    ///
    /// Only for surfaces that were validated elsewhere; the pre-serialization validator
    /// re-checks every surface regardless.
    pub fn attach_surface_unchecked(&mut self, mut surface: Surface) {
        surface.zone = self.name.clone();
        self.surfaces.push(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use crate::geom::surface::Adjacency;
    use crate::geom::{COINCIDENT_TOLERANCE, MIN_SURFACE_AREA};

    fn zone() -> Zone {
        let fp = Polygon::from_xy(&[(0., 0.), (4., 0.), (4., 5.), (0., 5.)], 0.);
        Zone::new("Z1", 2, UsageType::Office, fp, 3.5, 20.)
    }

    #[test]
    fn test_zone_geometry_helpers() {
        let z = zone();
        assert_eq!(z.area(), 20.);
        assert!((z.base_z() - 7.).abs() < 1e-12);
        assert!((z.volume() - 70.).abs() < 1e-12);
    }

    #[test]
    fn test_attach_valid_surface() {
        let mut z = zone();
        let poly = Polygon::from_xy(&[(0., 0.), (4., 0.), (4., 5.), (0., 5.)], 7.);
        let s = Surface::new("Z1_Floor", "other", SurfaceType::Floor, poly, "c", Adjacency::Adiabatic);
        assert!(z.attach_surface(s, COINCIDENT_TOLERANCE, MIN_SURFACE_AREA));
        assert_eq!(z.surfaces().len(), 1);
        // Ownership is always the attaching zone
        assert_eq!(z.surfaces()[0].zone, "Z1");
    }

    #[test]
    fn test_attach_degenerate_surface_is_dropped() {
        let mut z = zone();
        let poly = Polygon::new(vec![
            Point::new(0., 0., 0.),
            Point::new(0., 0., 0.0005),
            Point::new(0., 0., 3.),
        ]);
        let s = Surface::new("Z1_Wall_1", "Z1", SurfaceType::Wall, poly, "c", Adjacency::Exterior);
        assert!(!z.attach_surface(s, COINCIDENT_TOLERANCE, MIN_SURFACE_AREA));
        assert!(z.surfaces().is_empty());
    }
}
