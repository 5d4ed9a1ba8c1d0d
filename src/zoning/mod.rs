//! Zone Model Builder.
//!
//! Turns an [`AreaPlan`] and a [`BuildingType`] into zones with surfaces:
//! every story footprint is partitioned by the building type's usage template, each
//! zone receives its share of the authoritative story area, and the walls between
//! neighbouring zones are paired as interior partitions.

pub mod area;
pub mod template;

pub use area::{AreaPlan, resolve_area};
pub use template::{BuildingType, UsageTemplate, ZonePiece};

use crate::config::GeometrySettings;
use crate::envelope::ConstructionSet;
use crate::error::ZoneModelError;
use crate::geom::extrude::extrude_footprint;
use crate::geom::footprint::Rect;
use crate::geom::surface::{Adjacency, Surface, SurfaceType};
use crate::geom::zone::Zone;
use crate::{Point, Polygon};
use tracing::debug;

/// Relative tolerance on the per-story area sum.
pub const AREA_TOLERANCE: f64 = 1e-4;

/// Output of the zone model builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneModel {
    pub zones: Vec<Zone>,
    /// Names of surfaces dropped as degenerate.
    pub dropped_surfaces: Vec<String>,
}

/// Builds the zones of every story.
pub fn build_zones(
    plan: &AreaPlan,
    building_type: BuildingType,
    settings: &GeometrySettings,
    constructions: &ConstructionSet,
) -> Result<ZoneModel, ZoneModelError> {
    let stories = plan.story_count();
    if stories == 0 {
        return Err(ZoneModelError::InvalidStoryCount { stories });
    }
    let story_area = plan.story_area();
    if !(story_area.is_finite() && story_area > 0.) {
        return Err(ZoneModelError::InvalidArea {
            quantity: "floor area per story",
            value: story_area,
        });
    }
    let rect = Rect::from_area(story_area, building_type.aspect_ratio(settings))
        .map_err(|source| ZoneModelError::Footprint { story: 0, source })?;
    let template = building_type.template();

    let mut model = ZoneModel {
        zones: Vec::new(),
        dropped_surfaces: Vec::new(),
    };
    for story in 0..stories {
        let pieces = template.partition(&rect, story, stories, settings);
        if pieces.is_empty() {
            return Err(ZoneModelError::EmptyPartition {
                template: template.to_string(),
                story,
            });
        }
        let mut story_zones = build_story(
            &pieces,
            &rect,
            story,
            stories,
            story_area,
            settings,
            constructions,
            &mut model.dropped_surfaces,
        )?;
        check_area_conservation(&story_zones, story, story_area)?;
        pair_interior_walls(&mut story_zones, constructions, settings.coincident_tolerance_m);
        debug!(story, zones = story_zones.len(), "built story");
        model.zones.extend(story_zones);
    }
    Ok(model)
}

pub fn zone_name(story: u32, label: &str) -> String {
    format!("F{:02}_{}", story + 1, label)
}

#[allow(clippy::too_many_arguments)]
fn build_story(
    pieces: &[ZonePiece],
    rect: &Rect,
    story: u32,
    stories: u32,
    story_area: f64,
    settings: &GeometrySettings,
    constructions: &ConstructionSet,
    dropped: &mut Vec<String>,
) -> Result<Vec<Zone>, ZoneModelError> {
    let tol = settings.coincident_tolerance_m;
    let min_area = settings.min_surface_area_m2;
    let height = settings.floor_to_floor_height_m;
    let top = story + 1 == stories;

    // Every vertex on this story, so that T-junctions can be split on both sides
    let candidates: Vec<Point> = pieces
        .iter()
        .flat_map(|p| p.footprint.vertices().iter().copied())
        .collect();

    let mut zones = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let name = zone_name(story, &piece.label);
        let area = story_area * piece.footprint.area() / rect.area();
        let footprint = piece.footprint.split_edges_at(&candidates, tol);
        let mut zone = Zone::new(&name, story, piece.usage, footprint.clone(), height, area);
        let ex = extrude_footprint(&footprint, zone.base_z(), height)
            .map_err(|source| ZoneModelError::Footprint { story, source })?;

        let (floor_construction, floor_adjacency) = if story == 0 {
            (&constructions.ground_floor, Adjacency::Ground)
        } else {
            (&constructions.interior_floor, Adjacency::Adiabatic)
        };
        let (ceiling_type, ceiling_construction, ceiling_adjacency) = if top {
            (SurfaceType::Roof, &constructions.roof, Adjacency::Exterior)
        } else {
            (SurfaceType::Ceiling, &constructions.interior_ceiling, Adjacency::Adiabatic)
        };

        let mut surfaces = vec![
            Surface::new(
                &format!("{name}_Floor"),
                &name,
                SurfaceType::Floor,
                ex.floor.remove_collinear_vertices(tol),
                floor_construction,
                floor_adjacency,
            ),
            Surface::new(
                &format!("{name}_{ceiling_type}"),
                &name,
                ceiling_type,
                ex.ceiling.remove_collinear_vertices(tol),
                ceiling_construction,
                ceiling_adjacency,
            ),
        ];
        for (i, wall) in ex.walls.into_iter().enumerate() {
            surfaces.push(Surface::new(
                &format!("{name}_Wall{}", i + 1),
                &name,
                SurfaceType::Wall,
                wall,
                &constructions.exterior_wall,
                Adjacency::Exterior,
            ));
        }
        for surface in surfaces {
            let surface_name = surface.name.clone();
            if !zone.attach_surface(surface, tol, min_area) {
                dropped.push(surface_name);
            }
        }
        zones.push(zone);
    }
    Ok(zones)
}

fn check_area_conservation(zones: &[Zone], story: u32, expected: f64) -> Result<(), ZoneModelError> {
    let actual: f64 = zones.iter().map(|z| z.area()).sum();
    if (actual - expected).abs() <= AREA_TOLERANCE * expected {
        Ok(())
    } else {
        Err(ZoneModelError::AreaNotConserved {
            story,
            expected,
            actual,
        })
    }
}

/// Turns walls shared by two zones of the same story into paired interior
/// partitions. Walls without a mirrored counterpart stay exterior.
pub fn pair_interior_walls(zones: &mut [Zone], constructions: &ConstructionSet, tol: f64) {
    let walls: Vec<(usize, String, Polygon)> = zones
        .iter()
        .enumerate()
        .flat_map(|(zi, z)| {
            z.surfaces_of_type(SurfaceType::Wall)
                .map(move |s| (zi, s.name.clone(), s.polygon.clone()))
        })
        .collect();

    let mut links: Vec<(usize, String, String, String)> = Vec::new();
    for (i, (zi, name, poly)) in walls.iter().enumerate() {
        let centroid = poly.centroid();
        let mirror = walls.iter().enumerate().find(|(j, (zj, _, other))| {
            *j != i
                && zj != zi
                && other.centroid().distance(&centroid) < tol
                && is_mirror(poly, other, tol)
        });
        if let Some((_, (zj, other_name, _))) = mirror {
            links.push((*zi, name.clone(), zones[*zj].name.clone(), other_name.clone()));
        }
    }

    for (zi, name, other_zone, other_surface) in links {
        if let Some(s) = zones[zi].surface_mut(&name) {
            s.adjacency = Adjacency::Zone {
                zone: other_zone,
                surface: other_surface,
            };
            s.construction = constructions.interior_wall.clone();
        }
    }
}

/// Same vertices, opposite facing.
fn is_mirror(a: &Polygon, b: &Polygon, tol: f64) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let same_vertices = a
        .vertices()
        .iter()
        .all(|p| b.vertices().iter().any(|q| p.distance(q) < tol));
    let opposite = match (a.normal(), b.normal()) {
        (Some(na), Some(nb)) => na.dot(nb) < -0.99,
        _ => false,
    };
    same_vertices && opposite
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::ParameterRecord;
    use crate::envelope::ConstructionEra;

    fn plan(per_story: f64, stories: u32) -> Result<AreaPlan, ZoneModelError> {
        let params = ParameterRecord {
            floor_area_per_story_m2: Some(per_story),
            stories: Some(stories),
            ..Default::default()
        };
        resolve_area(&params, None, BuildingType::Office)
    }

    fn constructions() -> ConstructionSet {
        ConstructionSet::for_era(ConstructionEra::Post2004)
    }

    #[test]
    fn test_ten_story_office_has_256_zones() -> Result<(), ZoneModelError> {
        let model = build_zones(
            &plan(1500., 10)?,
            BuildingType::Office,
            &GeometrySettings::default(),
            &constructions(),
        )?;
        assert_eq!(model.zones.len(), 256);
        assert!(model.dropped_surfaces.is_empty());
        let total: f64 = model.zones.iter().map(|z| z.area()).sum();
        assert!((total - 15000.).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_story_area_is_conserved() -> Result<(), ZoneModelError> {
        let settings = GeometrySettings::default();
        for bt in BuildingType::ALL {
            let model = build_zones(&plan(1234.5, 3)?, bt, &settings, &constructions())?;
            for story in 0..3 {
                let sum: f64 = model.zones.iter().filter(|z| z.story == story).map(|z| z.area()).sum();
                assert!((sum - 1234.5).abs() <= AREA_TOLERANCE * 1234.5, "{bt}: {sum}");
            }
        }
        Ok(())
    }

    #[test]
    fn test_interior_walls_are_paired_both_ways() -> Result<(), ZoneModelError> {
        let model = build_zones(
            &plan(1500., 1)?,
            BuildingType::Office,
            &GeometrySettings::default(),
            &constructions(),
        )?;
        let mut interior = 0;
        for zone in &model.zones {
            for s in zone.surfaces() {
                if let Adjacency::Zone { zone: other_zone, surface } = &s.adjacency {
                    interior += 1;
                    let other = model.zones.iter().find(|z| &z.name == other_zone).unwrap();
                    let back = other.surface(surface).unwrap();
                    assert_eq!(
                        back.adjacency,
                        Adjacency::Zone {
                            zone: zone.name.clone(),
                            surface: s.name.clone()
                        }
                    );
                    assert!((back.area() - s.area()).abs() < 1e-6);
                }
            }
        }
        assert!(interior > 0);
        Ok(())
    }

    #[test]
    fn test_exterior_wall_area_matches_facade() -> Result<(), ZoneModelError> {
        let settings = GeometrySettings::default();
        let model = build_zones(&plan(1500., 1)?, BuildingType::Office, &settings, &constructions())?;
        let exterior: f64 = model
            .zones
            .iter()
            .flat_map(|z| z.surfaces_of_type(SurfaceType::Wall))
            .filter(|s| s.is_exterior())
            .map(|s| s.area())
            .sum();
        let perimeter = 4. * 1500f64.sqrt();
        assert!((exterior - perimeter * settings.floor_to_floor_height_m).abs() < 1e-3);
        Ok(())
    }

    #[test]
    fn test_floors_roofs_and_ceilings() -> Result<(), ZoneModelError> {
        let model = build_zones(
            &plan(600., 3)?,
            BuildingType::Retail,
            &GeometrySettings::default(),
            &constructions(),
        )?;
        assert_eq!(model.zones.len(), 3);
        let ground = &model.zones[0];
        let floor = ground.surfaces_of_type(SurfaceType::Floor).next().unwrap();
        assert_eq!(floor.adjacency, Adjacency::Ground);
        assert!((floor.polygon.tilt().unwrap() - 180.).abs() < 1.);
        let middle = &model.zones[1];
        let ceiling = middle.surfaces_of_type(SurfaceType::Ceiling).next().unwrap();
        assert_eq!(ceiling.adjacency, Adjacency::Adiabatic);
        assert!(ceiling.polygon.tilt().unwrap() < 1.);
        let roof = model.zones[2].surfaces_of_type(SurfaceType::Roof).next().unwrap();
        assert!(roof.is_exterior());
        assert!(roof.polygon.tilt().unwrap() < 1.);
        Ok(())
    }
}
