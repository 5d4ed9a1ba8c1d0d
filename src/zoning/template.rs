//! Usage templates: how one story footprint is cut into named zone footprints.

use crate::Polygon;
use crate::config::GeometrySettings;
use crate::geom::footprint::{Rect, perimeter_core};
use crate::geom::zone::UsageType;
use crate::hvac::SystemFamily;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    Office,
    Retail,
    Warehouse,
    Residential,
}

impl BuildingType {
    pub const ALL: [BuildingType; 4] = [Self::Office, Self::Retail, Self::Warehouse, Self::Residential];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Retail => "retail",
            Self::Warehouse => "warehouse",
            Self::Residential => "residential",
        }
    }

    pub fn template(&self) -> UsageTemplate {
        match self {
            Self::Office => UsageTemplate::PerimeterCore,
            Self::Retail => UsageTemplate::SingleZone,
            Self::Warehouse => UsageTemplate::StorageWithOffice,
            Self::Residential => UsageTemplate::DoubleLoadedCorridor,
        }
    }

    /// Footprint width / depth when the settings do not override it.
    pub fn default_aspect_ratio(&self) -> f64 {
        match self {
            Self::Office => 1.0,
            Self::Retail => 1.5,
            Self::Warehouse => 2.0,
            Self::Residential => 2.5,
        }
    }

    pub fn aspect_ratio(&self, settings: &GeometrySettings) -> f64 {
        settings
            .aspect_ratios
            .get(self.as_str())
            .copied()
            .unwrap_or_else(|| self.default_aspect_ratio())
    }

    /// Story count assumed when neither the user nor external data gives one.
    pub fn typical_stories(&self) -> u32 {
        match self {
            Self::Office => 3,
            Self::Retail => 1,
            Self::Warehouse => 1,
            Self::Residential => 4,
        }
    }

    /// Floor area per story assumed when nothing else is known (m^2).
    pub fn typical_story_area(&self) -> f64 {
        match self {
            Self::Office => 1660.,
            Self::Retail => 2300.,
            Self::Warehouse => 4800.,
            Self::Residential => 790.,
        }
    }

    pub fn default_system_family(&self) -> SystemFamily {
        match self {
            Self::Office => SystemFamily::Vav,
            Self::Retail | Self::Warehouse => SystemFamily::Rtu,
            Self::Residential => SystemFamily::Ptac,
        }
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "office" => Ok(Self::Office),
            "retail" | "store" => Ok(Self::Retail),
            "warehouse" => Ok(Self::Warehouse),
            "residential" | "apartment" | "multifamily" => Ok(Self::Residential),
            other => Err(format!(
                "unknown building type '{other}', expected one of: office, retail, warehouse, residential"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageTemplate {
    /// Perimeter zones along every facade around core strips.
    PerimeterCore,
    /// One zone per story.
    SingleZone,
    /// Bulk storage with an office strip on the ground floor.
    StorageWithOffice,
    /// Units on both sides of a central corridor.
    DoubleLoadedCorridor,
}

impl fmt::Display for UsageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A zone footprint before it becomes a [`Zone`](crate::Zone).
#[derive(Debug, Clone, PartialEq)]
pub struct ZonePiece {
    /// Name without the story prefix.
    pub label: String,
    pub usage: UsageType,
    pub footprint: Polygon,
}

impl ZonePiece {
    fn new(label: &str, usage: UsageType, footprint: Polygon) -> Self {
        Self {
            label: label.to_string(),
            usage,
            footprint,
        }
    }

    fn from_rect(label: &str, usage: UsageType, rect: &Rect) -> Self {
        Self::new(label, usage, rect.to_polygon(0.))
    }
}

/// Service spaces taken out of the core on the ground and top floors of
/// buildings with at least this many stories.
const SERVICE_FLOOR_MIN_STORIES: u32 = 3;

const GROUND_SERVICE: [(&str, UsageType); 3] = [
    ("Lobby", UsageType::Lobby),
    ("Loading", UsageType::Storage),
    ("MechRoom", UsageType::Mechanical),
];

const TOP_SERVICE: [(&str, UsageType); 3] = [
    ("Penthouse", UsageType::Mechanical),
    ("ElevatorMachineRoom", UsageType::Mechanical),
    ("Storage", UsageType::Storage),
];

impl UsageTemplate {
    /// Cuts one story footprint into zone pieces covering it exactly.
    ///
    /// `story` is zero-based.
    pub fn partition(
        &self,
        rect: &Rect,
        story: u32,
        stories: u32,
        settings: &GeometrySettings,
    ) -> Vec<ZonePiece> {
        match self {
            Self::PerimeterCore => perimeter_core_pieces(rect, story, stories, settings),
            Self::SingleZone => vec![ZonePiece::from_rect("Sales", UsageType::Retail, rect)],
            Self::StorageWithOffice => {
                if story == 0 {
                    let strips = rect.split_x(&[0.9, 0.1]);
                    vec![
                        ZonePiece::from_rect("Bulk", UsageType::Warehouse, &strips[0]),
                        ZonePiece::from_rect("Office", UsageType::Office, &strips[1]),
                    ]
                } else {
                    vec![ZonePiece::from_rect("Bulk", UsageType::Warehouse, rect)]
                }
            }
            Self::DoubleLoadedCorridor => corridor_pieces(rect, settings),
        }
    }
}

fn perimeter_core_pieces(
    rect: &Rect,
    story: u32,
    stories: u32,
    settings: &GeometrySettings,
) -> Vec<ZonePiece> {
    let Some(pc) = perimeter_core(
        rect,
        settings.perimeter_depth_m,
        settings.max_perimeter_zone_length_m,
    ) else {
        return vec![ZonePiece::from_rect("Open", UsageType::Office, rect)];
    };

    let mut pieces: Vec<ZonePiece> = pc
        .perimeter
        .into_iter()
        .map(|seg| {
            let label = format!("Perim_{}{}", seg.orientation.short_name(), seg.index);
            ZonePiece::new(&label, UsageType::Office, seg.polygon)
        })
        .collect();

    let service: &[(&str, UsageType)] = if stories < SERVICE_FLOOR_MIN_STORIES {
        &[]
    } else if story == 0 {
        &GROUND_SERVICE
    } else if story + 1 == stories {
        &TOP_SERVICE
    } else {
        &[]
    };

    let office_strips = ((pc.core.area() / settings.max_core_zone_area_m2).ceil() as usize).max(1);
    let strips = pc.core.split_x_equal(office_strips + service.len());
    for (i, strip) in strips.iter().enumerate() {
        let piece = if i < office_strips {
            ZonePiece::from_rect(&format!("Core{}", i + 1), UsageType::Office, strip)
        } else {
            let (label, usage) = service[i - office_strips];
            ZonePiece::from_rect(label, usage, strip)
        };
        pieces.push(piece);
    }
    pieces
}

fn corridor_pieces(rect: &Rect, settings: &GeometrySettings) -> Vec<ZonePiece> {
    let bands = rect.split_y(&[0.45, 0.1, 0.45]);
    let mut pieces = Vec::new();
    for (band, side) in [(&bands[0], "S"), (&bands[2], "N")] {
        let units = ((band.area() / settings.residential_unit_area_m2).round() as usize).max(1);
        for (i, unit) in band.split_x_equal(units).iter().enumerate() {
            let label = format!("Unit_{side}{}", i + 1);
            pieces.push(ZonePiece::from_rect(&label, UsageType::Residential, unit));
        }
    }
    pieces.push(ZonePiece::from_rect("Corridor", UsageType::Corridor, &bands[1]));
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_area(pieces: &[ZonePiece]) -> f64 {
        pieces.iter().map(|p| p.footprint.area()).sum()
    }

    #[test]
    fn test_office_typical_floor() -> anyhow::Result<()> {
        let settings = GeometrySettings::default();
        let rect = Rect::from_area(1500., 1.0)?;
        let pieces = UsageTemplate::PerimeterCore.partition(&rect, 4, 10, &settings);
        // 5 segments per facade + 5 core strips
        assert_eq!(pieces.len(), 25);
        assert!((total_area(&pieces) - 1500.).abs() < 1e-6);
        assert!(pieces.iter().all(|p| p.usage == UsageType::Office));
        Ok(())
    }

    #[test]
    fn test_office_ground_and_top_floors_have_service_zones() -> anyhow::Result<()> {
        let settings = GeometrySettings::default();
        let rect = Rect::from_area(1500., 1.0)?;
        let ground = UsageTemplate::PerimeterCore.partition(&rect, 0, 10, &settings);
        let top = UsageTemplate::PerimeterCore.partition(&rect, 9, 10, &settings);
        assert_eq!(ground.len(), 28);
        assert_eq!(top.len(), 28);
        assert!(ground.iter().any(|p| p.label == "Lobby"));
        assert!(top.iter().any(|p| p.label == "Penthouse"));
        assert!((total_area(&top) - 1500.).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_small_office_falls_back_to_single_zone() -> anyhow::Result<()> {
        let settings = GeometrySettings::default();
        let rect = Rect::from_area(100., 1.0)?;
        let pieces = UsageTemplate::PerimeterCore.partition(&rect, 0, 1, &settings);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].label, "Open");
        Ok(())
    }

    #[test]
    fn test_residential_corridor() -> anyhow::Result<()> {
        let settings = GeometrySettings::default();
        let rect = Rect::from_area(800., 2.5)?;
        let pieces = UsageTemplate::DoubleLoadedCorridor.partition(&rect, 0, 4, &settings);
        // 360 m2 per band -> 4 or 5 units per side, plus the corridor
        let units = pieces.iter().filter(|p| p.usage == UsageType::Residential).count();
        assert!(units >= 8);
        assert_eq!(pieces.iter().filter(|p| p.usage == UsageType::Corridor).count(), 1);
        assert!((total_area(&pieces) - 800.).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_building_type_from_str() {
        assert_eq!("Office".parse::<BuildingType>(), Ok(BuildingType::Office));
        assert_eq!(" apartment ".parse::<BuildingType>(), Ok(BuildingType::Residential));
        assert!("castle".parse::<BuildingType>().is_err());
    }
}
