//! Internal loads per zone: people, lights, plug equipment and infiltration.

use crate::geom::zone::{UsageType, Zone};
use crate::schedule::{self, ACTIVITY_LEVEL, ALWAYS_ON};
use serde::{Deserialize, Serialize};

/// Design densities of one usage type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadDensities {
    pub people_per_m2: f64,
    pub lighting_w_per_m2: f64,
    pub equipment_w_per_m2: f64,
}

pub fn densities(usage: UsageType) -> LoadDensities {
    let (people_per_m2, lighting_w_per_m2, equipment_w_per_m2) = match usage {
        UsageType::Office => (0.054, 9.7, 10.8),
        UsageType::Retail => (0.161, 15.1, 2.5),
        UsageType::Lobby => (0.1, 9.7, 1.0),
        UsageType::Corridor => (0.0, 5.4, 0.0),
        UsageType::Storage => (0.0, 6.8, 0.0),
        UsageType::Mechanical => (0.0, 4.6, 5.0),
        UsageType::Residential => (0.028, 7.0, 5.4),
        UsageType::Warehouse => (0.0, 7.1, 2.2),
    };
    LoadDensities {
        people_per_m2,
        lighting_w_per_m2,
        equipment_w_per_m2,
    }
}

/// Infiltration per exterior surface area (m^3/s per m^2).
pub const INFILTRATION_PER_EXTERIOR_AREA: f64 = 0.000302;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InternalLoad {
    People {
        name: String,
        zone: String,
        schedule: String,
        activity_schedule: String,
        people_per_m2: f64,
    },
    Lights {
        name: String,
        zone: String,
        schedule: String,
        watts_per_m2: f64,
    },
    Equipment {
        name: String,
        zone: String,
        schedule: String,
        watts_per_m2: f64,
    },
    Infiltration {
        name: String,
        zone: String,
        schedule: String,
        flow_per_exterior_area: f64,
    },
}

impl InternalLoad {
    pub fn name(&self) -> &str {
        match self {
            Self::People { name, .. }
            | Self::Lights { name, .. }
            | Self::Equipment { name, .. }
            | Self::Infiltration { name, .. } => name,
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::People { .. } => "People",
            Self::Lights { .. } => "Lights",
            Self::Equipment { .. } => "ElectricEquipment",
            Self::Infiltration { .. } => "ZoneInfiltration:DesignFlowRate",
        }
    }

    /// Design level per floor area (people, lights, equipment) or per exterior area
    /// (infiltration).
    pub fn density(&self) -> f64 {
        match self {
            Self::People { people_per_m2, .. } => *people_per_m2,
            Self::Lights { watts_per_m2, .. } | Self::Equipment { watts_per_m2, .. } => *watts_per_m2,
            Self::Infiltration {
                flow_per_exterior_area,
                ..
            } => *flow_per_exterior_area,
        }
    }

    pub fn zone(&self) -> &str {
        match self {
            Self::People { zone, .. }
            | Self::Lights { zone, .. }
            | Self::Equipment { zone, .. }
            | Self::Infiltration { zone, .. } => zone,
        }
    }

    /// Schedules this load references.
    pub fn schedules(&self) -> Vec<&str> {
        match self {
            Self::People {
                schedule,
                activity_schedule,
                ..
            } => vec![schedule.as_str(), activity_schedule.as_str()],
            Self::Lights { schedule, .. }
            | Self::Equipment { schedule, .. }
            | Self::Infiltration { schedule, .. } => vec![schedule.as_str()],
        }
    }
}

/// Loads of one zone. Zero densities are skipped; infiltration only applies to
/// zones with exterior walls.
pub fn zone_loads(zone: &Zone) -> Vec<InternalLoad> {
    let d = densities(zone.usage);
    let mut loads = Vec::new();
    if d.people_per_m2 > 0. {
        loads.push(InternalLoad::People {
            name: format!("{}_People", zone.name),
            zone: zone.name.clone(),
            schedule: schedule::occupancy_schedule_name(zone.usage),
            activity_schedule: ACTIVITY_LEVEL.to_string(),
            people_per_m2: d.people_per_m2,
        });
    }
    if d.lighting_w_per_m2 > 0. {
        loads.push(InternalLoad::Lights {
            name: format!("{}_Lights", zone.name),
            zone: zone.name.clone(),
            schedule: schedule::lighting_schedule_name(zone.usage),
            watts_per_m2: d.lighting_w_per_m2,
        });
    }
    if d.equipment_w_per_m2 > 0. {
        loads.push(InternalLoad::Equipment {
            name: format!("{}_Equipment", zone.name),
            zone: zone.name.clone(),
            schedule: schedule::equipment_schedule_name(zone.usage),
            watts_per_m2: d.equipment_w_per_m2,
        });
    }
    if zone.surfaces().iter().any(|s| s.is_exterior()) {
        loads.push(InternalLoad::Infiltration {
            name: format!("{}_Infiltration", zone.name),
            zone: zone.name.clone(),
            schedule: ALWAYS_ON.to_string(),
            flow_per_exterior_area: INFILTRATION_PER_EXTERIOR_AREA,
        });
    }
    loads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Polygon;
    use crate::geom::surface::{Adjacency, Surface, SurfaceType};

    fn zone(usage: UsageType, exterior: bool) -> Zone {
        let fp = Polygon::from_xy(&[(0., 0.), (4., 0.), (4., 5.), (0., 5.)], 0.);
        let mut z = Zone::new("Z", 0, usage, fp, 3., 20.);
        let wall = Polygon::new(vec![
            crate::Point::new(0., 0., 3.),
            crate::Point::new(0., 0., 0.),
            crate::Point::new(4., 0., 0.),
            crate::Point::new(4., 0., 3.),
        ]);
        let adjacency = if exterior { Adjacency::Exterior } else { Adjacency::Adiabatic };
        z.attach_surface_unchecked(Surface::new("Z_Wall1", "Z", SurfaceType::Wall, wall, "c", adjacency));
        z
    }

    #[test]
    fn test_office_zone_loads() {
        let loads = zone_loads(&zone(UsageType::Office, true));
        assert_eq!(loads.len(), 4);
        assert!(loads.iter().all(|l| l.zone() == "Z"));
        assert!(loads[0].schedules().contains(&ACTIVITY_LEVEL));
    }

    #[test]
    fn test_unoccupied_interior_zone() {
        let loads = zone_loads(&zone(UsageType::Corridor, false));
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].name(), "Z_Lights");
    }
}
