//! Complete in-memory model of one building, before validation.

use crate::envelope::ConstructionSet;
use crate::geom::building::Building;
use crate::hvac::HvacSystem;
use crate::hvac::component::{HeatingCoil, HeatingCoilKind, HvacComponent};
use crate::idf::schema::SchemaVersion;
use crate::loads::InternalLoad;
use crate::schedule::{Schedule, ScheduleTypeLimits};

/// Everything the formatter needs to write one input file.
///
/// The model is the source of truth: corrections are applied here and the file is
/// re-serialized from scratch, never patched as text.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingModel {
    pub building: Building,
    pub hvac: HvacSystem,
    pub constructions: ConstructionSet,
    pub type_limits: Vec<ScheduleTypeLimits>,
    pub schedules: Vec<Schedule>,
    pub loads: Vec<InternalLoad>,
    pub schema: SchemaVersion,
}

impl BuildingModel {
    pub fn schedule(&self, name: &str) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.name == name)
    }

    pub fn type_limits(&self, name: &str) -> Option<&ScheduleTypeLimits> {
        self.type_limits.iter().find(|l| l.name == name)
    }

    /// Fuels burned by any component, sorted and without repeats. Each gets its own
    /// facility meter.
    pub fn fuels(&self) -> Vec<&str> {
        let mut fuels: Vec<&str> = self
            .hvac
            .components()
            .filter_map(|c| match c {
                HvacComponent::HeatingCoil(HeatingCoil {
                    kind: HeatingCoilKind::Fuel { fuel_type, .. },
                    ..
                }) => Some(fuel_type.as_str()),
                _ => None,
            })
            .collect();
        fuels.sort_unstable();
        fuels.dedup();
        fuels
    }

    pub fn uses_fuel(&self) -> bool {
        !self.fuels().is_empty()
    }
}
