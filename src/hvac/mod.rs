//! HVAC Topology Synthesizer.
//!
//! Builds, for one system family, the node graph and components serving every zone,
//! plus the setpoint managers the family requires.

pub mod component;
pub mod node;
pub mod setpoint;
pub mod sizing;
pub mod topology;

pub use component::{HvacComponent, ZoneEquipmentConnection};
pub use node::{NodeId, NodeRegistry, NodeRole, NodeUse};
pub use setpoint::{SetpointManager, SetpointScope, place_setpoint_managers};
pub use sizing::compute_airflow_sizing;
pub use topology::{AirLoop, BuildStage, build_topology};

use crate::error::ValidationError;
use component::Port;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemFamily {
    /// Central variable air volume with reheat terminals, one loop per story.
    Vav,
    /// Packaged rooftop unit, one constant volume loop per zone.
    Rtu,
    /// Packaged terminal air conditioner in every zone.
    Ptac,
    /// Idealized zone supply, for load studies.
    IdealLoads,
}

impl SystemFamily {
    pub const ALL: [SystemFamily; 4] = [Self::Vav, Self::Rtu, Self::Ptac, Self::IdealLoads];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vav => "vav",
            Self::Rtu => "rtu",
            Self::Ptac => "ptac",
            Self::IdealLoads => "ideal_loads",
        }
    }

    pub fn has_air_loops(&self) -> bool {
        matches!(self, Self::Vav | Self::Rtu)
    }
}

impl fmt::Display for SystemFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vav" => Ok(Self::Vav),
            "rtu" | "rooftop" => Ok(Self::Rtu),
            "ptac" => Ok(Self::Ptac),
            "ideal" | "ideal_loads" | "ideal-loads" => Ok(Self::IdealLoads),
            other => Err(format!(
                "unknown system family '{other}', expected one of vav, rtu, ptac, ideal_loads"
            )),
        }
    }
}

/// HVAC network of one building.
#[derive(Debug, Clone, PartialEq)]
pub struct HvacSystem {
    pub family: SystemFamily,
    pub registry: NodeRegistry,
    pub air_loops: Vec<AirLoop>,
    /// Zone equipment outside any air loop (PTAC, ideal loads).
    pub zone_units: Vec<HvacComponent>,
    pub zone_equipment: Vec<ZoneEquipmentConnection>,
    pub setpoint_managers: Vec<SetpointManager>,
    /// Nodes listed in `OutdoorAir:NodeList`.
    pub outdoor_air_nodes: Vec<NodeId>,
}

impl HvacSystem {
    pub fn new(family: SystemFamily) -> Self {
        Self {
            family,
            registry: NodeRegistry::new(),
            air_loops: Vec::new(),
            zone_units: Vec::new(),
            zone_equipment: Vec::new(),
            setpoint_managers: Vec::new(),
            outdoor_air_nodes: Vec::new(),
        }
    }

    /// Asserts every port in the registry.
    pub fn wire(&mut self, ports: Vec<Port>) -> Result<(), ValidationError> {
        for p in ports {
            self.registry.connect(p.node, p.usage)?;
        }
        Ok(())
    }

    /// Adds a setpoint manager. A node (or a zone thermostat) accepts a single writer
    /// per control variable; a second one is rejected here instead of emitting two
    /// managers that fight over the same node.
    pub fn add_setpoint_manager(&mut self, spm: SetpointManager) -> Result<(), ValidationError> {
        let conflicting: Vec<String> = self
            .setpoint_managers
            .iter()
            .filter(|other| match (spm.target(), other.target()) {
                (Some(a), Some(b)) => a == b && spm.control_variable() == other.control_variable(),
                (None, None) => spm.thermostat_zone() == other.thermostat_zone(),
                _ => false,
            })
            .map(|other| other.name().to_string())
            .collect();
        if !conflicting.is_empty() {
            let target = match spm.target() {
                Some(node) => self.registry.name(node).to_string(),
                None => spm.thermostat_zone().unwrap_or_default().to_string(),
            };
            let mut managers = conflicting;
            managers.push(spm.name().to_string());
            return Err(ValidationError::ConflictingSetpoints {
                target,
                variable: spm.control_variable().to_string(),
                managers,
            });
        }
        if let Some(node) = spm.target() {
            self.registry
                .connect(node, NodeUse::new(spm.name(), None, NodeRole::SetpointTarget))?;
        }
        for node in spm.sensed() {
            self.registry.connect(node, NodeUse::new(spm.name(), None, NodeRole::Sensor))?;
        }
        self.setpoint_managers.push(spm);
        Ok(())
    }

    /// Components of all air loops followed by the zone units.
    pub fn components(&self) -> impl Iterator<Item = &HvacComponent> {
        self.air_loops
            .iter()
            .flat_map(|l| l.components())
            .chain(self.zone_units.iter())
    }

    pub fn components_mut(&mut self) -> impl Iterator<Item = &mut HvacComponent> {
        self.air_loops
            .iter_mut()
            .flat_map(|l| l.components_mut())
            .chain(self.zone_units.iter_mut())
    }

    pub fn node_name(&self, id: NodeId) -> &str {
        self.registry.name(id)
    }

    /// True if any DX coil is present, in which case the shared performance curves are
    /// needed.
    pub fn has_dx_coils(&self) -> bool {
        self.components().any(|c| {
            matches!(
                c,
                HvacComponent::CoolingCoil(_) | HvacComponent::PackagedTerminal(_)
            )
        })
    }

    pub fn thermostats(&self) -> impl Iterator<Item = &SetpointManager> {
        self.setpoint_managers
            .iter()
            .filter(|s| matches!(s, SetpointManager::ZoneThermostat { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{COOLING_SETPOINT, HEATING_SETPOINT};

    #[test]
    fn test_family_parsing() {
        assert_eq!("VAV".parse::<SystemFamily>(), Ok(SystemFamily::Vav));
        assert_eq!("rooftop".parse::<SystemFamily>(), Ok(SystemFamily::Rtu));
        assert_eq!("ideal-loads".parse::<SystemFamily>(), Ok(SystemFamily::IdealLoads));
        assert!("chiller".parse::<SystemFamily>().is_err());
        assert_eq!(SystemFamily::IdealLoads.to_string(), "ideal_loads");
    }

    #[test]
    fn test_conflicting_fixed_and_reset_managers() -> Result<(), ValidationError> {
        let mut system = HvacSystem::new(SystemFamily::Vav);
        let node = system.registry.allocate("Loop_SupplyOutlet", "Loop")?;
        system.add_setpoint_manager(SetpointManager::OutdoorAirReset {
            name: "Loop_SupplyReset".to_string(),
            control_variable: "Temperature".to_string(),
            setpoint_at_outdoor_low_c: 16.7,
            outdoor_low_c: 0.,
            setpoint_at_outdoor_high_c: 12.8,
            outdoor_high_c: 21.1,
            node,
        })?;
        let err = system
            .add_setpoint_manager(SetpointManager::Scheduled {
                name: "Loop_Fixed24".to_string(),
                control_variable: "Temperature".to_string(),
                schedule: COOLING_SETPOINT.to_string(),
                node,
            })
            .unwrap_err();
        match err {
            ValidationError::ConflictingSetpoints { target, managers, .. } => {
                assert_eq!(target, "Loop_SupplyOutlet");
                assert_eq!(managers, vec!["Loop_SupplyReset", "Loop_Fixed24"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(system.setpoint_managers.len(), 1);
        Ok(())
    }

    #[test]
    fn test_second_thermostat_rejected() -> Result<(), ValidationError> {
        let mut system = HvacSystem::new(SystemFamily::Ptac);
        system.add_setpoint_manager(setpoint::thermostat("Z1", SystemFamily::Ptac))?;
        system.add_setpoint_manager(setpoint::thermostat("Z2", SystemFamily::Ptac))?;
        let dup = SetpointManager::ZoneThermostat {
            name: "Z1_Other".to_string(),
            zone: "Z1".to_string(),
            control_type_schedule: "DualSetpointControlType".to_string(),
            heating_schedule: HEATING_SETPOINT.to_string(),
            cooling_schedule: COOLING_SETPOINT.to_string(),
        };
        assert!(system.add_setpoint_manager(dup).is_err());
        assert_eq!(system.thermostats().count(), 2);
        Ok(())
    }
}
