//! Setpoint managers and zone thermostats.

use super::SystemFamily;
use super::node::NodeId;
use super::topology::AirLoop;
use crate::config::SetpointSettings;
use crate::schedule::{COOLING_SETBACK, COOLING_SETPOINT, HEATING_SETBACK, HEATING_SETPOINT, THERMOSTAT_CONTROL_TYPE};

pub const TEMPERATURE: &str = "Temperature";

#[derive(Debug, Clone, PartialEq)]
pub enum SetpointManager {
    /// Supply temperature varies linearly with outdoor dry-bulb between two break points.
    OutdoorAirReset {
        name: String,
        control_variable: String,
        setpoint_at_outdoor_low_c: f64,
        outdoor_low_c: f64,
        setpoint_at_outdoor_high_c: f64,
        outdoor_high_c: f64,
        node: NodeId,
    },
    /// Copies the reference setpoint, corrected for fan heat.
    MixedAir {
        name: String,
        control_variable: String,
        reference: NodeId,
        fan_inlet: NodeId,
        fan_outlet: NodeId,
        node: NodeId,
    },
    Scheduled {
        name: String,
        control_variable: String,
        schedule: String,
        node: NodeId,
    },
    /// Dual setpoint thermostat of one zone.
    ZoneThermostat {
        name: String,
        zone: String,
        control_type_schedule: String,
        heating_schedule: String,
        cooling_schedule: String,
    },
}

impl SetpointManager {
    pub fn name(&self) -> &str {
        match self {
            Self::OutdoorAirReset { name, .. }
            | Self::MixedAir { name, .. }
            | Self::Scheduled { name, .. }
            | Self::ZoneThermostat { name, .. } => name,
        }
    }

    /// Node written by the manager. Thermostats write to zones, not nodes.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Self::OutdoorAirReset { node, .. } | Self::MixedAir { node, .. } | Self::Scheduled { node, .. } => {
                Some(*node)
            }
            Self::ZoneThermostat { .. } => None,
        }
    }

    pub fn control_variable(&self) -> &str {
        match self {
            Self::OutdoorAirReset {
                control_variable, ..
            }
            | Self::MixedAir {
                control_variable, ..
            }
            | Self::Scheduled {
                control_variable, ..
            } => control_variable,
            Self::ZoneThermostat { .. } => TEMPERATURE,
        }
    }

    pub fn control_variable_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::OutdoorAirReset {
                control_variable, ..
            }
            | Self::MixedAir {
                control_variable, ..
            }
            | Self::Scheduled {
                control_variable, ..
            } => Some(control_variable),
            Self::ZoneThermostat { .. } => None,
        }
    }

    /// Nodes read by the manager, each listed once. The reference node is usually the
    /// fan outlet.
    pub fn sensed(&self) -> Vec<NodeId> {
        let mut nodes = match self {
            Self::MixedAir {
                reference,
                fan_inlet,
                fan_outlet,
                ..
            } => vec![*reference, *fan_inlet, *fan_outlet],
            _ => vec![],
        };
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    pub fn schedules(&self) -> Vec<&str> {
        match self {
            Self::Scheduled { schedule, .. } => vec![schedule.as_str()],
            Self::ZoneThermostat {
                control_type_schedule,
                heating_schedule,
                cooling_schedule,
                ..
            } => vec![
                control_type_schedule.as_str(),
                heating_schedule.as_str(),
                cooling_schedule.as_str(),
            ],
            _ => vec![],
        }
    }

    pub fn thermostat_zone(&self) -> Option<&str> {
        match self {
            Self::ZoneThermostat { zone, .. } => Some(zone),
            _ => None,
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::OutdoorAirReset { .. } => "SetpointManager:OutdoorAirReset",
            Self::MixedAir { .. } => "SetpointManager:MixedAir",
            Self::Scheduled { .. } => "SetpointManager:Scheduled",
            Self::ZoneThermostat { .. } => "ZoneControl:Thermostat",
        }
    }

    /// Name of the `ThermostatSetpoint:DualSetpoint` object a thermostat points to.
    pub fn dual_setpoint_name(&self) -> Option<String> {
        self.thermostat_zone().map(|zone| format!("{zone}_DualSetpoint"))
    }
}

/// What a set of setpoint managers is placed for.
#[derive(Debug, Clone, Copy)]
pub enum SetpointScope<'a> {
    AirLoop(&'a AirLoop),
    Zone(&'a str),
}

pub fn thermostat(zone: &str, family: SystemFamily) -> SetpointManager {
    let (heating, cooling) = match family {
        SystemFamily::Vav | SystemFamily::Rtu => (HEATING_SETBACK, COOLING_SETBACK),
        SystemFamily::Ptac | SystemFamily::IdealLoads => (HEATING_SETPOINT, COOLING_SETPOINT),
    };
    SetpointManager::ZoneThermostat {
        name: format!("{zone}_Thermostat"),
        zone: zone.to_string(),
        control_type_schedule: THERMOSTAT_CONTROL_TYPE.to_string(),
        heating_schedule: heating.to_string(),
        cooling_schedule: cooling.to_string(),
    }
}

/// Managers required by a system family.
///
/// Central loops get an outdoor air reset on the supply outlet and mixed air managers
/// on the mixed air node and coil outlets, plus setback thermostats for their zones.
/// Zone equipment only gets a thermostat with fixed setpoints. Each node receives at
/// most one manager.
pub fn place_setpoint_managers(
    scope: SetpointScope<'_>,
    family: SystemFamily,
    settings: &SetpointSettings,
) -> Vec<SetpointManager> {
    match scope {
        SetpointScope::Zone(zone) => vec![thermostat(zone, family)],
        SetpointScope::AirLoop(air_loop) => {
            let reset = settings.outdoor_air_reset;
            let mut managers = vec![SetpointManager::OutdoorAirReset {
                name: format!("{}_SupplyReset", air_loop.name),
                control_variable: TEMPERATURE.to_string(),
                setpoint_at_outdoor_low_c: reset.setpoint_at_outdoor_low_c,
                outdoor_low_c: reset.outdoor_low_c,
                setpoint_at_outdoor_high_c: reset.setpoint_at_outdoor_high_c,
                outdoor_high_c: reset.outdoor_high_c,
                node: air_loop.supply_outlet,
            }];
            if let Some(fan) = air_loop.supply_fan() {
                for (suffix, node) in air_loop.mixed_air_targets() {
                    managers.push(SetpointManager::MixedAir {
                        name: format!("{}_{suffix}SPM", air_loop.name),
                        control_variable: TEMPERATURE.to_string(),
                        reference: air_loop.supply_outlet,
                        fan_inlet: fan.inlet,
                        fan_outlet: fan.outlet,
                        node,
                    });
                }
            }
            managers.extend(air_loop.zones.iter().map(|z| thermostat(z, family)));
            managers
        }
    }
}
