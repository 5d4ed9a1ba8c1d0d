//! HVAC topology per system family.
//!
//! Central families (VAV, RTU) get air loops: an outdoor air system, a DX cooling coil,
//! a fuel heating coil and a draw-through fan on the supply branch, a zone splitter and
//! one terminal per zone on the demand side, and a zone mixer on the return path.
//! Zone families (PTAC, ideal loads) get one unit per zone and no air loop.
//!
//! Each air loop moves through [`BuildStage`]s. Node names are allocated first, then the
//! components holding them are placed, then every port is wired into the registry, and
//! finally the loop is checked before it is accepted.

use super::component::{
    CoolingCoil, Fan, FanKind, HeatingCoil, HeatingCoilKind, HvacComponent, IdealLoadsUnit, OutdoorAirController,
    OutdoorAirMixer, OutdoorAirSystem, PackagedTerminal, Port, TerminalKind, TerminalUnit, ZoneEquipmentConnection,
    ZoneMixer, ZoneSplitter,
};
use super::node::{NodeId, NodeRegistry, NodeRole, NodeUse};
use super::setpoint::{SetpointScope, place_setpoint_managers};
use super::sizing::{LoopSizing, ZoneSizing, size_loop, size_zone};
use super::{HvacSystem, SystemFamily};
use crate::config::{GeneratorSettings, HvacSettings};
use crate::error::{TopologyError, ValidationError};
use crate::geom::zone::Zone;
use crate::schedule::ALWAYS_ON;
use crate::validate;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildStage {
    Unbuilt,
    ComponentsPlaced,
    NodesWired,
    Validated,
    Serializable,
}

impl BuildStage {
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Unbuilt => Some(Self::ComponentsPlaced),
            Self::ComponentsPlaced => Some(Self::NodesWired),
            Self::NodesWired => Some(Self::Validated),
            Self::Validated => Some(Self::Serializable),
            Self::Serializable => None,
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// `AirLoopHVAC:SupplyPath`: from the demand inlet through the zone splitter.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyPath {
    pub name: String,
    pub inlet: NodeId,
    pub components: Vec<HvacComponent>,
}

/// `AirLoopHVAC:ReturnPath`: from the zone mixer to the demand outlet.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnPath {
    pub name: String,
    pub outlet: NodeId,
    pub components: Vec<HvacComponent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirLoop {
    pub name: String,
    pub family: SystemFamily,
    stage: BuildStage,
    /// Served zones, in terminal order.
    pub zones: Vec<String>,
    /// m^3/s
    pub design_flow: f64,
    pub supply_inlet: NodeId,
    pub supply_outlet: NodeId,
    pub demand_inlet: NodeId,
    pub demand_outlet: NodeId,
    /// Supply branch components in flow order.
    pub supply_branch: Vec<HvacComponent>,
    pub supply_path: SupplyPath,
    pub terminals: Vec<HvacComponent>,
    pub return_path: ReturnPath,
}

impl AirLoop {
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// Moves to the next stage. Skipping or repeating a stage is an error.
    pub fn advance(&mut self, to: BuildStage) -> Result<(), TopologyError> {
        if self.stage.next() != Some(to) {
            return Err(TopologyError::InvalidTransition {
                air_loop: self.name.clone(),
                from: self.stage.to_string(),
                to: to.to_string(),
            });
        }
        self.stage = to;
        Ok(())
    }

    pub fn branch_list_name(&self) -> String {
        format!("{}_Branches", self.name)
    }

    pub fn branch_name(&self) -> String {
        format!("{}_MainBranch", self.name)
    }

    /// Every component of the loop: supply branch, supply path, terminals, return path.
    pub fn components(&self) -> impl Iterator<Item = &HvacComponent> {
        self.supply_branch
            .iter()
            .chain(self.supply_path.components.iter())
            .chain(self.terminals.iter())
            .chain(self.return_path.components.iter())
    }

    pub fn components_mut(&mut self) -> impl Iterator<Item = &mut HvacComponent> {
        self.supply_branch
            .iter_mut()
            .chain(self.supply_path.components.iter_mut())
            .chain(self.terminals.iter_mut())
            .chain(self.return_path.components.iter_mut())
    }

    pub fn supply_fan(&self) -> Option<&Fan> {
        self.supply_branch.iter().rev().find_map(|c| match c {
            HvacComponent::Fan(f) => Some(f),
            _ => None,
        })
    }

    pub fn outdoor_air_system(&self) -> Option<&OutdoorAirSystem> {
        self.supply_branch.iter().find_map(|c| match c {
            HvacComponent::OutdoorAirSystem(oa) => Some(oa),
            _ => None,
        })
    }

    /// Nodes that need a mixed air setpoint: the mixed air node and every coil outlet
    /// upstream of the fan.
    pub fn mixed_air_targets(&self) -> Vec<(&'static str, NodeId)> {
        let mut targets = Vec::new();
        for c in &self.supply_branch {
            match c {
                HvacComponent::OutdoorAirSystem(oa) => targets.push(("MixedAir", oa.mixer.mixed_air)),
                HvacComponent::CoolingCoil(coil) => targets.push(("CoolingCoil", coil.outlet)),
                HvacComponent::HeatingCoil(coil) => targets.push(("HeatingCoil", coil.outlet)),
                _ => {}
            }
        }
        targets
    }

    /// Zone inlet node fed by the terminal of `zone`.
    pub fn zone_inlet(&self, zone: &str) -> Option<NodeId> {
        self.terminals.iter().find_map(|c| match c {
            HvacComponent::TerminalUnit(t) if t.zone == zone => Some(t.outlet),
            _ => None,
        })
    }

    /// Boundary declarations of the loop and its paths.
    pub fn declarations(&self) -> Vec<Port> {
        let decl = |node, owner: &str, role| Port {
            node,
            usage: NodeUse::new(owner, None, role),
        };
        vec![
            decl(self.supply_inlet, &self.name, NodeRole::LoopSupplyInlet),
            decl(self.supply_outlet, &self.name, NodeRole::LoopSupplyOutlet),
            decl(self.demand_inlet, &self.name, NodeRole::LoopDemandInlet),
            decl(self.demand_outlet, &self.name, NodeRole::LoopDemandOutlet),
            decl(self.supply_path.inlet, &self.supply_path.name, NodeRole::SupplyPathInlet),
            decl(self.return_path.outlet, &self.return_path.name, NodeRole::ReturnPathOutlet),
        ]
    }

    /// Declarations followed by the ports of every component.
    pub fn assertions(&self) -> Vec<Port> {
        let mut ports = self.declarations();
        for c in self.components() {
            ports.extend(c.ports());
        }
        ports
    }

    /// Flow edges of the supply side and of the demand side, with the component that
    /// makes each edge.
    pub fn flow_edges(&self) -> (Vec<(NodeId, NodeId, &str)>, Vec<(NodeId, NodeId, &str)>) {
        let supply = edges_of(self.supply_branch.iter());
        let demand = edges_of(
            self.supply_path
                .components
                .iter()
                .chain(self.terminals.iter())
                .chain(self.return_path.components.iter()),
        );
        (supply, demand)
    }
}

fn edges_of<'a>(components: impl Iterator<Item = &'a HvacComponent>) -> Vec<(NodeId, NodeId, &'a str)> {
    let mut out = Vec::new();
    for c in components {
        for (a, b) in c.flow_edges() {
            out.push((a, b, c.name()));
        }
    }
    out
}

/// Builds the complete HVAC system of a building for one family.
pub fn build_topology(zones: &[Zone], family: SystemFamily, settings: &GeneratorSettings) -> Result<HvacSystem, TopologyError> {
    if zones.is_empty() {
        return Err(TopologyError::NoZones {
            family: family.to_string(),
        });
    }
    if !settings.hvac.enabled_families.contains(&family) {
        return Err(TopologyError::FamilyDisabled {
            family: family.to_string(),
        });
    }

    let mut system = HvacSystem::new(family);
    match family {
        SystemFamily::Vav => {
            let mut stories: BTreeMap<u32, Vec<&Zone>> = BTreeMap::new();
            for z in zones {
                stories.entry(z.story).or_default().push(z);
            }
            for (story, group) in stories {
                build_air_loop(&mut system, &format!("VAV_F{:02}", story + 1), &group, settings)?;
            }
        }
        SystemFamily::Rtu => {
            for z in zones {
                build_air_loop(&mut system, &format!("RTU_{}", z.name), &[z], settings)?;
            }
        }
        SystemFamily::Ptac => {
            for z in zones {
                build_zone_unit(&mut system, z, settings, place_ptac)?;
            }
        }
        SystemFamily::IdealLoads => {
            for z in zones {
                build_zone_unit(&mut system, z, settings, place_ideal_loads)?;
            }
        }
    }

    for (id, node) in system.registry.iter() {
        system
            .registry
            .check_dangling(id)
            .map_err(|source| wiring(&node.allocated_by, source))?;
    }
    debug!(
        family = %family,
        air_loops = system.air_loops.len(),
        zone_units = system.zone_units.len(),
        nodes = system.registry.len(),
        "built HVAC topology"
    );
    Ok(system)
}

fn wiring(air_loop: &str, source: ValidationError) -> TopologyError {
    TopologyError::Wiring {
        air_loop: air_loop.to_string(),
        source,
    }
}

fn build_air_loop(
    system: &mut HvacSystem,
    name: &str,
    zones: &[&Zone],
    settings: &GeneratorSettings,
) -> Result<(), TopologyError> {
    let family = system.family;
    let (mut air_loop, connections) =
        place_loop_components(&mut system.registry, name, family, zones, settings).map_err(|e| wiring(name, e))?;
    air_loop.advance(BuildStage::ComponentsPlaced)?;

    system.wire(air_loop.assertions()).map_err(|e| wiring(name, e))?;
    for conn in &connections {
        system.wire(conn.ports()).map_err(|e| wiring(name, e))?;
    }
    system.zone_equipment.extend(connections);
    if let Some(oa) = air_loop.outdoor_air_system() {
        system.outdoor_air_nodes.push(oa.mixer.outdoor_air);
    }
    air_loop.advance(BuildStage::NodesWired)?;

    validate::check_no_duplicate_node_roles(&air_loop, &system.registry).map_err(|e| wiring(name, e))?;
    validate::check_loop_connectivity(&air_loop, &system.registry, &system.zone_equipment)
        .map_err(|e| wiring(name, e))?;
    air_loop.advance(BuildStage::Validated)?;

    for spm in place_setpoint_managers(SetpointScope::AirLoop(&air_loop), family, &settings.setpoints) {
        system.add_setpoint_manager(spm).map_err(|e| wiring(name, e))?;
    }
    debug!(air_loop = name, zones = zones.len(), "built air loop");
    system.air_loops.push(air_loop);
    Ok(())
}

type ZoneUnitBuilder = fn(
    &mut NodeRegistry,
    &Zone,
    &ZoneSizing,
    &HvacSettings,
) -> Result<(HvacComponent, ZoneEquipmentConnection), ValidationError>;

fn build_zone_unit(
    system: &mut HvacSystem,
    zone: &Zone,
    settings: &GeneratorSettings,
    place: ZoneUnitBuilder,
) -> Result<(), TopologyError> {
    let sizing = size_zone(zone, settings);
    let (unit, conn) =
        place(&mut system.registry, zone, &sizing, &settings.hvac).map_err(|e| wiring(&zone.name, e))?;
    let name = unit.name().to_string();
    system.wire(unit.ports()).map_err(|e| wiring(&name, e))?;
    system.wire(conn.ports()).map_err(|e| wiring(&name, e))?;
    if let HvacComponent::PackagedTerminal(ptac) = &unit {
        system.outdoor_air_nodes.push(ptac.mixer.outdoor_air);
    }
    for spm in place_setpoint_managers(SetpointScope::Zone(&zone.name), system.family, &settings.setpoints) {
        system.add_setpoint_manager(spm).map_err(|e| wiring(&name, e))?;
    }
    system.zone_units.push(unit);
    system.zone_equipment.push(conn);
    Ok(())
}

/// Allocates every node of an air loop and places its components.
fn place_loop_components(
    reg: &mut NodeRegistry,
    name: &str,
    family: SystemFamily,
    zones: &[&Zone],
    settings: &GeneratorSettings,
) -> Result<(AirLoop, Vec<ZoneEquipmentConnection>), ValidationError> {
    let hvac = &settings.hvac;
    let naming = &hvac.node_naming;
    let mut node = |suffix: &str| reg.allocate(&format!("{name}{suffix}"), name);

    let supply_inlet = node(&naming.supply_inlet)?;
    let mixed_air = node(&naming.mixed_air)?;
    let outdoor_air = node(&naming.outdoor_air)?;
    let relief_air = node(&naming.relief_air)?;
    let cooling_outlet = node(&naming.cooling_coil_outlet)?;
    let heating_outlet = node(&naming.heating_coil_outlet)?;
    let supply_outlet = node(&naming.supply_outlet)?;
    let demand_inlet = node(&naming.zone_equipment_inlet)?;
    let demand_outlet = node(&naming.demand_outlet)?;

    let zone_sizing: Vec<ZoneSizing> = zones.iter().map(|z| size_zone(z, settings)).collect();
    let total: LoopSizing = size_loop(&zone_sizing);

    let oa_name = format!("{name}_OASystem");
    let oa_system = OutdoorAirSystem {
        controller: OutdoorAirController {
            name: format!("{name}_OAController"),
            min_outdoor_air: total.outdoor_air,
            max_outdoor_air: total.supply_flow,
            economizer_control_type: hvac.economizer_control_type.clone(),
            control_action: "ModulateFlow".to_string(),
            max_limit_drybulb_c: 28.,
            lockout: "NoLockout".to_string(),
            minimum_limit: "FixedMinimum".to_string(),
        },
        mixer: OutdoorAirMixer {
            name: format!("{name}_OAMixer"),
            mixed_air,
            outdoor_air,
            relief_air,
            return_air: supply_inlet,
            parent: Some(oa_name.clone()),
        },
        name: oa_name,
    };
    let cooling = CoolingCoil {
        name: format!("{name}_CoolingCoil"),
        availability_schedule: ALWAYS_ON.to_string(),
        inlet: mixed_air,
        outlet: cooling_outlet,
        capacity: total.cooling_capacity,
        sensible_heat_ratio: hvac.cooling_sensible_heat_ratio,
        cop: hvac.cooling_cop,
        rated_flow: total.supply_flow,
        system: Some(format!("{name}_CoolingCoilSystem")),
        parent: None,
    };
    let heating = HeatingCoil {
        name: format!("{name}_HeatingCoil"),
        kind: HeatingCoilKind::Fuel {
            fuel_type: hvac.heating_fuel.clone(),
            burner_efficiency: hvac.fuel_burner_efficiency,
        },
        availability_schedule: ALWAYS_ON.to_string(),
        inlet: cooling_outlet,
        outlet: heating_outlet,
        capacity: total.heating_capacity,
        setpoint_node: Some(heating_outlet),
        parent: None,
    };
    let fan_kind = match family {
        SystemFamily::Vav => FanKind::VariableVolume,
        _ => FanKind::ConstantVolume,
    };
    let fan = Fan {
        name: format!("{name}_Fan"),
        kind: fan_kind,
        availability_schedule: ALWAYS_ON.to_string(),
        inlet: heating_outlet,
        outlet: supply_outlet,
        max_flow: total.supply_flow,
        pressure_rise: hvac.fan_pressure_rise_pa,
        total_efficiency: hvac.fan_total_efficiency,
        motor_efficiency: hvac.fan_motor_efficiency,
        min_flow_fraction: zone_sizing.first().map(|z| z.min_flow_fraction).unwrap_or(0.),
        parent: None,
    };

    let mut terminals = Vec::with_capacity(zones.len());
    let mut connections = Vec::with_capacity(zones.len());
    let mut splitter_outlets = Vec::with_capacity(zones.len());
    let mut mixer_inlets = Vec::with_capacity(zones.len());
    for (zone, sizing) in zones.iter().zip(&zone_sizing) {
        let z = zone.name.as_str();
        let zone_air = reg.allocate(&format!("{z}_ZoneAir"), name)?;
        let zone_return = reg.allocate(&format!("{z}_Return"), name)?;
        let terminal_inlet = reg.allocate(&format!("{z}_TerminalInlet"), name)?;
        let zone_inlet = reg.allocate(&format!("{z}_SupplyAirInlet"), name)?;
        let adu = format!("{z}_ADU");
        let (terminal_name, kind) = match family {
            SystemFamily::Vav => {
                let damper_outlet = reg.allocate(&format!("{z}_DamperOutlet"), name)?;
                (
                    format!("{z}_VAVTerminal"),
                    TerminalKind::VavReheat {
                        damper_outlet,
                        min_flow_input_method: "Constant".to_string(),
                        min_flow_fraction: sizing.min_flow_fraction,
                        damper_heating_action: "Normal".to_string(),
                        reheat: HeatingCoil {
                            name: format!("{z}_ReheatCoil"),
                            kind: HeatingCoilKind::Electric,
                            availability_schedule: ALWAYS_ON.to_string(),
                            inlet: damper_outlet,
                            outlet: zone_inlet,
                            capacity: sizing.heating_capacity,
                            setpoint_node: None,
                            parent: Some(adu.clone()),
                        },
                    },
                )
            }
            _ => (format!("{z}_CVTerminal"), TerminalKind::ConstantVolume),
        };
        terminals.push(HvacComponent::TerminalUnit(TerminalUnit {
            name: terminal_name,
            distribution_unit: adu.clone(),
            zone: z.to_string(),
            kind,
            availability_schedule: ALWAYS_ON.to_string(),
            inlet: terminal_inlet,
            outlet: zone_inlet,
            max_flow: sizing.supply_flow,
        }));
        connections.push(ZoneEquipmentConnection {
            zone: z.to_string(),
            equipment: vec![("ZoneHVAC:AirDistributionUnit", adu)],
            zone_air,
            inlet: zone_inlet,
            exhaust: None,
            return_air: Some(zone_return),
        });
        splitter_outlets.push(terminal_inlet);
        mixer_inlets.push(zone_return);
    }

    let air_loop = AirLoop {
        name: name.to_string(),
        family,
        stage: BuildStage::Unbuilt,
        zones: zones.iter().map(|z| z.name.clone()).collect(),
        design_flow: total.supply_flow,
        supply_inlet,
        supply_outlet,
        demand_inlet,
        demand_outlet,
        supply_branch: vec![
            HvacComponent::OutdoorAirSystem(oa_system),
            HvacComponent::CoolingCoil(cooling),
            HvacComponent::HeatingCoil(heating),
            HvacComponent::Fan(fan),
        ],
        supply_path: SupplyPath {
            name: format!("{name}_SupplyPath"),
            inlet: demand_inlet,
            components: vec![HvacComponent::ZoneSplitter(ZoneSplitter {
                name: format!("{name}_ZoneSplitter"),
                inlet: demand_inlet,
                outlets: splitter_outlets,
            })],
        },
        terminals,
        return_path: ReturnPath {
            name: format!("{name}_ReturnPath"),
            outlet: demand_outlet,
            components: vec![HvacComponent::ZoneMixer(ZoneMixer {
                name: format!("{name}_ZoneMixer"),
                inlets: mixer_inlets,
                outlet: demand_outlet,
            })],
        },
    };
    Ok((air_loop, connections))
}

fn place_ptac(
    reg: &mut NodeRegistry,
    zone: &Zone,
    sizing: &ZoneSizing,
    hvac: &HvacSettings,
) -> Result<(HvacComponent, ZoneEquipmentConnection), ValidationError> {
    let z = zone.name.as_str();
    let name = format!("{z}_PTAC");
    let mut node = |suffix: &str| reg.allocate(&format!("{z}_{suffix}"), &name);
    let zone_air = node("ZoneAir")?;
    let inlet = node("PTACInlet")?;
    let mixed_air = node("PTACMixedAir")?;
    let outdoor_air = node("PTACOutdoorAir")?;
    let relief_air = node("PTACRelief")?;
    let cooling_outlet = node("PTACCoolingOutlet")?;
    let heating_outlet = node("PTACHeatingOutlet")?;
    let outlet = node("PTACOutlet")?;

    let parent = Some(name.clone());
    let unit = PackagedTerminal {
        zone: z.to_string(),
        availability_schedule: ALWAYS_ON.to_string(),
        inlet,
        outlet,
        mixer: OutdoorAirMixer {
            name: format!("{name}Mixer"),
            mixed_air,
            outdoor_air,
            relief_air,
            return_air: inlet,
            parent: parent.clone(),
        },
        fan: Fan {
            name: format!("{name}Fan"),
            kind: FanKind::ConstantVolume,
            availability_schedule: ALWAYS_ON.to_string(),
            inlet: heating_outlet,
            outlet,
            max_flow: sizing.supply_flow,
            pressure_rise: hvac.fan_pressure_rise_pa * 0.5,
            total_efficiency: hvac.fan_total_efficiency,
            motor_efficiency: hvac.fan_motor_efficiency,
            min_flow_fraction: 0.,
            parent: parent.clone(),
        },
        cooling: CoolingCoil {
            name: format!("{name}CoolingCoil"),
            availability_schedule: ALWAYS_ON.to_string(),
            inlet: mixed_air,
            outlet: cooling_outlet,
            capacity: sizing.cooling_capacity,
            sensible_heat_ratio: hvac.cooling_sensible_heat_ratio,
            cop: hvac.cooling_cop,
            rated_flow: sizing.supply_flow,
            system: None,
            parent: parent.clone(),
        },
        heating: HeatingCoil {
            name: format!("{name}HeatingCoil"),
            kind: HeatingCoilKind::Electric,
            availability_schedule: ALWAYS_ON.to_string(),
            inlet: cooling_outlet,
            outlet: heating_outlet,
            capacity: sizing.heating_capacity,
            setpoint_node: None,
            parent,
        },
        supply_flow: sizing.supply_flow,
        outdoor_air_flow: sizing.outdoor_air,
        fan_placement: "DrawThrough".to_string(),
        fan_operating_schedule: ALWAYS_ON.to_string(),
        name,
    };
    let conn = ZoneEquipmentConnection {
        zone: z.to_string(),
        equipment: vec![("ZoneHVAC:PackagedTerminalAirConditioner", unit.name.clone())],
        zone_air,
        inlet: outlet,
        exhaust: Some(inlet),
        return_air: None,
    };
    Ok((HvacComponent::PackagedTerminal(unit), conn))
}

fn place_ideal_loads(
    reg: &mut NodeRegistry,
    zone: &Zone,
    _sizing: &ZoneSizing,
    _hvac: &HvacSettings,
) -> Result<(HvacComponent, ZoneEquipmentConnection), ValidationError> {
    let z = zone.name.as_str();
    let name = format!("{z}_IdealLoads");
    let zone_air = reg.allocate(&format!("{z}_ZoneAir"), &name)?;
    let supply = reg.allocate(&format!("{z}_IdealSupply"), &name)?;
    let exhaust = reg.allocate(&format!("{z}_IdealExhaust"), &name)?;
    let unit = IdealLoadsUnit {
        zone: z.to_string(),
        availability_schedule: ALWAYS_ON.to_string(),
        supply,
        exhaust,
        max_heating_supply_temp_c: 50.,
        min_cooling_supply_temp_c: 13.,
        heating_limit: "NoLimit".to_string(),
        cooling_limit: "NoLimit".to_string(),
        dehumidification_control: "ConstantSensibleHeatRatio".to_string(),
        humidification_control: "None".to_string(),
        name,
    };
    let conn = ZoneEquipmentConnection {
        zone: z.to_string(),
        equipment: vec![("ZoneHVAC:IdealLoadsAirSystem", unit.name.clone())],
        zone_air,
        inlet: supply,
        exhaust: Some(exhaust),
        return_air: None,
    };
    Ok((HvacComponent::IdealLoads(unit), conn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Polygon;
    use crate::geom::zone::UsageType;
    use crate::hvac::node::RoleKind;
    use crate::hvac::setpoint::SetpointManager;
    use std::collections::HashSet;

    fn zones(n_stories: u32, per_story: usize) -> Vec<Zone> {
        let mut out = Vec::new();
        for story in 0..n_stories {
            for i in 0..per_story {
                let x = i as f64 * 10.;
                let fp = Polygon::from_xy(&[(x, 0.), (x + 10., 0.), (x + 10., 10.), (x, 10.)], 0.);
                out.push(Zone::new(
                    &format!("F{:02}_Z{}", story + 1, i + 1),
                    story,
                    UsageType::Office,
                    fp,
                    3.,
                    100.,
                ));
            }
        }
        out
    }

    #[test]
    fn test_vav_one_loop_per_story() -> Result<(), TopologyError> {
        let system = build_topology(&zones(3, 4), SystemFamily::Vav, &GeneratorSettings::default())?;
        assert_eq!(system.air_loops.len(), 3);
        let l = &system.air_loops[0];
        assert_eq!(l.name, "VAV_F01");
        assert_eq!(l.stage(), BuildStage::Validated);
        assert_eq!(l.terminals.len(), 4);
        assert_eq!(system.zone_equipment.len(), 12);
        assert_eq!(system.registry.name(l.supply_outlet), "VAV_F01_SupplyOutlet");
        assert_eq!(system.registry.name(l.demand_inlet), "VAV_F01_ZoneEquipmentInlet");
        assert_eq!(l.supply_path.inlet, l.demand_inlet);
        Ok(())
    }

    #[test]
    fn test_supply_outlet_only_feeds_the_loop_boundary() -> Result<(), TopologyError> {
        let settings = GeneratorSettings::default();
        for family in [SystemFamily::Vav, SystemFamily::Rtu] {
            let system = build_topology(&zones(2, 3), family, &settings)?;
            for l in &system.air_loops {
                let node = system.registry.node(l.supply_outlet);
                assert_eq!(node.uses_of(RoleKind::Consumer).count(), 0);
                assert!(node.has_role(NodeRole::LoopSupplyOutlet));
                assert!(!node.has_role(NodeRole::LoopDemandInlet));
            }
        }
        Ok(())
    }

    #[test]
    fn test_node_names_are_unique() -> Result<(), TopologyError> {
        let settings = GeneratorSettings::default();
        for family in SystemFamily::ALL {
            let system = build_topology(&zones(2, 2), family, &settings)?;
            let names: HashSet<&str> = system.registry.iter().map(|(_, n)| n.name.as_str()).collect();
            assert_eq!(names.len(), system.registry.len());
        }
        Ok(())
    }

    #[test]
    fn test_zone_families_have_no_air_loops() -> Result<(), TopologyError> {
        let settings = GeneratorSettings::default();
        let ptac = build_topology(&zones(1, 3), SystemFamily::Ptac, &settings)?;
        assert!(ptac.air_loops.is_empty());
        assert_eq!(ptac.zone_units.len(), 3);
        assert_eq!(ptac.outdoor_air_nodes.len(), 3);
        let ideal = build_topology(&zones(1, 3), SystemFamily::IdealLoads, &settings)?;
        assert_eq!(ideal.zone_units.len(), 3);
        assert!(ideal.outdoor_air_nodes.is_empty());
        assert!(
            ideal
                .setpoint_managers
                .iter()
                .all(|s| matches!(s, SetpointManager::ZoneThermostat { .. }))
        );
        Ok(())
    }

    #[test]
    fn test_mixed_air_managers_sense_each_node_once() -> Result<(), TopologyError> {
        let system = build_topology(&zones(1, 2), SystemFamily::Vav, &GeneratorSettings::default())?;
        let l = &system.air_loops[0];
        let mixed: Vec<_> = system
            .setpoint_managers
            .iter()
            .filter(|s| matches!(s, SetpointManager::MixedAir { .. }))
            .collect();
        assert!(!mixed.is_empty());
        for spm in mixed {
            let sensed = spm.sensed();
            assert_eq!(sensed.iter().filter(|&&n| n == l.supply_outlet).count(), 1);
            let unique: HashSet<_> = sensed.iter().collect();
            assert_eq!(unique.len(), sensed.len());
        }
        Ok(())
    }

    #[test]
    fn test_loop_setpoint_managers() -> Result<(), TopologyError> {
        let system = build_topology(&zones(1, 2), SystemFamily::Rtu, &GeneratorSettings::default())?;
        let l = &system.air_loops[0];
        let on_outlet: Vec<_> = system
            .setpoint_managers
            .iter()
            .filter(|s| s.target() == Some(l.supply_outlet))
            .collect();
        assert_eq!(on_outlet.len(), 1);
        assert!(matches!(on_outlet[0], SetpointManager::OutdoorAirReset { .. }));
        // reset + 3 mixed air managers + 1 thermostat per loop
        assert_eq!(system.setpoint_managers.len(), 2 * 5);
        Ok(())
    }

    #[test]
    fn test_no_zones() {
        let err = build_topology(&[], SystemFamily::Vav, &GeneratorSettings::default()).unwrap_err();
        assert!(matches!(err, TopologyError::NoZones { .. }));
    }

    #[test]
    fn test_disabled_family() {
        let mut settings = GeneratorSettings::default();
        settings.hvac.enabled_families = vec![SystemFamily::IdealLoads];
        let err = build_topology(&zones(1, 1), SystemFamily::Vav, &settings).unwrap_err();
        assert!(matches!(err, TopologyError::FamilyDisabled { .. }));
    }

    #[test]
    fn test_colliding_node_naming_fails_at_construction() {
        let mut settings = GeneratorSettings::default();
        settings.hvac.node_naming.zone_equipment_inlet = settings.hvac.node_naming.supply_outlet.clone();
        let err = build_topology(&zones(1, 2), SystemFamily::Vav, &settings).unwrap_err();
        match err {
            TopologyError::Wiring { air_loop, source } => {
                assert_eq!(air_loop, "VAV_F01");
                assert!(matches!(source, ValidationError::NodeNameCollision { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_stage_transitions() -> Result<(), TopologyError> {
        let system = build_topology(&zones(1, 1), SystemFamily::Vav, &GeneratorSettings::default())?;
        let mut l = system.air_loops[0].clone();
        assert!(l.advance(BuildStage::NodesWired).is_err());
        l.advance(BuildStage::Serializable)?;
        assert!(l.advance(BuildStage::Serializable).is_err());
        Ok(())
    }
}
