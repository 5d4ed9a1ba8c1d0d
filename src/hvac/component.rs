//! HVAC components as tagged variants.
//!
//! Every variant carries its own typed fields and the nodes it connects to. Components
//! report their ports (the roles they assert on nodes), their closed-enumeration fields
//! and their numeric fields, so the registry, the validator and the formatter all read
//! the same data.

use super::node::{NodeId, NodeRole, NodeUse};
use crate::idf::schema::LiteralSet;

/// Names of the DX performance curves shared by every single-speed DX coil.
pub mod curves {
    pub const CAPACITY_FT: &str = "DX_CapacityFT";
    pub const CAPACITY_FF: &str = "DX_CapacityFF";
    pub const EIR_FT: &str = "DX_EIRFT";
    pub const EIR_FF: &str = "DX_EIRFF";
    pub const PART_LOAD: &str = "DX_PLF";

    /// In the order the coil object lists them.
    pub const ALL: [&str; 5] = [CAPACITY_FT, CAPACITY_FF, EIR_FT, EIR_FF, PART_LOAD];
}

/// One role asserted by a component on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub node: NodeId,
    pub usage: NodeUse,
}

fn port(node: NodeId, owner: &str, parent: Option<&str>, role: NodeRole) -> Port {
    Port {
        node,
        usage: NodeUse::new(owner, parent, role),
    }
}

/// Closed-enumeration field of a component.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumField<'a> {
    pub object: &'a str,
    pub field: &'static str,
    pub value: &'a str,
    pub literals: LiteralSet,
}

/// Numeric field with its inclusive valid range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericField {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericField {
    fn positive(field: &'static str, value: f64) -> Self {
        Self {
            field,
            value,
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
        }
    }

    fn fraction(field: &'static str, value: f64) -> Self {
        Self {
            field,
            value,
            min: 0.,
            max: 1.,
        }
    }

    fn non_negative(field: &'static str, value: f64) -> Self {
        Self {
            field,
            value,
            min: 0.,
            max: f64::MAX,
        }
    }

    pub fn in_range(&self) -> bool {
        self.value.is_finite() && self.value >= self.min && self.value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanKind {
    ConstantVolume,
    VariableVolume,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fan {
    pub name: String,
    pub kind: FanKind,
    pub availability_schedule: String,
    pub inlet: NodeId,
    pub outlet: NodeId,
    /// m^3/s
    pub max_flow: f64,
    /// Pa
    pub pressure_rise: f64,
    pub total_efficiency: f64,
    pub motor_efficiency: f64,
    /// Only used by variable volume fans.
    pub min_flow_fraction: f64,
    pub parent: Option<String>,
}

impl Fan {
    pub fn class(&self) -> &'static str {
        match self.kind {
            FanKind::ConstantVolume => "Fan:ConstantVolume",
            FanKind::VariableVolume => "Fan:VariableVolume",
        }
    }
}

/// Single-speed DX cooling coil.
#[derive(Debug, Clone, PartialEq)]
pub struct CoolingCoil {
    pub name: String,
    pub availability_schedule: String,
    pub inlet: NodeId,
    pub outlet: NodeId,
    /// Gross rated total capacity (W).
    pub capacity: f64,
    pub sensible_heat_ratio: f64,
    pub cop: f64,
    /// Rated air flow (m^3/s).
    pub rated_flow: f64,
    /// `CoilSystem:Cooling:DX` wrapper used when the coil sits on an air loop branch.
    pub system: Option<String>,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeatingCoilKind {
    Electric,
    Fuel { fuel_type: String, burner_efficiency: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatingCoil {
    pub name: String,
    pub kind: HeatingCoilKind,
    pub availability_schedule: String,
    pub inlet: NodeId,
    pub outlet: NodeId,
    /// Nominal capacity (W).
    pub capacity: f64,
    /// Node whose setpoint controls the coil, for coils on an air loop branch.
    pub setpoint_node: Option<NodeId>,
    pub parent: Option<String>,
}

impl HeatingCoil {
    pub fn class(&self) -> &'static str {
        match self.kind {
            HeatingCoilKind::Electric => "Coil:Heating:Electric",
            HeatingCoilKind::Fuel { .. } => "Coil:Heating:Fuel",
        }
    }

    pub fn efficiency(&self) -> f64 {
        match self.kind {
            HeatingCoilKind::Electric => 1.,
            HeatingCoilKind::Fuel {
                burner_efficiency, ..
            } => burner_efficiency,
        }
    }

    fn ports(&self) -> Vec<Port> {
        let parent = self.parent.as_deref();
        let mut ports = vec![
            port(self.inlet, &self.name, parent, NodeRole::ComponentInlet),
            port(self.outlet, &self.name, parent, NodeRole::ComponentOutlet),
        ];
        if let Some(node) = self.setpoint_node {
            ports.push(port(node, &self.name, parent, NodeRole::Sensor));
        }
        ports
    }

    fn enum_fields_mut(&mut self) -> Vec<(&'static str, &mut String, LiteralSet)> {
        match &mut self.kind {
            HeatingCoilKind::Electric => vec![],
            HeatingCoilKind::Fuel { fuel_type, .. } => vec![("Fuel Type", fuel_type, LiteralSet::FuelType)],
        }
    }

    fn numeric_fields(&self) -> Vec<NumericField> {
        vec![
            NumericField::positive("Nominal Capacity", self.capacity),
            NumericField {
                field: "Efficiency",
                value: self.efficiency(),
                min: f64::MIN_POSITIVE,
                max: 1.,
            },
        ]
    }
}

/// `OutdoorAir:Mixer`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutdoorAirMixer {
    pub name: String,
    pub mixed_air: NodeId,
    pub outdoor_air: NodeId,
    pub relief_air: NodeId,
    pub return_air: NodeId,
    pub parent: Option<String>,
}

impl OutdoorAirMixer {
    fn ports(&self) -> Vec<Port> {
        let parent = self.parent.as_deref();
        vec![
            port(self.return_air, &self.name, parent, NodeRole::ComponentInlet),
            port(self.outdoor_air, &self.name, parent, NodeRole::ComponentInlet),
            port(self.outdoor_air, &self.name, parent, NodeRole::OutdoorAir),
            port(self.mixed_air, &self.name, parent, NodeRole::ComponentOutlet),
            port(self.relief_air, &self.name, parent, NodeRole::ComponentOutlet),
            port(self.relief_air, &self.name, parent, NodeRole::Relief),
        ]
    }
}

/// `Controller:OutdoorAir`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutdoorAirController {
    pub name: String,
    /// m^3/s
    pub min_outdoor_air: f64,
    /// m^3/s
    pub max_outdoor_air: f64,
    pub economizer_control_type: String,
    pub control_action: String,
    pub max_limit_drybulb_c: f64,
    pub lockout: String,
    pub minimum_limit: String,
}

/// `AirLoopHVAC:OutdoorAirSystem` with its controller and mixer.
#[derive(Debug, Clone, PartialEq)]
pub struct OutdoorAirSystem {
    pub name: String,
    pub controller: OutdoorAirController,
    pub mixer: OutdoorAirMixer,
}

impl OutdoorAirSystem {
    pub fn controller_list_name(&self) -> String {
        format!("{}_Controllers", self.name)
    }

    pub fn equipment_list_name(&self) -> String {
        format!("{}_Equipment", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TerminalKind {
    /// `AirTerminal:SingleDuct:VAV:Reheat` with an electric reheat coil.
    VavReheat {
        damper_outlet: NodeId,
        min_flow_input_method: String,
        min_flow_fraction: f64,
        damper_heating_action: String,
        reheat: HeatingCoil,
    },
    /// `AirTerminal:SingleDuct:ConstantVolume:NoReheat`.
    ConstantVolume,
}

/// Air terminal wrapped in its `ZoneHVAC:AirDistributionUnit`.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalUnit {
    pub name: String,
    pub distribution_unit: String,
    pub zone: String,
    pub kind: TerminalKind,
    pub availability_schedule: String,
    pub inlet: NodeId,
    /// Zone inlet node.
    pub outlet: NodeId,
    /// m^3/s
    pub max_flow: f64,
}

impl TerminalUnit {
    pub fn class(&self) -> &'static str {
        match self.kind {
            TerminalKind::VavReheat { .. } => "AirTerminal:SingleDuct:VAV:Reheat",
            TerminalKind::ConstantVolume => "AirTerminal:SingleDuct:ConstantVolume:NoReheat",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSplitter {
    pub name: String,
    pub inlet: NodeId,
    pub outlets: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneMixer {
    pub name: String,
    pub inlets: Vec<NodeId>,
    pub outlet: NodeId,
}

/// `ZoneHVAC:PackagedTerminalAirConditioner` with draw-through fan.
#[derive(Debug, Clone, PartialEq)]
pub struct PackagedTerminal {
    pub name: String,
    pub zone: String,
    pub availability_schedule: String,
    /// Zone exhaust node.
    pub inlet: NodeId,
    /// Zone inlet node.
    pub outlet: NodeId,
    pub mixer: OutdoorAirMixer,
    pub fan: Fan,
    pub cooling: CoolingCoil,
    pub heating: HeatingCoil,
    /// m^3/s
    pub supply_flow: f64,
    /// m^3/s
    pub outdoor_air_flow: f64,
    pub fan_placement: String,
    pub fan_operating_schedule: String,
}

/// `ZoneHVAC:IdealLoadsAirSystem`.
#[derive(Debug, Clone, PartialEq)]
pub struct IdealLoadsUnit {
    pub name: String,
    pub zone: String,
    pub availability_schedule: String,
    pub supply: NodeId,
    pub exhaust: NodeId,
    pub max_heating_supply_temp_c: f64,
    pub min_cooling_supply_temp_c: f64,
    pub heating_limit: String,
    pub cooling_limit: String,
    pub dehumidification_control: String,
    pub humidification_control: String,
}

/// `ZoneHVAC:EquipmentConnections` and the equipment list of one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneEquipmentConnection {
    pub zone: String,
    /// (class, name) in cooling and heating priority order.
    pub equipment: Vec<(&'static str, String)>,
    pub zone_air: NodeId,
    pub inlet: NodeId,
    pub exhaust: Option<NodeId>,
    pub return_air: Option<NodeId>,
}

impl ZoneEquipmentConnection {
    pub fn equipment_list_name(&self) -> String {
        format!("{}_Equipment", self.zone)
    }

    pub fn ports(&self) -> Vec<Port> {
        let owner = self.zone.as_str();
        let mut ports = vec![
            port(self.zone_air, owner, None, NodeRole::ZoneAir),
            port(self.inlet, owner, None, NodeRole::ZoneInlet),
        ];
        if let Some(node) = self.exhaust {
            ports.push(port(node, owner, None, NodeRole::ZoneExhaust));
        }
        if let Some(node) = self.return_air {
            ports.push(port(node, owner, None, NodeRole::ZoneReturn));
        }
        ports
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HvacComponent {
    OutdoorAirSystem(OutdoorAirSystem),
    Fan(Fan),
    CoolingCoil(CoolingCoil),
    HeatingCoil(HeatingCoil),
    TerminalUnit(TerminalUnit),
    ZoneSplitter(ZoneSplitter),
    ZoneMixer(ZoneMixer),
    PackagedTerminal(PackagedTerminal),
    IdealLoads(IdealLoadsUnit),
}

impl HvacComponent {
    pub fn name(&self) -> &str {
        match self {
            Self::OutdoorAirSystem(c) => &c.name,
            Self::Fan(c) => &c.name,
            Self::CoolingCoil(c) => &c.name,
            Self::HeatingCoil(c) => &c.name,
            Self::TerminalUnit(c) => &c.name,
            Self::ZoneSplitter(c) => &c.name,
            Self::ZoneMixer(c) => &c.name,
            Self::PackagedTerminal(c) => &c.name,
            Self::IdealLoads(c) => &c.name,
        }
    }

    /// Object class and name as listed on a branch or in an equipment list.
    pub fn listed_as(&self) -> (&'static str, &str) {
        match self {
            Self::OutdoorAirSystem(c) => ("AirLoopHVAC:OutdoorAirSystem", &c.name),
            Self::Fan(c) => (c.class(), &c.name),
            Self::CoolingCoil(c) => match &c.system {
                Some(system) => ("CoilSystem:Cooling:DX", system),
                None => ("Coil:Cooling:DX:SingleSpeed", &c.name),
            },
            Self::HeatingCoil(c) => (c.class(), &c.name),
            Self::TerminalUnit(c) => ("ZoneHVAC:AirDistributionUnit", &c.distribution_unit),
            Self::ZoneSplitter(c) => ("AirLoopHVAC:ZoneSplitter", &c.name),
            Self::ZoneMixer(c) => ("AirLoopHVAC:ZoneMixer", &c.name),
            Self::PackagedTerminal(c) => ("ZoneHVAC:PackagedTerminalAirConditioner", &c.name),
            Self::IdealLoads(c) => ("ZoneHVAC:IdealLoadsAirSystem", &c.name),
        }
    }

    /// Every (class, name) pair this component emits, children included.
    pub fn object_names(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::OutdoorAirSystem(c) => vec![
                ("AirLoopHVAC:OutdoorAirSystem", c.name.clone()),
                ("AirLoopHVAC:ControllerList", c.controller_list_name()),
                ("AirLoopHVAC:OutdoorAirSystem:EquipmentList", c.equipment_list_name()),
                ("Controller:OutdoorAir", c.controller.name.clone()),
                ("OutdoorAir:Mixer", c.mixer.name.clone()),
            ],
            Self::Fan(c) => vec![(c.class(), c.name.clone())],
            Self::CoolingCoil(c) => cooling_coil_names(c),
            Self::HeatingCoil(c) => vec![(c.class(), c.name.clone())],
            Self::TerminalUnit(c) => {
                let mut names = vec![
                    ("ZoneHVAC:AirDistributionUnit", c.distribution_unit.clone()),
                    (c.class(), c.name.clone()),
                ];
                if let TerminalKind::VavReheat { reheat, .. } = &c.kind {
                    names.push((reheat.class(), reheat.name.clone()));
                }
                names
            }
            Self::ZoneSplitter(c) => vec![("AirLoopHVAC:ZoneSplitter", c.name.clone())],
            Self::ZoneMixer(c) => vec![("AirLoopHVAC:ZoneMixer", c.name.clone())],
            Self::PackagedTerminal(c) => {
                let mut names = vec![
                    ("ZoneHVAC:PackagedTerminalAirConditioner", c.name.clone()),
                    ("OutdoorAir:Mixer", c.mixer.name.clone()),
                    (c.fan.class(), c.fan.name.clone()),
                    (c.heating.class(), c.heating.name.clone()),
                ];
                names.extend(cooling_coil_names(&c.cooling));
                names
            }
            Self::IdealLoads(c) => vec![("ZoneHVAC:IdealLoadsAirSystem", c.name.clone())],
        }
    }

    /// (object, schedule) for every schedule the component references.
    pub fn schedule_refs(&self) -> Vec<(&str, &str)> {
        match self {
            Self::OutdoorAirSystem(_) | Self::ZoneSplitter(_) | Self::ZoneMixer(_) => vec![],
            Self::Fan(c) => vec![(&c.name, &c.availability_schedule)],
            Self::CoolingCoil(c) => vec![(&c.name, &c.availability_schedule)],
            Self::HeatingCoil(c) => vec![(&c.name, &c.availability_schedule)],
            Self::TerminalUnit(c) => {
                let mut refs = vec![(c.name.as_str(), c.availability_schedule.as_str())];
                if let TerminalKind::VavReheat { reheat, .. } = &c.kind {
                    refs.push((&reheat.name, &reheat.availability_schedule));
                }
                refs
            }
            Self::PackagedTerminal(c) => vec![
                (&c.name, &c.availability_schedule),
                (&c.name, &c.fan_operating_schedule),
                (&c.fan.name, &c.fan.availability_schedule),
                (&c.cooling.name, &c.cooling.availability_schedule),
                (&c.heating.name, &c.heating.availability_schedule),
            ],
            Self::IdealLoads(c) => vec![(&c.name, &c.availability_schedule)],
        }
    }

    /// DX cooling coils of the component.
    pub fn dx_coils(&self) -> Vec<&CoolingCoil> {
        match self {
            Self::CoolingCoil(c) => vec![c],
            Self::PackagedTerminal(c) => vec![&c.cooling],
            _ => vec![],
        }
    }

    /// Air inlet and outlet as seen from outside the component.
    pub fn inlet_outlet(&self) -> (NodeId, NodeId) {
        match self {
            Self::OutdoorAirSystem(c) => (c.mixer.return_air, c.mixer.mixed_air),
            Self::Fan(c) => (c.inlet, c.outlet),
            Self::CoolingCoil(c) => (c.inlet, c.outlet),
            Self::HeatingCoil(c) => (c.inlet, c.outlet),
            Self::TerminalUnit(c) => (c.inlet, c.outlet),
            Self::ZoneSplitter(c) => (c.inlet, c.outlets.first().copied().unwrap_or(c.inlet)),
            Self::ZoneMixer(c) => (c.inlets.first().copied().unwrap_or(c.outlet), c.outlet),
            Self::PackagedTerminal(c) => (c.inlet, c.outlet),
            Self::IdealLoads(c) => (c.exhaust, c.supply),
        }
    }

    /// Directed air flow edges between the nodes this component connects.
    pub fn flow_edges(&self) -> Vec<(NodeId, NodeId)> {
        match self {
            Self::OutdoorAirSystem(c) => vec![
                (c.mixer.return_air, c.mixer.mixed_air),
                (c.mixer.outdoor_air, c.mixer.mixed_air),
                (c.mixer.return_air, c.mixer.relief_air),
            ],
            Self::ZoneSplitter(c) => c.outlets.iter().map(|&o| (c.inlet, o)).collect(),
            Self::ZoneMixer(c) => c.inlets.iter().map(|&i| (i, c.outlet)).collect(),
            other => vec![other.inlet_outlet()],
        }
    }

    /// Every role this component and its children assert.
    pub fn ports(&self) -> Vec<Port> {
        match self {
            Self::OutdoorAirSystem(c) => {
                let mut ports = vec![
                    port(c.mixer.return_air, &c.name, None, NodeRole::ComponentInlet),
                    port(c.mixer.mixed_air, &c.name, None, NodeRole::ComponentOutlet),
                ];
                ports.extend(c.mixer.ports());
                let ctrl = &c.controller.name;
                for node in [c.mixer.relief_air, c.mixer.return_air, c.mixer.mixed_air, c.mixer.outdoor_air] {
                    ports.push(port(node, ctrl, Some(&c.name), NodeRole::Sensor));
                }
                ports
            }
            Self::Fan(c) => fan_ports(c),
            Self::CoolingCoil(c) => cooling_coil_ports(c),
            Self::HeatingCoil(c) => c.ports(),
            Self::TerminalUnit(c) => {
                let adu = c.distribution_unit.as_str();
                let mut ports = vec![
                    port(c.outlet, adu, None, NodeRole::ComponentOutlet),
                    port(c.inlet, &c.name, Some(adu), NodeRole::ComponentInlet),
                ];
                match &c.kind {
                    TerminalKind::VavReheat {
                        damper_outlet, reheat, ..
                    } => {
                        ports.push(port(*damper_outlet, &c.name, Some(adu), NodeRole::ComponentOutlet));
                        ports.push(port(c.outlet, &c.name, Some(adu), NodeRole::ComponentOutlet));
                        ports.extend(reheat.ports());
                    }
                    TerminalKind::ConstantVolume => {
                        ports.push(port(c.outlet, &c.name, Some(adu), NodeRole::ComponentOutlet));
                    }
                }
                ports
            }
            Self::ZoneSplitter(c) => {
                let mut ports = vec![port(c.inlet, &c.name, None, NodeRole::ComponentInlet)];
                ports.extend(
                    c.outlets
                        .iter()
                        .map(|&o| port(o, &c.name, None, NodeRole::ComponentOutlet)),
                );
                ports
            }
            Self::ZoneMixer(c) => {
                let mut ports: Vec<Port> = c
                    .inlets
                    .iter()
                    .map(|&i| port(i, &c.name, None, NodeRole::ComponentInlet))
                    .collect();
                ports.push(port(c.outlet, &c.name, None, NodeRole::ComponentOutlet));
                ports
            }
            Self::PackagedTerminal(c) => {
                let mut ports = vec![
                    port(c.inlet, &c.name, None, NodeRole::ComponentInlet),
                    port(c.outlet, &c.name, None, NodeRole::ComponentOutlet),
                ];
                ports.extend(c.mixer.ports());
                ports.extend(cooling_coil_ports(&c.cooling));
                ports.extend(c.heating.ports());
                ports.extend(fan_ports(&c.fan));
                ports
            }
            Self::IdealLoads(c) => vec![
                port(c.exhaust, &c.name, None, NodeRole::ComponentInlet),
                port(c.supply, &c.name, None, NodeRole::ComponentOutlet),
            ],
        }
    }

    /// Closed-enumeration fields, for validation.
    pub fn enum_fields(&self) -> Vec<EnumField<'_>> {
        let mut fields = Vec::new();
        match self {
            Self::OutdoorAirSystem(c) => {
                let ctrl = &c.controller;
                for (field, value, literals) in [
                    ("Economizer Control Type", &ctrl.economizer_control_type, LiteralSet::EconomizerControlType),
                    ("Economizer Control Action Type", &ctrl.control_action, LiteralSet::EconomizerControlAction),
                    ("Lockout Type", &ctrl.lockout, LiteralSet::LockoutType),
                    ("Minimum Limit Type", &ctrl.minimum_limit, LiteralSet::MinimumLimitType),
                ] {
                    fields.push(EnumField {
                        object: &ctrl.name,
                        field,
                        value,
                        literals,
                    });
                }
            }
            Self::HeatingCoil(c) => fields.extend(heating_enum_fields(c)),
            Self::TerminalUnit(c) => {
                if let TerminalKind::VavReheat {
                    min_flow_input_method,
                    damper_heating_action,
                    reheat,
                    ..
                } = &c.kind
                {
                    fields.push(EnumField {
                        object: &c.name,
                        field: "Zone Minimum Air Flow Input Method",
                        value: min_flow_input_method,
                        literals: LiteralSet::MinimumFlowInputMethod,
                    });
                    fields.push(EnumField {
                        object: &c.name,
                        field: "Damper Heating Action",
                        value: damper_heating_action,
                        literals: LiteralSet::DamperHeatingAction,
                    });
                    fields.extend(heating_enum_fields(reheat));
                }
            }
            Self::PackagedTerminal(c) => {
                fields.push(EnumField {
                    object: &c.name,
                    field: "Fan Placement",
                    value: &c.fan_placement,
                    literals: LiteralSet::FanPlacement,
                });
                fields.extend(heating_enum_fields(&c.heating));
            }
            Self::IdealLoads(c) => {
                for (field, value, literals) in [
                    ("Heating Limit", &c.heating_limit, LiteralSet::IdealLoadsLimit),
                    ("Cooling Limit", &c.cooling_limit, LiteralSet::IdealLoadsLimit),
                    ("Dehumidification Control Type", &c.dehumidification_control, LiteralSet::Dehumidification),
                    ("Humidification Control Type", &c.humidification_control, LiteralSet::Humidification),
                ] {
                    fields.push(EnumField {
                        object: &c.name,
                        field,
                        value,
                        literals,
                    });
                }
            }
            Self::Fan(_) | Self::CoolingCoil(_) | Self::ZoneSplitter(_) | Self::ZoneMixer(_) => {}
        }
        fields
    }

    /// Mutable access to the closed-enumeration fields, for auto-correction.
    pub fn enum_fields_mut(&mut self) -> Vec<(&'static str, &mut String, LiteralSet)> {
        match self {
            Self::OutdoorAirSystem(c) => {
                let ctrl = &mut c.controller;
                vec![
                    ("Economizer Control Type", &mut ctrl.economizer_control_type, LiteralSet::EconomizerControlType),
                    ("Economizer Control Action Type", &mut ctrl.control_action, LiteralSet::EconomizerControlAction),
                    ("Lockout Type", &mut ctrl.lockout, LiteralSet::LockoutType),
                    ("Minimum Limit Type", &mut ctrl.minimum_limit, LiteralSet::MinimumLimitType),
                ]
            }
            Self::HeatingCoil(c) => c.enum_fields_mut(),
            Self::TerminalUnit(c) => match &mut c.kind {
                TerminalKind::VavReheat {
                    min_flow_input_method,
                    damper_heating_action,
                    reheat,
                    ..
                } => {
                    let mut fields = vec![
                        ("Zone Minimum Air Flow Input Method", min_flow_input_method, LiteralSet::MinimumFlowInputMethod),
                        ("Damper Heating Action", damper_heating_action, LiteralSet::DamperHeatingAction),
                    ];
                    fields.extend(reheat.enum_fields_mut());
                    fields
                }
                TerminalKind::ConstantVolume => vec![],
            },
            Self::PackagedTerminal(c) => {
                let mut fields = vec![("Fan Placement", &mut c.fan_placement, LiteralSet::FanPlacement)];
                fields.extend(c.heating.enum_fields_mut());
                fields
            }
            Self::IdealLoads(c) => vec![
                ("Heating Limit", &mut c.heating_limit, LiteralSet::IdealLoadsLimit),
                ("Cooling Limit", &mut c.cooling_limit, LiteralSet::IdealLoadsLimit),
                ("Dehumidification Control Type", &mut c.dehumidification_control, LiteralSet::Dehumidification),
                ("Humidification Control Type", &mut c.humidification_control, LiteralSet::Humidification),
            ],
            Self::Fan(_) | Self::CoolingCoil(_) | Self::ZoneSplitter(_) | Self::ZoneMixer(_) => vec![],
        }
    }

    /// Numeric fields with their valid ranges, grouped by the object that owns them.
    pub fn numeric_fields(&self) -> Vec<(&str, NumericField)> {
        match self {
            Self::OutdoorAirSystem(c) => {
                let ctrl = &c.controller;
                vec![
                    (ctrl.name.as_str(), NumericField::non_negative("Minimum Outdoor Air Flow Rate", ctrl.min_outdoor_air)),
                    (
                        ctrl.name.as_str(),
                        NumericField {
                            field: "Maximum Outdoor Air Flow Rate",
                            value: ctrl.max_outdoor_air,
                            min: ctrl.min_outdoor_air,
                            max: f64::MAX,
                        },
                    ),
                ]
            }
            Self::Fan(c) => fan_numeric_fields(c),
            Self::CoolingCoil(c) => cooling_numeric_fields(c),
            Self::HeatingCoil(c) => c.numeric_fields().into_iter().map(|f| (c.name.as_str(), f)).collect(),
            Self::TerminalUnit(c) => {
                let mut fields = vec![(c.name.as_str(), NumericField::positive("Maximum Air Flow Rate", c.max_flow))];
                if let TerminalKind::VavReheat {
                    min_flow_fraction,
                    reheat,
                    ..
                } = &c.kind
                {
                    fields.push((
                        c.name.as_str(),
                        NumericField::fraction("Constant Minimum Air Flow Fraction", *min_flow_fraction),
                    ));
                    fields.extend(reheat.numeric_fields().into_iter().map(|f| (reheat.name.as_str(), f)));
                }
                fields
            }
            Self::ZoneSplitter(_) | Self::ZoneMixer(_) => vec![],
            Self::PackagedTerminal(c) => {
                let mut fields = vec![
                    (c.name.as_str(), NumericField::positive("Supply Air Flow Rate", c.supply_flow)),
                    (
                        c.name.as_str(),
                        NumericField {
                            field: "Outdoor Air Flow Rate",
                            value: c.outdoor_air_flow,
                            min: 0.,
                            max: c.supply_flow,
                        },
                    ),
                ];
                fields.extend(fan_numeric_fields(&c.fan));
                fields.extend(cooling_numeric_fields(&c.cooling));
                fields.extend(c.heating.numeric_fields().into_iter().map(|f| (c.heating.name.as_str(), f)));
                fields
            }
            Self::IdealLoads(c) => vec![(
                c.name.as_str(),
                NumericField {
                    field: "Maximum Heating Supply Air Temperature",
                    value: c.max_heating_supply_temp_c,
                    min: c.min_cooling_supply_temp_c,
                    max: 100.,
                },
            )],
        }
    }
}

fn fan_ports(c: &Fan) -> Vec<Port> {
    let parent = c.parent.as_deref();
    vec![
        port(c.inlet, &c.name, parent, NodeRole::ComponentInlet),
        port(c.outlet, &c.name, parent, NodeRole::ComponentOutlet),
    ]
}

fn cooling_coil_ports(c: &CoolingCoil) -> Vec<Port> {
    let coil_parent = c.system.as_deref().or(c.parent.as_deref());
    let mut ports = vec![
        port(c.inlet, &c.name, coil_parent, NodeRole::ComponentInlet),
        port(c.outlet, &c.name, coil_parent, NodeRole::ComponentOutlet),
    ];
    if let Some(system) = &c.system {
        let parent = c.parent.as_deref();
        ports.push(port(c.inlet, system, parent, NodeRole::ComponentInlet));
        ports.push(port(c.outlet, system, parent, NodeRole::ComponentOutlet));
        ports.push(port(c.outlet, system, parent, NodeRole::Sensor));
    }
    ports
}

fn cooling_coil_names(c: &CoolingCoil) -> Vec<(&'static str, String)> {
    let mut names = vec![("Coil:Cooling:DX:SingleSpeed", c.name.clone())];
    if let Some(system) = &c.system {
        names.push(("CoilSystem:Cooling:DX", system.clone()));
    }
    names
}

fn heating_enum_fields(c: &HeatingCoil) -> Vec<EnumField<'_>> {
    match &c.kind {
        HeatingCoilKind::Electric => vec![],
        HeatingCoilKind::Fuel { fuel_type, .. } => vec![EnumField {
            object: &c.name,
            field: "Fuel Type",
            value: fuel_type,
            literals: LiteralSet::FuelType,
        }],
    }
}

fn fan_numeric_fields(c: &Fan) -> Vec<(&str, NumericField)> {
    let name = c.name.as_str();
    let mut fields = vec![
        (name, NumericField::positive("Maximum Flow Rate", c.max_flow)),
        (name, NumericField::positive("Pressure Rise", c.pressure_rise)),
        (
            name,
            NumericField {
                field: "Fan Total Efficiency",
                value: c.total_efficiency,
                min: f64::MIN_POSITIVE,
                max: 1.,
            },
        ),
        (
            name,
            NumericField {
                field: "Motor Efficiency",
                value: c.motor_efficiency,
                min: f64::MIN_POSITIVE,
                max: 1.,
            },
        ),
    ];
    if c.kind == FanKind::VariableVolume {
        fields.push((name, NumericField::fraction("Fan Power Minimum Flow Fraction", c.min_flow_fraction)));
    }
    fields
}

fn cooling_numeric_fields(c: &CoolingCoil) -> Vec<(&str, NumericField)> {
    let name = c.name.as_str();
    vec![
        (name, NumericField::positive("Gross Rated Total Cooling Capacity", c.capacity)),
        (
            name,
            NumericField {
                field: "Gross Rated Sensible Heat Ratio",
                value: c.sensible_heat_ratio,
                min: 0.5,
                max: 1.,
            },
        ),
        (name, NumericField::positive("Gross Rated Cooling COP", c.cop)),
        (name, NumericField::positive("Rated Air Flow Rate", c.rated_flow)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hvac::node::{NodeRegistry, conflict};
    use crate::error::ValidationError;

    fn nodes(reg: &mut NodeRegistry, names: &[&str]) -> Result<Vec<NodeId>, ValidationError> {
        names.iter().map(|n| reg.allocate(n, "test")).collect()
    }

    #[test]
    fn test_fuel_coil_fields() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let n = nodes(&mut reg, &["A", "B"])?;
        let mut coil = HvacComponent::HeatingCoil(HeatingCoil {
            name: "HC".to_string(),
            kind: HeatingCoilKind::Fuel {
                fuel_type: "NaturalGas".to_string(),
                burner_efficiency: 0.8,
            },
            availability_schedule: "AlwaysOn".to_string(),
            inlet: n[0],
            outlet: n[1],
            capacity: 5000.,
            setpoint_node: Some(n[1]),
            parent: None,
        });
        assert_eq!(coil.listed_as(), ("Coil:Heating:Fuel", "HC"));
        assert_eq!(coil.ports().len(), 3);
        let fields = coil.enum_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "NaturalGas");
        assert!(coil.numeric_fields().iter().all(|(_, f)| f.in_range()));

        for (_, value, _) in coil.enum_fields_mut() {
            *value = "Propane".to_string();
        }
        assert_eq!(coil.enum_fields()[0].value, "Propane");
        Ok(())
    }

    #[test]
    fn test_vav_terminal_ports_are_compatible() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let n = nodes(&mut reg, &["In", "Damper", "Out"])?;
        let terminal = HvacComponent::TerminalUnit(TerminalUnit {
            name: "Z_VAV".to_string(),
            distribution_unit: "Z_ADU".to_string(),
            zone: "Z".to_string(),
            kind: TerminalKind::VavReheat {
                damper_outlet: n[1],
                min_flow_input_method: "Constant".to_string(),
                min_flow_fraction: 0.3,
                damper_heating_action: "Reverse".to_string(),
                reheat: HeatingCoil {
                    name: "Z_Reheat".to_string(),
                    kind: HeatingCoilKind::Electric,
                    availability_schedule: "AlwaysOn".to_string(),
                    inlet: n[1],
                    outlet: n[2],
                    capacity: 2000.,
                    setpoint_node: None,
                    parent: Some("Z_ADU".to_string()),
                },
            },
            availability_schedule: "AlwaysOn".to_string(),
            inlet: n[0],
            outlet: n[2],
            max_flow: 0.5,
        });
        let ports = terminal.ports();
        for (i, a) in ports.iter().enumerate() {
            for b in &ports[i + 1..] {
                if a.node == b.node {
                    assert_eq!(conflict(&a.usage, &b.usage), None, "{} / {}", a.usage, b.usage);
                }
            }
        }
        assert_eq!(terminal.flow_edges(), vec![(n[0], n[2])]);
        assert_eq!(terminal.enum_fields().len(), 2);
        Ok(())
    }

    #[test]
    fn test_out_of_range_efficiency() -> Result<(), ValidationError> {
        let mut reg = NodeRegistry::new();
        let n = nodes(&mut reg, &["A", "B"])?;
        let fan = HvacComponent::Fan(Fan {
            name: "F".to_string(),
            kind: FanKind::ConstantVolume,
            availability_schedule: "AlwaysOn".to_string(),
            inlet: n[0],
            outlet: n[1],
            max_flow: 1.,
            pressure_rise: 600.,
            total_efficiency: 1.2,
            motor_efficiency: 0.9,
            min_flow_fraction: 0.,
            parent: None,
        });
        let bad: Vec<_> = fan.numeric_fields().into_iter().filter(|(_, f)| !f.in_range()).collect();
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].1.field, "Fan Total Efficiency");
        Ok(())
    }
}
