//! One formatter per object kind.
//!
//! Each function turns a typed model value into [`IdfObject`]s with fields in the
//! order the engine schema mandates. Nothing here decides what goes into the model.

use super::IdfObject;
use crate::envelope::{Construction, Material};
use crate::geom::surface::{Adjacency, Surface};
use crate::geom::zone::Zone;
use crate::hvac::component::{
    CoolingCoil, Fan, FanKind, HeatingCoil, HeatingCoilKind, IdealLoadsUnit, OutdoorAirMixer,
    OutdoorAirSystem, PackagedTerminal, TerminalKind, TerminalUnit, ZoneMixer, ZoneSplitter, curves,
};
use crate::hvac::{AirLoop, HvacComponent, HvacSystem, NodeId, SetpointManager, ZoneEquipmentConnection};
use crate::loads::InternalLoad;
use crate::model::BuildingModel;
use crate::results::{COOLING_TRANSFER, ELECTRICITY_FACILITY, HEATING_TRANSFER, ReportingFrequency};
use crate::schedule::{Schedule, ScheduleProfile, ScheduleTypeLimits, compact_day};

/// Frequency of the facility meters requested in every file.
pub const METER_FREQUENCY: ReportingFrequency = ReportingFrequency::Monthly;

/// Every object of the model in file order.
pub fn model_objects(model: &BuildingModel) -> Vec<IdfObject> {
    let hvac = &model.hvac;
    let mut out = scaffolding(model);

    out.extend(model.constructions.materials.iter().map(material));
    out.extend(model.constructions.constructions.iter().map(construction));
    out.extend(model.type_limits.iter().map(type_limits));
    out.extend(model.schedules.iter().map(schedule));

    for z in model.building.zones() {
        out.push(zone(z));
        out.extend(z.surfaces_by_name().into_iter().map(surface));
    }
    out.extend(model.loads.iter().map(internal_load));
    for t in hvac.thermostats() {
        out.extend(thermostat(t));
    }

    for conn in &hvac.zone_equipment {
        out.extend(equipment_connection(conn, hvac));
    }
    for unit in &hvac.zone_units {
        out.extend(component_objects(unit, hvac));
    }
    for air_loop in &hvac.air_loops {
        out.extend(air_loop_objects(air_loop, hvac));
    }

    out.extend(
        hvac.setpoint_managers
            .iter()
            .filter(|s| s.target().is_some())
            .map(|s| node_setpoint_manager(s, hvac)),
    );
    if !hvac.outdoor_air_nodes.is_empty() {
        let mut list = IdfObject::new("OutdoorAir:NodeList");
        for (i, &node) in hvac.outdoor_air_nodes.iter().enumerate() {
            list.push(hvac.node_name(node), format!("Node or NodeList Name {}", i + 1));
        }
        out.push(list);
    }
    if hvac.has_dx_coils() {
        out.extend(performance_curves());
    }
    out.extend(output_meters(model));
    out
}

fn scaffolding(model: &BuildingModel) -> Vec<IdfObject> {
    let loc = &model.building.location;
    vec![
        IdfObject::new("Version").text(model.schema.as_str(), "Version Identifier"),
        IdfObject::new("SimulationControl")
            .text("No", "Do Zone Sizing Calculation")
            .text("No", "Do System Sizing Calculation")
            .text("No", "Do Plant Sizing Calculation")
            .text("No", "Run Simulation for Sizing Periods")
            .text("Yes", "Run Simulation for Weather File Run Periods")
            .text("No", "Do HVAC Sizing Simulation for Sizing Periods")
            .num(1., "Maximum Number of HVAC Sizing Simulation Passes"),
        IdfObject::new("Building")
            .text(&model.building.name, "Name")
            .num(0., "North Axis {deg}")
            .text("City", "Terrain")
            .num(0.04, "Loads Convergence Tolerance Value {W}")
            .num(0.4, "Temperature Convergence Tolerance Value {deltaC}")
            .text("FullExterior", "Solar Distribution")
            .num(25., "Maximum Number of Warmup Days")
            .num(6., "Minimum Number of Warmup Days"),
        IdfObject::new("GlobalGeometryRules")
            .text("UpperLeftCorner", "Starting Vertex Position")
            .text("Counterclockwise", "Vertex Entry Direction")
            .text("World", "Coordinate System"),
        IdfObject::new("Timestep").num(4., "Number of Timesteps per Hour"),
        IdfObject::new("Site:Location")
            .text(&loc.name, "Name")
            .num(loc.latitude, "Latitude {deg}")
            .num(loc.longitude, "Longitude {deg}")
            .num(loc.timezone_offset, "Time Zone {hr}")
            .num(loc.elevation_m, "Elevation {m}"),
        IdfObject::new("RunPeriod")
            .text("Annual", "Name")
            .num(1., "Begin Month")
            .num(1., "Begin Day of Month")
            .blank("Begin Year")
            .num(12., "End Month")
            .num(31., "End Day of Month")
            .blank("End Year")
            .blank("Day of Week for Start Day")
            .text("Yes", "Use Weather File Holidays and Special Days")
            .text("Yes", "Use Weather File Daylight Saving Period")
            .text("No", "Apply Weekend Holiday Rule")
            .text("Yes", "Use Weather File Rain Indicators")
            .text("Yes", "Use Weather File Snow Indicators")
            .text("No", "Treat Weather as Actual"),
    ]
}

fn material(m: &Material) -> IdfObject {
    IdfObject::new("Material")
        .text(&m.name, "Name")
        .text(&m.roughness, "Roughness")
        .num(m.thickness, "Thickness {m}")
        .num(m.conductivity, "Conductivity {W/m-K}")
        .num(m.density, "Density {kg/m3}")
        .num(m.specific_heat, "Specific Heat {J/kg-K}")
        .num(m.thermal_absorptance, "Thermal Absorptance")
        .num(m.solar_absorptance, "Solar Absorptance")
        .num(m.visible_absorptance, "Visible Absorptance")
}

fn construction(c: &Construction) -> IdfObject {
    let mut o = IdfObject::new("Construction").text(&c.name, "Name");
    for (i, layer) in c.layers.iter().enumerate() {
        let comment = if i == 0 {
            "Outside Layer".to_string()
        } else {
            format!("Layer {}", i + 1)
        };
        o.push(layer, comment);
    }
    o
}

fn type_limits(l: &ScheduleTypeLimits) -> IdfObject {
    let bound = |v: Option<f64>| v.map(super::fmt_num).unwrap_or_default();
    IdfObject::new("ScheduleTypeLimits")
        .text(&l.name, "Name")
        .text(bound(l.lower), "Lower Limit Value")
        .text(bound(l.upper), "Upper Limit Value")
        .text(&l.numeric_type, "Numeric Type")
        .text(&l.unit_type, "Unit Type")
}

fn schedule(s: &Schedule) -> IdfObject {
    match &s.profile {
        ScheduleProfile::Constant(v) => IdfObject::new("Schedule:Constant")
            .text(&s.name, "Name")
            .text(&s.type_limits, "Schedule Type Limits Name")
            .num(*v, "Hourly Value"),
        ScheduleProfile::Weekly { weekdays, weekends } => {
            let mut o = IdfObject::new("Schedule:Compact")
                .text(&s.name, "Name")
                .text(&s.type_limits, "Schedule Type Limits Name");
            let mut n = 0;
            let mut field = |o: &mut IdfObject, value: String| {
                n += 1;
                o.push(value, format!("Field {n}"));
            };
            field(&mut o, "Through: 12/31".to_string());
            for (days, hours) in [
                ("For: Weekdays SummerDesignDay WinterDesignDay", weekdays),
                ("For: AllOtherDays", weekends),
            ] {
                field(&mut o, days.to_string());
                for (until, value) in compact_day(hours) {
                    field(&mut o, format!("Until: {until:02}:00"));
                    field(&mut o, super::fmt_num(value));
                }
            }
            o
        }
    }
}

fn zone(z: &Zone) -> IdfObject {
    IdfObject::new("Zone")
        .text(&z.name, "Name")
        .num(0., "Direction of Relative North {deg}")
        .num(0., "X Origin {m}")
        .num(0., "Y Origin {m}")
        .num(0., "Z Origin {m}")
        .num(1., "Type")
        .num(1., "Multiplier")
        .num(z.floor_to_floor_height, "Ceiling Height {m}")
        .num(z.volume(), "Volume {m3}")
        .num(z.area(), "Floor Area {m2}")
}

fn surface(s: &Surface) -> IdfObject {
    let (boundary, object, sun, wind) = match &s.adjacency {
        Adjacency::Exterior => ("Outdoors", String::new(), "SunExposed", "WindExposed"),
        Adjacency::Ground => ("Ground", String::new(), "NoSun", "NoWind"),
        Adjacency::Adiabatic => ("Adiabatic", String::new(), "NoSun", "NoWind"),
        Adjacency::Zone { surface, .. } => ("Surface", surface.clone(), "NoSun", "NoWind"),
    };
    let vertices = s.polygon.vertices();
    let mut o = IdfObject::new("BuildingSurface:Detailed")
        .text(&s.name, "Name")
        .text(s.surface_type.to_string(), "Surface Type")
        .text(&s.construction, "Construction Name")
        .text(&s.zone, "Zone Name")
        .blank("Space Name")
        .text(boundary, "Outside Boundary Condition")
        .text(object, "Outside Boundary Condition Object")
        .text(sun, "Sun Exposure")
        .text(wind, "Wind Exposure")
        .text("autocalculate", "View Factor to Ground")
        .num(vertices.len() as f64, "Number of Vertices");
    for (i, p) in vertices.iter().enumerate() {
        let v = i + 1;
        o.push_num(p.x, format!("Vertex {v} X-coordinate {{m}}"));
        o.push_num(p.y, format!("Vertex {v} Y-coordinate {{m}}"));
        o.push_num(p.z, format!("Vertex {v} Z-coordinate {{m}}"));
    }
    o
}

fn internal_load(l: &InternalLoad) -> IdfObject {
    let o = IdfObject::new(l.class())
        .text(l.name(), "Name")
        .text(l.zone(), "Zone or ZoneList or Space or SpaceList Name")
        .text(l.schedules()[0], "Schedule Name");
    match l {
        InternalLoad::People {
            activity_schedule,
            people_per_m2,
            ..
        } => o
            .text("People/Area", "Number of People Calculation Method")
            .blank("Number of People")
            .num(*people_per_m2, "People per Floor Area {person/m2}")
            .blank("Floor Area per Person {m2/person}")
            .num(0.3, "Fraction Radiant")
            .text("autocalculate", "Sensible Heat Fraction")
            .text(activity_schedule, "Activity Level Schedule Name"),
        InternalLoad::Lights { watts_per_m2, .. } => o
            .text("Watts/Area", "Design Level Calculation Method")
            .blank("Lighting Level {W}")
            .num(*watts_per_m2, "Watts per Floor Area {W/m2}")
            .blank("Watts per Person {W/person}")
            .num(0., "Return Air Fraction")
            .num(0.42, "Fraction Radiant")
            .num(0.18, "Fraction Visible")
            .num(1., "Fraction Replaceable"),
        InternalLoad::Equipment { watts_per_m2, .. } => o
            .text("Watts/Area", "Design Level Calculation Method")
            .blank("Design Level {W}")
            .num(*watts_per_m2, "Watts per Floor Area {W/m2}")
            .blank("Watts per Person {W/person}")
            .num(0., "Fraction Latent")
            .num(0.5, "Fraction Radiant")
            .num(0., "Fraction Lost"),
        InternalLoad::Infiltration {
            flow_per_exterior_area,
            ..
        } => o
            .text("Flow/ExteriorArea", "Design Flow Rate Calculation Method")
            .blank("Design Flow Rate {m3/s}")
            .blank("Flow Rate per Floor Area {m3/s-m2}")
            .num(*flow_per_exterior_area, "Flow Rate per Exterior Surface Area {m3/s-m2}")
            .blank("Air Changes per Hour {1/hr}")
            .num(1., "Constant Term Coefficient")
            .num(0., "Temperature Term Coefficient")
            .num(0., "Velocity Term Coefficient")
            .num(0., "Velocity Squared Term Coefficient"),
    }
}

fn thermostat(t: &SetpointManager) -> Vec<IdfObject> {
    let SetpointManager::ZoneThermostat {
        name,
        zone,
        control_type_schedule,
        heating_schedule,
        cooling_schedule,
    } = t
    else {
        return vec![];
    };
    let dual = format!("{zone}_DualSetpoint");
    vec![
        IdfObject::new("ZoneControl:Thermostat")
            .text(name, "Name")
            .text(zone, "Zone or ZoneList Name")
            .text(control_type_schedule, "Control Type Schedule Name")
            .text("ThermostatSetpoint:DualSetpoint", "Control 1 Object Type")
            .text(&dual, "Control 1 Name"),
        IdfObject::new("ThermostatSetpoint:DualSetpoint")
            .text(&dual, "Name")
            .text(heating_schedule, "Heating Setpoint Temperature Schedule Name")
            .text(cooling_schedule, "Cooling Setpoint Temperature Schedule Name"),
    ]
}

fn node(hvac: &HvacSystem, id: NodeId) -> String {
    hvac.node_name(id).to_string()
}

fn opt_node(hvac: &HvacSystem, id: Option<NodeId>) -> String {
    id.map(|n| node(hvac, n)).unwrap_or_default()
}

fn equipment_connection(conn: &ZoneEquipmentConnection, hvac: &HvacSystem) -> Vec<IdfObject> {
    let list_name = conn.equipment_list_name();
    let mut list = IdfObject::new("ZoneHVAC:EquipmentList")
        .text(&list_name, "Name")
        .text("SequentialLoad", "Load Distribution Scheme");
    for (i, (class, name)) in conn.equipment.iter().enumerate() {
        let n = i + 1;
        list.push(*class, format!("Zone Equipment {n} Object Type"));
        list.push(name, format!("Zone Equipment {n} Name"));
        list.push_num(n as f64, format!("Zone Equipment {n} Cooling Sequence"));
        list.push_num(n as f64, format!("Zone Equipment {n} Heating or No-Load Sequence"));
        list.push("", format!("Zone Equipment {n} Sequential Cooling Fraction Schedule Name"));
        list.push("", format!("Zone Equipment {n} Sequential Heating Fraction Schedule Name"));
    }
    vec![
        IdfObject::new("ZoneHVAC:EquipmentConnections")
            .text(&conn.zone, "Zone Name")
            .text(&list_name, "Zone Conditioning Equipment List Name")
            .text(node(hvac, conn.inlet), "Zone Air Inlet Node or NodeList Name")
            .text(opt_node(hvac, conn.exhaust), "Zone Air Exhaust Node or NodeList Name")
            .text(node(hvac, conn.zone_air), "Zone Air Node Name")
            .text(opt_node(hvac, conn.return_air), "Zone Return Air Node or NodeList Name"),
        list,
    ]
}

/// Objects of one component, children included.
pub fn component_objects(c: &HvacComponent, hvac: &HvacSystem) -> Vec<IdfObject> {
    match c {
        HvacComponent::OutdoorAirSystem(oa) => outdoor_air_system(oa, hvac),
        HvacComponent::Fan(f) => vec![fan(f, hvac)],
        HvacComponent::CoolingCoil(coil) => cooling_coil(coil, hvac),
        HvacComponent::HeatingCoil(coil) => vec![heating_coil(coil, hvac)],
        HvacComponent::TerminalUnit(t) => terminal_unit(t, hvac),
        HvacComponent::ZoneSplitter(s) => vec![zone_splitter(s, hvac)],
        HvacComponent::ZoneMixer(m) => vec![zone_mixer(m, hvac)],
        HvacComponent::PackagedTerminal(p) => packaged_terminal(p, hvac),
        HvacComponent::IdealLoads(u) => vec![ideal_loads(u, hvac)],
    }
}

fn outdoor_air_system(oa: &OutdoorAirSystem, hvac: &HvacSystem) -> Vec<IdfObject> {
    let ctrl = &oa.controller;
    let mixer = &oa.mixer;
    vec![
        IdfObject::new("AirLoopHVAC:OutdoorAirSystem")
            .text(&oa.name, "Name")
            .text(oa.controller_list_name(), "Controller List Name")
            .text(oa.equipment_list_name(), "Outdoor Air Equipment List Name"),
        IdfObject::new("AirLoopHVAC:ControllerList")
            .text(oa.controller_list_name(), "Name")
            .text("Controller:OutdoorAir", "Controller 1 Object Type")
            .text(&ctrl.name, "Controller 1 Name"),
        IdfObject::new("AirLoopHVAC:OutdoorAirSystem:EquipmentList")
            .text(oa.equipment_list_name(), "Name")
            .text("OutdoorAir:Mixer", "Component 1 Object Type")
            .text(&mixer.name, "Component 1 Name"),
        IdfObject::new("Controller:OutdoorAir")
            .text(&ctrl.name, "Name")
            .text(node(hvac, mixer.relief_air), "Relief Air Outlet Node Name")
            .text(node(hvac, mixer.return_air), "Return Air Node Name")
            .text(node(hvac, mixer.mixed_air), "Mixed Air Node Name")
            .text(node(hvac, mixer.outdoor_air), "Actuator Node Name")
            .num(ctrl.min_outdoor_air, "Minimum Outdoor Air Flow Rate {m3/s}")
            .num(ctrl.max_outdoor_air, "Maximum Outdoor Air Flow Rate {m3/s}")
            .text(&ctrl.economizer_control_type, "Economizer Control Type")
            .text(&ctrl.control_action, "Economizer Control Action Type")
            .num(ctrl.max_limit_drybulb_c, "Economizer Maximum Limit Dry-Bulb Temperature {C}")
            .blank("Economizer Maximum Limit Enthalpy {J/kg}")
            .blank("Economizer Maximum Limit Dewpoint Temperature {C}")
            .blank("Electronic Enthalpy Limit Curve Name")
            .blank("Economizer Minimum Limit Dry-Bulb Temperature {C}")
            .text(&ctrl.lockout, "Lockout Type")
            .text(&ctrl.minimum_limit, "Minimum Limit Type"),
        outdoor_air_mixer(mixer, hvac),
    ]
}

fn outdoor_air_mixer(m: &OutdoorAirMixer, hvac: &HvacSystem) -> IdfObject {
    IdfObject::new("OutdoorAir:Mixer")
        .text(&m.name, "Name")
        .text(node(hvac, m.mixed_air), "Mixed Air Node Name")
        .text(node(hvac, m.outdoor_air), "Outdoor Air Stream Node Name")
        .text(node(hvac, m.relief_air), "Relief Air Stream Node Name")
        .text(node(hvac, m.return_air), "Return Air Stream Node Name")
}

fn fan(f: &Fan, hvac: &HvacSystem) -> IdfObject {
    let o = IdfObject::new(f.class())
        .text(&f.name, "Name")
        .text(&f.availability_schedule, "Availability Schedule Name")
        .num(f.total_efficiency, "Fan Total Efficiency")
        .num(f.pressure_rise, "Pressure Rise {Pa}")
        .num(f.max_flow, "Maximum Flow Rate {m3/s}");
    let o = match f.kind {
        FanKind::ConstantVolume => o
            .num(f.motor_efficiency, "Motor Efficiency")
            .num(1., "Motor In Airstream Fraction"),
        // Part load coefficients of a typical inlet vane fan
        FanKind::VariableVolume => o
            .text("Fraction", "Fan Power Minimum Flow Rate Input Method")
            .num(f.min_flow_fraction, "Fan Power Minimum Flow Fraction")
            .blank("Fan Power Minimum Air Flow Rate {m3/s}")
            .num(f.motor_efficiency, "Motor Efficiency")
            .num(1., "Motor In Airstream Fraction")
            .num(0.0407598940, "Fan Power Coefficient 1")
            .num(0.08804497, "Fan Power Coefficient 2")
            .num(-0.072926120, "Fan Power Coefficient 3")
            .num(0.9437398230, "Fan Power Coefficient 4")
            .num(0., "Fan Power Coefficient 5"),
    };
    o.text(node(hvac, f.inlet), "Air Inlet Node Name")
        .text(node(hvac, f.outlet), "Air Outlet Node Name")
}

fn cooling_coil(c: &CoolingCoil, hvac: &HvacSystem) -> Vec<IdfObject> {
    let mut coil = IdfObject::new("Coil:Cooling:DX:SingleSpeed")
        .text(&c.name, "Name")
        .text(&c.availability_schedule, "Availability Schedule Name")
        .num(c.capacity, "Gross Rated Total Cooling Capacity {W}")
        .num(c.sensible_heat_ratio, "Gross Rated Sensible Heat Ratio")
        .num(c.cop, "Gross Rated Cooling COP {W/W}")
        .num(c.rated_flow, "Rated Air Flow Rate {m3/s}")
        .num(773.3, "2017 Rated Evaporator Fan Power Per Volume Flow Rate {W/(m3/s)}")
        .num(934.4, "2023 Rated Evaporator Fan Power Per Volume Flow Rate {W/(m3/s)}")
        .text(node(hvac, c.inlet), "Air Inlet Node Name")
        .text(node(hvac, c.outlet), "Air Outlet Node Name");
    for (curve, comment) in curves::ALL.iter().zip([
        "Total Cooling Capacity Function of Temperature Curve Name",
        "Total Cooling Capacity Function of Flow Fraction Curve Name",
        "Energy Input Ratio Function of Temperature Curve Name",
        "Energy Input Ratio Function of Flow Fraction Curve Name",
        "Part Load Fraction Correlation Curve Name",
    ]) {
        coil.push(*curve, comment);
    }
    let mut out = Vec::with_capacity(2);
    if let Some(system) = &c.system {
        out.push(
            IdfObject::new("CoilSystem:Cooling:DX")
                .text(system, "Name")
                .text(&c.availability_schedule, "Availability Schedule Name")
                .text(node(hvac, c.inlet), "DX Cooling Coil System Inlet Node Name")
                .text(node(hvac, c.outlet), "DX Cooling Coil System Outlet Node Name")
                .text(node(hvac, c.outlet), "DX Cooling Coil System Sensor Node Name")
                .text("Coil:Cooling:DX:SingleSpeed", "Cooling Coil Object Type")
                .text(&c.name, "Cooling Coil Name"),
        );
    }
    out.push(coil);
    out
}

fn heating_coil(c: &HeatingCoil, hvac: &HvacSystem) -> IdfObject {
    let o = IdfObject::new(c.class())
        .text(&c.name, "Name")
        .text(&c.availability_schedule, "Availability Schedule Name");
    let o = match &c.kind {
        HeatingCoilKind::Electric => o.num(1., "Efficiency"),
        HeatingCoilKind::Fuel {
            fuel_type,
            burner_efficiency,
        } => o
            .text(fuel_type, "Fuel Type")
            .num(*burner_efficiency, "Burner Efficiency"),
    };
    let mut o = o
        .num(c.capacity, "Nominal Capacity {W}")
        .text(node(hvac, c.inlet), "Air Inlet Node Name")
        .text(node(hvac, c.outlet), "Air Outlet Node Name");
    if let Some(sp) = c.setpoint_node {
        o.push(node(hvac, sp), "Temperature Setpoint Node Name");
    }
    o
}

fn terminal_unit(t: &TerminalUnit, hvac: &HvacSystem) -> Vec<IdfObject> {
    let adu = IdfObject::new("ZoneHVAC:AirDistributionUnit")
        .text(&t.distribution_unit, "Name")
        .text(node(hvac, t.outlet), "Air Distribution Unit Outlet Node Name")
        .text(t.class(), "Air Terminal Object Type")
        .text(&t.name, "Air Terminal Name");
    match &t.kind {
        TerminalKind::VavReheat {
            damper_outlet,
            min_flow_input_method,
            min_flow_fraction,
            damper_heating_action,
            reheat,
        } => {
            let terminal = IdfObject::new(t.class())
                .text(&t.name, "Name")
                .text(&t.availability_schedule, "Availability Schedule Name")
                .text(node(hvac, *damper_outlet), "Damper Air Outlet Node Name")
                .text(node(hvac, t.inlet), "Air Inlet Node Name")
                .num(t.max_flow, "Maximum Air Flow Rate {m3/s}")
                .text(min_flow_input_method, "Zone Minimum Air Flow Input Method")
                .num(*min_flow_fraction, "Constant Minimum Air Flow Fraction")
                .blank("Fixed Minimum Air Flow Rate {m3/s}")
                .blank("Minimum Air Flow Fraction Schedule Name")
                .text(reheat.class(), "Reheat Coil Object Type")
                .text(&reheat.name, "Reheat Coil Name")
                .blank("Maximum Hot Water or Steam Flow Rate {m3/s}")
                .blank("Minimum Hot Water or Steam Flow Rate {m3/s}")
                .text(node(hvac, t.outlet), "Air Outlet Node Name")
                .num(0.001, "Convergence Tolerance")
                .text(damper_heating_action, "Damper Heating Action")
                .blank("Maximum Flow per Zone Floor Area During Reheat {m3/s-m2}")
                .blank("Maximum Flow Fraction During Reheat")
                .num(35., "Maximum Reheat Air Temperature {C}");
            vec![adu, terminal, heating_coil(reheat, hvac)]
        }
        TerminalKind::ConstantVolume => {
            let terminal = IdfObject::new(t.class())
                .text(&t.name, "Name")
                .text(&t.availability_schedule, "Availability Schedule Name")
                .text(node(hvac, t.inlet), "Air Inlet Node Name")
                .text(node(hvac, t.outlet), "Air Outlet Node Name")
                .num(t.max_flow, "Maximum Air Flow Rate {m3/s}");
            vec![adu, terminal]
        }
    }
}

fn zone_splitter(s: &ZoneSplitter, hvac: &HvacSystem) -> IdfObject {
    let mut o = IdfObject::new("AirLoopHVAC:ZoneSplitter")
        .text(&s.name, "Name")
        .text(node(hvac, s.inlet), "Inlet Node Name");
    for (i, &outlet) in s.outlets.iter().enumerate() {
        o.push(node(hvac, outlet), format!("Outlet {} Node Name", i + 1));
    }
    o
}

fn zone_mixer(m: &ZoneMixer, hvac: &HvacSystem) -> IdfObject {
    let mut o = IdfObject::new("AirLoopHVAC:ZoneMixer")
        .text(&m.name, "Name")
        .text(node(hvac, m.outlet), "Outlet Node Name");
    for (i, &inlet) in m.inlets.iter().enumerate() {
        o.push(node(hvac, inlet), format!("Inlet {} Node Name", i + 1));
    }
    o
}

fn packaged_terminal(p: &PackagedTerminal, hvac: &HvacSystem) -> Vec<IdfObject> {
    let unit = IdfObject::new("ZoneHVAC:PackagedTerminalAirConditioner")
        .text(&p.name, "Name")
        .text(&p.availability_schedule, "Availability Schedule Name")
        .text(node(hvac, p.inlet), "Air Inlet Node Name")
        .text(node(hvac, p.outlet), "Air Outlet Node Name")
        .text("OutdoorAir:Mixer", "Outdoor Air Mixer Object Type")
        .text(&p.mixer.name, "Outdoor Air Mixer Name")
        .num(p.supply_flow, "Cooling Supply Air Flow Rate {m3/s}")
        .num(p.supply_flow, "Heating Supply Air Flow Rate {m3/s}")
        .blank("No Load Supply Air Flow Rate {m3/s}")
        .text("Yes", "No Load Supply Air Flow Rate Control Set To Low Speed")
        .num(p.outdoor_air_flow, "Cooling Outdoor Air Flow Rate {m3/s}")
        .num(p.outdoor_air_flow, "Heating Outdoor Air Flow Rate {m3/s}")
        .blank("No Load Outdoor Air Flow Rate {m3/s}")
        .text(p.fan.class(), "Supply Air Fan Object Type")
        .text(&p.fan.name, "Supply Air Fan Name")
        .text(p.heating.class(), "Heating Coil Object Type")
        .text(&p.heating.name, "Heating Coil Name")
        .text("Coil:Cooling:DX:SingleSpeed", "Cooling Coil Object Type")
        .text(&p.cooling.name, "Cooling Coil Name")
        .text(&p.fan_placement, "Fan Placement")
        .text(&p.fan_operating_schedule, "Supply Air Fan Operating Mode Schedule Name");
    let mut out = vec![unit, outdoor_air_mixer(&p.mixer, hvac), fan(&p.fan, hvac)];
    out.extend(cooling_coil(&p.cooling, hvac));
    out.push(heating_coil(&p.heating, hvac));
    out
}

fn ideal_loads(u: &IdealLoadsUnit, hvac: &HvacSystem) -> IdfObject {
    IdfObject::new("ZoneHVAC:IdealLoadsAirSystem")
        .text(&u.name, "Name")
        .text(&u.availability_schedule, "Availability Schedule Name")
        .text(node(hvac, u.supply), "Zone Supply Air Node Name")
        .text(node(hvac, u.exhaust), "Zone Exhaust Air Node Name")
        .blank("System Inlet Air Node Name")
        .num(u.max_heating_supply_temp_c, "Maximum Heating Supply Air Temperature {C}")
        .num(u.min_cooling_supply_temp_c, "Minimum Cooling Supply Air Temperature {C}")
        .num(0.0156, "Maximum Heating Supply Air Humidity Ratio {kgWater/kgDryAir}")
        .num(0.0077, "Minimum Cooling Supply Air Humidity Ratio {kgWater/kgDryAir}")
        .text(&u.heating_limit, "Heating Limit")
        .blank("Maximum Heating Air Flow Rate {m3/s}")
        .blank("Maximum Sensible Heating Capacity {W}")
        .text(&u.cooling_limit, "Cooling Limit")
        .blank("Maximum Cooling Air Flow Rate {m3/s}")
        .blank("Maximum Total Cooling Capacity {W}")
        .blank("Heating Availability Schedule Name")
        .blank("Cooling Availability Schedule Name")
        .text(&u.dehumidification_control, "Dehumidification Control Type")
        .num(0.7, "Cooling Sensible Heat Ratio")
        .text(&u.humidification_control, "Humidification Control Type")
        .blank("Design Specification Outdoor Air Object Name")
        .blank("Outdoor Air Inlet Node Name")
        .text("None", "Demand Controlled Ventilation Type")
        .text("NoEconomizer", "Outdoor Air Economizer Type")
        .text("None", "Heat Recovery Type")
        .num(0.7, "Sensible Heat Recovery Effectiveness")
        .num(0.65, "Latent Heat Recovery Effectiveness")
}

fn air_loop_objects(l: &AirLoop, hvac: &HvacSystem) -> Vec<IdfObject> {
    let mut out = vec![
        IdfObject::new("AirLoopHVAC")
            .text(&l.name, "Name")
            .blank("Controller List Name")
            .blank("Availability Manager List Name")
            .num(l.design_flow, "Design Supply Air Flow Rate {m3/s}")
            .text(l.branch_list_name(), "Branch List Name")
            .blank("Connector List Name")
            .text(node(hvac, l.supply_inlet), "Supply Side Inlet Node Name")
            .text(node(hvac, l.demand_outlet), "Demand Side Outlet Node Name")
            .text(node(hvac, l.demand_inlet), "Demand Side Inlet Node Names")
            .text(node(hvac, l.supply_outlet), "Supply Side Outlet Node Names"),
        IdfObject::new("BranchList")
            .text(l.branch_list_name(), "Name")
            .text(l.branch_name(), "Branch 1 Name"),
    ];

    let mut branch = IdfObject::new("Branch")
        .text(l.branch_name(), "Name")
        .blank("Pressure Drop Curve Name");
    for (i, c) in l.supply_branch.iter().enumerate() {
        let n = i + 1;
        let (class, name) = c.listed_as();
        let (inlet, outlet) = c.inlet_outlet();
        branch.push(class, format!("Component {n} Object Type"));
        branch.push(name, format!("Component {n} Name"));
        branch.push(node(hvac, inlet), format!("Component {n} Inlet Node Name"));
        branch.push(node(hvac, outlet), format!("Component {n} Outlet Node Name"));
    }
    out.push(branch);
    for c in &l.supply_branch {
        out.extend(component_objects(c, hvac));
    }

    let mut supply_path = IdfObject::new("AirLoopHVAC:SupplyPath")
        .text(&l.supply_path.name, "Name")
        .text(node(hvac, l.supply_path.inlet), "Supply Air Path Inlet Node Name");
    for (i, c) in l.supply_path.components.iter().enumerate() {
        let (class, name) = c.listed_as();
        supply_path.push(class, format!("Component {} Object Type", i + 1));
        supply_path.push(name, format!("Component {} Name", i + 1));
    }
    out.push(supply_path);
    for c in &l.supply_path.components {
        out.extend(component_objects(c, hvac));
    }

    for t in &l.terminals {
        out.extend(component_objects(t, hvac));
    }

    let mut return_path = IdfObject::new("AirLoopHVAC:ReturnPath")
        .text(&l.return_path.name, "Name")
        .text(node(hvac, l.return_path.outlet), "Return Air Path Outlet Node Name");
    for (i, c) in l.return_path.components.iter().enumerate() {
        let (class, name) = c.listed_as();
        return_path.push(class, format!("Component {} Object Type", i + 1));
        return_path.push(name, format!("Component {} Name", i + 1));
    }
    out.push(return_path);
    for c in &l.return_path.components {
        out.extend(component_objects(c, hvac));
    }
    out
}

fn node_setpoint_manager(s: &SetpointManager, hvac: &HvacSystem) -> IdfObject {
    let o = IdfObject::new(s.class())
        .text(s.name(), "Name")
        .text(s.control_variable(), "Control Variable");
    match s {
        SetpointManager::OutdoorAirReset {
            setpoint_at_outdoor_low_c,
            outdoor_low_c,
            setpoint_at_outdoor_high_c,
            outdoor_high_c,
            node: target,
            ..
        } => o
            .num(*setpoint_at_outdoor_low_c, "Setpoint at Outdoor Low Temperature {C}")
            .num(*outdoor_low_c, "Outdoor Low Temperature {C}")
            .num(*setpoint_at_outdoor_high_c, "Setpoint at Outdoor High Temperature {C}")
            .num(*outdoor_high_c, "Outdoor High Temperature {C}")
            .text(node(hvac, *target), "Setpoint Node or NodeList Name"),
        SetpointManager::MixedAir {
            reference,
            fan_inlet,
            fan_outlet,
            node: target,
            ..
        } => o
            .text(node(hvac, *reference), "Reference Setpoint Node Name")
            .text(node(hvac, *fan_inlet), "Fan Inlet Node Name")
            .text(node(hvac, *fan_outlet), "Fan Outlet Node Name")
            .text(node(hvac, *target), "Setpoint Node or NodeList Name"),
        SetpointManager::Scheduled {
            schedule,
            node: target,
            ..
        } => o
            .text(schedule, "Schedule Name")
            .text(node(hvac, *target), "Setpoint Node or NodeList Name"),
        SetpointManager::ZoneThermostat { .. } => o,
    }
}

/// Performance curves shared by every single-speed DX coil.
pub fn performance_curves() -> Vec<IdfObject> {
    let biquadratic = |name: &str, c: [f64; 6]| {
        let mut o = IdfObject::new("Curve:Biquadratic").text(name, "Name");
        for (i, v) in c.iter().enumerate() {
            o.push_num(*v, format!("Coefficient{} {}", i + 1, BIQUADRATIC_TERMS[i]));
        }
        o.num(12.77778, "Minimum Value of x")
            .num(23.88889, "Maximum Value of x")
            .num(18.0, "Minimum Value of y")
            .num(46.11111, "Maximum Value of y")
    };
    let quadratic = |name: &str, c: [f64; 3], min_x: f64, max_x: f64| {
        let mut o = IdfObject::new("Curve:Quadratic").text(name, "Name");
        for (i, v) in c.iter().enumerate() {
            o.push_num(*v, format!("Coefficient{} {}", i + 1, QUADRATIC_TERMS[i]));
        }
        o.num(min_x, "Minimum Value of x").num(max_x, "Maximum Value of x")
    };
    vec![
        biquadratic(
            curves::CAPACITY_FT,
            [0.942587793, 0.009543347, 0.000683770, -0.011042676, 0.000005249, -0.000009720],
        ),
        quadratic(curves::CAPACITY_FF, [0.8, 0.2, 0.], 0.5, 1.5),
        biquadratic(
            curves::EIR_FT,
            [0.342414409, 0.034885008, -0.000623700, 0.004977216, 0.000437951, -0.000728028],
        ),
        quadratic(curves::EIR_FF, [1.1552, -0.1808, 0.0256], 0.5, 1.5),
        quadratic(curves::PART_LOAD, [0.85, 0.15, 0.], 0., 1.),
    ]
}

const BIQUADRATIC_TERMS: [&str; 6] = ["Constant", "x", "x**2", "y", "y**2", "x*y"];
const QUADRATIC_TERMS: [&str; 3] = ["Constant", "x", "x**2"];

fn output_meters(model: &BuildingModel) -> Vec<IdfObject> {
    let mut keys = vec![ELECTRICITY_FACILITY.to_string()];
    keys.extend(model.fuels().iter().map(|f| format!("{f}:Facility")));
    keys.push(HEATING_TRANSFER.to_string());
    keys.push(COOLING_TRANSFER.to_string());
    keys.into_iter()
        .map(|k| {
            IdfObject::new("Output:Meter")
                .text(k, "Key Name")
                .text(METER_FREQUENCY.as_str(), "Reporting Frequency")
        })
        .collect()
}
