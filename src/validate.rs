//! Pre-serialization validator.
//!
//! Every check reads the in-memory model, never the rendered text. Violations are
//! collected into a [`ValidationReport`]; only a model without violations is sealed
//! into a [`ValidatedModel`], which is the sole input the formatter accepts.

use crate::config::GeometrySettings;
use crate::error::{ValidationError, ValidationReport};
use crate::geom::polygon::validate_surface;
use crate::geom::surface::{Adjacency, SurfaceType};
use crate::geom::zone::Zone;
use crate::hvac::component::{HvacComponent, ZoneEquipmentConnection, curves};
use crate::hvac::node::{NodeId, NodeRegistry, NodeUse, conflict};
use crate::hvac::{AirLoop, BuildStage};
use crate::idf::objects::performance_curves;
use crate::idf::schema::{LiteralSet, MAX_SURFACE_VERTICES, SchemaVersion};
use crate::model::BuildingModel;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Longest object or node name accepted by the engine.
pub const MAX_NAME_LENGTH: usize = 100;

/// Characters that would break the field structure of the input file.
const FORBIDDEN_NAME_CHARS: &[char] = &[',', ';', '!', '\n', '\r'];

/// Allowed deviation (degrees) of a surface from its nominal tilt.
const TILT_TOLERANCE_DEG: f64 = 1.;

/// Checks that no node of the loop carries two incompatible roles.
///
/// In particular the supply outlet may only be consumed by the loop boundary, never by
/// a component inlet, and never doubles as the demand inlet.
pub fn check_no_duplicate_node_roles(air_loop: &AirLoop, registry: &NodeRegistry) -> Result<(), ValidationError> {
    let mut by_node: BTreeMap<NodeId, Vec<NodeUse>> = BTreeMap::new();
    for p in air_loop.assertions() {
        by_node.entry(p.node).or_default().push(p.usage);
    }
    for (node, uses) in &by_node {
        for (i, a) in uses.iter().enumerate() {
            for b in &uses[i + 1..] {
                if let Some(rule) = conflict(a, b) {
                    return Err(ValidationError::IncompatibleNodeRoles {
                        node: registry.name(*node).to_string(),
                        first: a.to_string(),
                        second: b.to_string(),
                        rule,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Checks that both sides of the loop are acyclic, that every served zone inlet is
/// reachable from the supply inlet and that every zone return reaches the demand outlet.
pub fn check_loop_connectivity(
    air_loop: &AirLoop,
    registry: &NodeRegistry,
    zone_equipment: &[ZoneEquipmentConnection],
) -> Result<(), ValidationError> {
    let (supply, demand) = air_loop.flow_edges();
    check_acyclic(&supply, &format!("air loop {} supply side", air_loop.name))?;
    check_acyclic(&demand, &format!("air loop {} demand side", air_loop.name))?;

    let mut graph: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for &(a, b, _) in supply.iter().chain(demand.iter()) {
        graph.entry(a).or_default().push(b);
    }
    // The loop itself carries air from the supply outlet to the demand inlet
    graph
        .entry(air_loop.supply_outlet)
        .or_default()
        .push(air_loop.demand_inlet);

    let reached = reachable(&graph, air_loop.supply_inlet);
    if !reached.contains(&air_loop.supply_outlet) {
        return Err(ValidationError::DanglingNode {
            node: registry.name(air_loop.supply_outlet).to_string(),
            reason: format!("not reachable from {}", registry.name(air_loop.supply_inlet)),
        });
    }

    for zone in &air_loop.zones {
        let conn = zone_equipment.iter().find(|c| &c.zone == zone);
        let fed = match (air_loop.zone_inlet(zone), conn) {
            (Some(inlet), Some(conn)) => inlet == conn.inlet && reached.contains(&inlet),
            _ => false,
        };
        if !fed {
            return Err(ValidationError::UnreachableZone {
                air_loop: air_loop.name.clone(),
                zone: zone.clone(),
            });
        }
        if let Some(ret) = conn.and_then(|c| c.return_air) {
            if !reachable(&graph, ret).contains(&air_loop.demand_outlet) {
                return Err(ValidationError::DanglingNode {
                    node: registry.name(ret).to_string(),
                    reason: format!(
                        "return air of zone {zone} does not reach {}",
                        registry.name(air_loop.demand_outlet)
                    ),
                });
            }
        }
    }
    Ok(())
}

fn reachable(graph: &HashMap<NodeId, Vec<NodeId>>, start: NodeId) -> HashSet<NodeId> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(n) = queue.pop_front() {
        for &next in graph.get(&n).into_iter().flatten() {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Kahn's algorithm. Edges left over after peeling off every source lie on or behind a
/// cycle; the first one that closes a cycle names the offending component.
fn check_acyclic(edges: &[(NodeId, NodeId, &str)], scope: &str) -> Result<(), ValidationError> {
    let mut indegree: BTreeMap<NodeId, usize> = BTreeMap::new();
    let mut outgoing: BTreeMap<NodeId, Vec<usize>> = BTreeMap::new();
    for (i, &(a, b, _)) in edges.iter().enumerate() {
        indegree.entry(a).or_insert(0);
        *indegree.entry(b).or_insert(0) += 1;
        outgoing.entry(a).or_default().push(i);
    }
    let mut queue: VecDeque<NodeId> = indegree
        .iter()
        .filter(|&(_, &d)| d == 0)
        .map(|(&n, _)| n)
        .collect();
    let mut removed = vec![false; edges.len()];
    while let Some(n) = queue.pop_front() {
        for &i in outgoing.get(&n).into_iter().flatten() {
            removed[i] = true;
            let b = edges[i].1;
            if let Some(d) = indegree.get_mut(&b) {
                *d -= 1;
                if *d == 0 {
                    queue.push_back(b);
                }
            }
        }
    }
    if removed.iter().all(|&r| r) {
        return Ok(());
    }

    let mut rest: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for (i, &(a, b, _)) in edges.iter().enumerate() {
        if !removed[i] {
            rest.entry(a).or_default().push(b);
        }
    }
    let leftover = || edges.iter().zip(&removed).filter(|(_, r)| !**r).map(|(e, _)| e);
    let closing = leftover()
        .find(|&&(a, b, _)| reachable(&rest, b).contains(&a))
        .or_else(|| leftover().next());
    match closing {
        Some(&(_, _, component)) => Err(ValidationError::Cycle {
            scope: scope.to_string(),
            component: component.to_string(),
        }),
        None => Ok(()),
    }
}

/// Re-checks every surface of a zone: vertex validity, minimum area, vertex count and
/// orientation (ceilings and roofs face up, floors face down, walls are vertical).
/// Every violation found is collected into the returned report.
pub fn check_surface_integrity(zone: &Zone, settings: &GeometrySettings) -> Result<(), ValidationReport> {
    let mut errors = Vec::new();
    for s in zone.surfaces() {
        let cleaned = match validate_surface(&s.polygon, settings.coincident_tolerance_m, settings.min_surface_area_m2)
        {
            Ok(cleaned) => cleaned,
            Err(source) => {
                errors.push(ValidationError::DegenerateSurface {
                    zone: zone.name.clone(),
                    surface: s.name.clone(),
                    source,
                });
                continue;
            }
        };
        let invalid = |reason: String| ValidationError::InvalidFieldValue {
            object: s.name.clone(),
            field: "Vertices".to_string(),
            value: format!("{} vertices", s.polygon.len()),
            reason,
        };
        if cleaned.len() != s.polygon.len() {
            errors.push(invalid("polygon has coincident vertices".to_string()));
        }
        if s.polygon.len() > MAX_SURFACE_VERTICES {
            errors.push(invalid(format!("more than {MAX_SURFACE_VERTICES} vertices")));
        }
        let expected = match s.surface_type {
            SurfaceType::Ceiling | SurfaceType::Roof => 0.,
            SurfaceType::Wall => 90.,
            SurfaceType::Floor => 180.,
        };
        if let Some(tilt) = s.polygon.tilt() {
            if (tilt - expected).abs() > TILT_TOLERANCE_DEG {
                errors.push(invalid(format!(
                    "{} has tilt {tilt:.1} degrees, expected {expected:.0}",
                    s.surface_type
                )));
            }
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationReport { errors })
    }
}

/// Checks every closed-enumeration field of a component against the schema's literal
/// table. Matching is exact and case-sensitive.
pub fn check_enumerated_fields(component: &HvacComponent, schema: SchemaVersion) -> Result<(), ValidationError> {
    match enum_violations(component, schema).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn enum_violations(component: &HvacComponent, schema: SchemaVersion) -> Vec<ValidationError> {
    component
        .enum_fields()
        .into_iter()
        .filter_map(|f| check_literal(schema, f.object, f.field, f.value, f.literals).err())
        .collect()
}

fn check_literal(
    schema: SchemaVersion,
    object: &str,
    field: &str,
    value: &str,
    set: LiteralSet,
) -> Result<(), ValidationError> {
    let allowed = schema.literals(set);
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ValidationError::InvalidEnumLiteral {
        object: object.to_string(),
        field: field.to_string(),
        value: value.to_string(),
        allowed,
    })
}

/// Runs every check on the model and returns all violations found.
pub fn validate_model(model: &BuildingModel, geometry: &GeometrySettings) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_hvac_graph(model, &mut report);
    check_setpoint_conflicts(model, &mut report);
    for zone in model.building.zones() {
        if let Err(surfaces) = check_surface_integrity(zone, geometry) {
            report.errors.extend(surfaces.errors);
        }
    }
    check_literals(model, &mut report);
    check_values(model, &mut report);
    check_references(model, &mut report);
    check_names(model, &mut report);
    debug!(
        building = %model.building.name,
        errors = report.errors.len(),
        "validated model"
    );
    report
}

fn check_hvac_graph(model: &BuildingModel, report: &mut ValidationReport) {
    let hvac = &model.hvac;
    for l in &hvac.air_loops {
        if l.stage() < BuildStage::Validated {
            report.push(ValidationError::InvalidFieldValue {
                object: l.name.clone(),
                field: "stage".to_string(),
                value: l.stage().to_string(),
                reason: "air loop was not validated at construction".to_string(),
            });
        }
        report.check(check_no_duplicate_node_roles(l, &hvac.registry));
        report.check(check_loop_connectivity(l, &hvac.registry, &hvac.zone_equipment));
    }
    for (id, _) in hvac.registry.iter() {
        report.check(hvac.registry.check_roles(id));
        report.check(hvac.registry.check_dangling(id));
    }
}

/// A node, or a zone thermostat, accepts a single writer per control variable.
fn check_setpoint_conflicts(model: &BuildingModel, report: &mut ValidationReport) {
    let hvac = &model.hvac;
    let mut writers: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for spm in &hvac.setpoint_managers {
        let target = match (spm.target(), spm.thermostat_zone()) {
            (Some(node), _) => hvac.node_name(node).to_string(),
            (None, Some(zone)) => zone.to_string(),
            (None, None) => continue,
        };
        writers
            .entry((target, spm.control_variable().to_string()))
            .or_default()
            .push(spm.name().to_string());
    }
    for ((target, variable), managers) in writers {
        if managers.len() > 1 {
            report.push(ValidationError::ConflictingSetpoints {
                target,
                variable,
                managers,
            });
        }
    }
}

fn check_literals(model: &BuildingModel, report: &mut ValidationReport) {
    let schema = model.schema;
    for c in model.hvac.components() {
        report.errors.extend(enum_violations(c, schema));
    }
    for spm in &model.hvac.setpoint_managers {
        if spm.target().is_some() {
            report.check(check_literal(
                schema,
                spm.name(),
                "Control Variable",
                spm.control_variable(),
                LiteralSet::SetpointControlVariable,
            ));
        }
    }
    for m in &model.constructions.materials {
        report.check(check_literal(schema, &m.name, "Roughness", &m.roughness, LiteralSet::Roughness));
    }
    for l in &model.type_limits {
        report.check(check_literal(schema, &l.name, "Numeric Type", &l.numeric_type, LiteralSet::NumericType));
        report.check(check_literal(schema, &l.name, "Unit Type", &l.unit_type, LiteralSet::UnitType));
    }
}

fn invalid_value(object: &str, field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidFieldValue {
        object: object.to_string(),
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn check_values(model: &BuildingModel, report: &mut ValidationReport) {
    if let Err(e) = model.building.location.validate() {
        report.push(ValidationError::InvalidFieldValue {
            object: "Site:Location".to_string(),
            field: "Latitude".to_string(),
            value: format!("{}, {}", model.building.location.latitude, model.building.location.longitude),
            reason: e.to_string(),
        });
    }
    for z in model.building.zones() {
        if !(z.area().is_finite() && z.area() > 0.) {
            report.push(invalid_value(&z.name, "Floor Area", z.area(), "must be positive"));
        }
        if !(z.floor_to_floor_height.is_finite() && z.floor_to_floor_height > 0.) {
            report.push(invalid_value(&z.name, "Ceiling Height", z.floor_to_floor_height, "must be positive"));
        }
    }
    for m in &model.constructions.materials {
        for (field, value) in [
            ("Thickness", m.thickness),
            ("Conductivity", m.conductivity),
            ("Density", m.density),
            ("Specific Heat", m.specific_heat),
        ] {
            if !(value.is_finite() && value > 0.) {
                report.push(invalid_value(&m.name, field, value, "must be positive"));
            }
        }
        for (field, value) in [
            ("Thermal Absorptance", m.thermal_absorptance),
            ("Solar Absorptance", m.solar_absorptance),
            ("Visible Absorptance", m.visible_absorptance),
        ] {
            if !(value > 0. && value <= 1.) {
                report.push(invalid_value(&m.name, field, value, "must be within (0, 1]"));
            }
        }
    }
    for load in &model.loads {
        let d = load.density();
        if !(d.is_finite() && d >= 0.) {
            report.push(invalid_value(load.name(), "Design Level", d, "must not be negative"));
        }
    }
    for s in &model.schedules {
        let Some(limits) = model.type_limits(&s.type_limits) else {
            continue;
        };
        if let Some(v) = s.values().into_iter().find(|&v| !(v.is_finite() && limits.contains(v))) {
            report.push(invalid_value(
                &s.name,
                "Value",
                v,
                &format!("outside schedule type limits {}", limits.name),
            ));
        }
    }
    for c in model.hvac.components() {
        for (object, f) in c.numeric_fields() {
            if !f.in_range() {
                report.push(invalid_value(
                    object,
                    f.field,
                    f.value,
                    &format!("must be within {}..={}", f.min, f.max),
                ));
            }
        }
    }
}

fn missing(object: &str, field: &str, kind: &'static str, target: &str) -> ValidationError {
    ValidationError::MissingReference {
        object: object.to_string(),
        field: field.to_string(),
        kind,
        target: target.to_string(),
    }
}

/// Every referenced schedule, construction, material, curve, zone and surface exists.
fn check_references(model: &BuildingModel, report: &mut ValidationReport) {
    let building = &model.building;
    let has_zone = |name: &str| building.zone(name).is_some();
    let has_schedule = |name: &str| model.schedule(name).is_some();

    for z in building.zones() {
        for s in z.surfaces() {
            if model.constructions.construction(&s.construction).is_none() {
                report.push(missing(&s.name, "Construction Name", "construction", &s.construction));
            }
            if let Adjacency::Zone { zone, surface } = &s.adjacency {
                let mirrored = building
                    .zone(zone)
                    .and_then(|other| other.surface(surface))
                    .is_some_and(|other| {
                        other.adjacency
                            == Adjacency::Zone {
                                zone: z.name.clone(),
                                surface: s.name.clone(),
                            }
                    });
                if !mirrored {
                    report.push(missing(&s.name, "Outside Boundary Condition Object", "surface", surface));
                }
            }
        }
    }
    for c in &model.constructions.constructions {
        for layer in &c.layers {
            if model.constructions.material(layer).is_none() {
                report.push(missing(&c.name, "Layer", "material", layer));
            }
        }
    }
    for s in &model.schedules {
        if model.type_limits(&s.type_limits).is_none() {
            report.push(missing(&s.name, "Schedule Type Limits Name", "schedule type limits", &s.type_limits));
        }
    }
    for load in &model.loads {
        if !has_zone(load.zone()) {
            report.push(missing(load.name(), "Zone Name", "zone", load.zone()));
        }
        for schedule in load.schedules() {
            if !has_schedule(schedule) {
                report.push(missing(load.name(), "Schedule Name", "schedule", schedule));
            }
        }
    }
    for spm in &model.hvac.setpoint_managers {
        if let Some(zone) = spm.thermostat_zone() {
            if !has_zone(zone) {
                report.push(missing(spm.name(), "Zone Name", "zone", zone));
            }
        }
        for schedule in spm.schedules() {
            if !has_schedule(schedule) {
                report.push(missing(spm.name(), "Schedule Name", "schedule", schedule));
            }
        }
    }

    let emitted: HashSet<(&'static str, String)> = model
        .hvac
        .components()
        .flat_map(|c| c.object_names())
        .collect();
    let curve_names: Vec<String> = performance_curves()
        .iter()
        .filter_map(|o| o.name().map(str::to_string))
        .collect();
    for c in model.hvac.components() {
        for (object, schedule) in c.schedule_refs() {
            if !has_schedule(schedule) {
                report.push(missing(object, "Availability Schedule Name", "schedule", schedule));
            }
        }
        for coil in c.dx_coils() {
            for curve in curves::ALL {
                if !curve_names.iter().any(|n| n == curve) {
                    report.push(missing(&coil.name, "Curve Name", "curve", curve));
                }
            }
        }
        let zone = match c {
            HvacComponent::TerminalUnit(t) => Some(&t.zone),
            HvacComponent::PackagedTerminal(p) => Some(&p.zone),
            HvacComponent::IdealLoads(u) => Some(&u.zone),
            _ => None,
        };
        if let Some(zone) = zone.filter(|z| !has_zone(z.as_str())) {
            report.push(missing(c.name(), "Zone Name", "zone", zone));
        }
    }
    for conn in &model.hvac.zone_equipment {
        if !has_zone(&conn.zone) {
            report.push(missing(&conn.equipment_list_name(), "Zone Name", "zone", &conn.zone));
        }
        for (class, name) in &conn.equipment {
            if !emitted.contains(&(*class, name.clone())) {
                report.push(missing(&conn.equipment_list_name(), "Zone Equipment Name", "equipment", name));
            }
        }
    }
    for z in building.zones() {
        if model.hvac.thermostats().all(|t| t.thermostat_zone() != Some(z.name.as_str())) {
            warn!(zone = %z.name, "zone has no thermostat");
        }
    }
}

/// (namespace, name) of every named object the formatter will emit, plus node names.
fn named_objects(model: &BuildingModel) -> Vec<(&'static str, String)> {
    let mut names: Vec<(&'static str, String)> = vec![
        ("Building", model.building.name.clone()),
        ("Site:Location", model.building.location.name.clone()),
    ];
    names.extend(model.constructions.materials.iter().map(|m| ("Material", m.name.clone())));
    names.extend(model.constructions.constructions.iter().map(|c| ("Construction", c.name.clone())));
    names.extend(model.type_limits.iter().map(|l| ("ScheduleTypeLimits", l.name.clone())));
    // Constant and compact schedules share one namespace
    names.extend(model.schedules.iter().map(|s| ("Schedule", s.name.clone())));
    for z in model.building.zones() {
        names.push(("Zone", z.name.clone()));
        names.extend(z.surfaces().iter().map(|s| ("BuildingSurface:Detailed", s.name.clone())));
    }
    names.extend(model.loads.iter().map(|l| (l.class(), l.name().to_string())));
    for spm in &model.hvac.setpoint_managers {
        names.push((spm.class(), spm.name().to_string()));
        if let Some(dual) = spm.dual_setpoint_name() {
            names.push(("ThermostatSetpoint:DualSetpoint", dual));
        }
    }
    for l in &model.hvac.air_loops {
        names.push(("AirLoopHVAC", l.name.clone()));
        names.push(("BranchList", l.branch_list_name()));
        names.push(("Branch", l.branch_name()));
        names.push(("AirLoopHVAC:SupplyPath", l.supply_path.name.clone()));
        names.push(("AirLoopHVAC:ReturnPath", l.return_path.name.clone()));
    }
    names.extend(model.hvac.components().flat_map(|c| c.object_names()));
    names.extend(
        model
            .hvac
            .zone_equipment
            .iter()
            .map(|c| ("ZoneHVAC:EquipmentList", c.equipment_list_name())),
    );
    names.extend(model.hvac.registry.iter().map(|(_, n)| ("Node", n.name.clone())));
    names
}

fn check_names(model: &BuildingModel, report: &mut ValidationReport) {
    let mut seen: HashSet<(&'static str, &str)> = HashSet::new();
    let names = named_objects(model);
    for (class, name) in &names {
        if !seen.insert((*class, name.as_str())) {
            report.push(ValidationError::DuplicateObjectName {
                class: class.to_string(),
                name: name.clone(),
            });
        }
        let reason = if name.trim().is_empty() {
            Some("name is empty".to_string())
        } else if name.trim() != name {
            Some("name has leading or trailing whitespace".to_string())
        } else if name.chars().count() > MAX_NAME_LENGTH {
            Some(format!("name is longer than {MAX_NAME_LENGTH} characters"))
        } else if name.contains(FORBIDDEN_NAME_CHARS) {
            Some("name contains a field separator".to_string())
        } else {
            None
        };
        if let Some(reason) = reason {
            report.push(ValidationError::InvalidFieldValue {
                object: class.to_string(),
                field: "Name".to_string(),
                value: name.clone(),
                reason,
            });
        }
    }
}

/// A model that passed [`validate_model`] with no violations and whose air loops are
/// marked serializable.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedModel {
    model: BuildingModel,
}

impl ValidatedModel {
    pub fn model(&self) -> &BuildingModel {
        &self.model
    }

    pub fn schema(&self) -> SchemaVersion {
        self.model.schema
    }

    pub fn into_inner(self) -> BuildingModel {
        self.model
    }
}

/// Validates the model and, if it is clean, seals it for the formatter.
pub fn seal(mut model: BuildingModel, geometry: &GeometrySettings) -> Result<ValidatedModel, ValidationReport> {
    let report = validate_model(&model, geometry);
    if !report.is_empty() {
        return Err(report);
    }
    for l in &mut model.hvac.air_loops {
        if l.stage() == BuildStage::Validated {
            l.advance(BuildStage::Serializable)
                .map_err(|e| ValidationError::InvalidFieldValue {
                    object: l.name.clone(),
                    field: "stage".to_string(),
                    value: l.stage().to_string(),
                    reason: e.to_string(),
                })?;
        }
    }
    Ok(ValidatedModel { model })
}

/// Repairs near-miss enumeration literals and free-text names in place.
///
/// A value is corrected only when exactly one accepted literal matches it after
/// ignoring case, whitespace, underscores and hyphens. The building and site names come
/// from user text; field separators in them are replaced by spaces. Everything else is
/// left for the validator to report. Returns a description of each correction.
pub fn auto_correct(model: &mut BuildingModel, report: &ValidationReport) -> Vec<String> {
    let mut corrections = Vec::new();
    let building = &mut model.building;
    for (class, name) in [("Building", &mut building.name), ("Site:Location", &mut building.location.name)] {
        if let Some(clean) = strip_separators(name) {
            warn!(object = class, from = name.as_str(), to = clean.as_str(), "removed field separators from name");
            corrections.push(format!("{class}: Name '{name}' -> '{clean}'"));
            *name = clean;
        }
    }

    let has_literal_errors = report
        .errors
        .iter()
        .any(|e| matches!(e, ValidationError::InvalidEnumLiteral { .. }));
    if !has_literal_errors {
        return corrections;
    }
    let schema = model.schema;
    let mut fix = |object: &str, field: &str, value: &mut String, set: LiteralSet| {
        let allowed = schema.literals(set);
        if allowed.contains(&value.as_str()) {
            return;
        }
        if let Some(literal) = near_miss(value, allowed) {
            warn!(object, field, from = %value, to = literal, "corrected enumeration literal");
            corrections.push(format!("{object}: {field} '{value}' -> '{literal}'"));
            *value = literal.to_string();
        }
    };

    for c in model.hvac.components_mut() {
        let object = c.name().to_string();
        for (field, value, set) in c.enum_fields_mut() {
            fix(&object, field, value, set);
        }
    }
    for spm in &mut model.hvac.setpoint_managers {
        let object = spm.name().to_string();
        if let Some(value) = spm.control_variable_mut() {
            fix(&object, "Control Variable", value, LiteralSet::SetpointControlVariable);
        }
    }
    for m in &mut model.constructions.materials {
        fix(&m.name, "Roughness", &mut m.roughness, LiteralSet::Roughness);
    }
    for l in &mut model.type_limits {
        fix(&l.name, "Numeric Type", &mut l.numeric_type, LiteralSet::NumericType);
        fix(&l.name, "Unit Type", &mut l.unit_type, LiteralSet::UnitType);
    }
    corrections
}

/// `None` when the name has no separators or nothing would be left of it.
fn strip_separators(name: &str) -> Option<String> {
    if !name.contains(FORBIDDEN_NAME_CHARS) {
        return None;
    }
    let clean = name
        .split(FORBIDDEN_NAME_CHARS)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!clean.is_empty()).then_some(clean)
}

fn near_miss(value: &str, allowed: &'static [&'static str]) -> Option<&'static str> {
    let key = normalize(value);
    let mut matches = allowed.iter().filter(|l| normalize(l) == key);
    match (matches.next(), matches.next()) {
        (Some(&literal), None) => Some(literal),
        _ => None,
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !(c.is_whitespace() || *c == '_' || *c == '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Polygon;
    use crate::config::GeneratorSettings;
    use crate::error::GenerationError;
    use crate::generate::testing::sample_model;
    use crate::geom::surface::Surface;
    use crate::geom::zone::UsageType;
    use crate::hvac::component::{Fan, FanKind};
    use crate::hvac::{SetpointManager, SystemFamily, build_topology};

    fn oa_controller_mut(model: &mut BuildingModel) -> &mut crate::hvac::component::OutdoorAirController {
        model.hvac.air_loops[0]
            .supply_branch
            .iter_mut()
            .find_map(|c| match c {
                HvacComponent::OutdoorAirSystem(oa) => Some(&mut oa.controller),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_generated_models_are_clean() -> Result<(), GenerationError> {
        let settings = GeneratorSettings::default();
        for family in SystemFamily::ALL {
            let model = sample_model(family)?;
            let report = validate_model(&model, &settings.geometry);
            assert!(report.is_empty(), "{family}: {report}");
            for zone in model.building.zones() {
                assert!(check_surface_integrity(zone, &settings.geometry).is_ok());
            }
        }
        Ok(())
    }

    #[test]
    fn test_seal_marks_loops_serializable() -> Result<(), GenerationError> {
        let settings = GeneratorSettings::default();
        let sealed = seal(sample_model(SystemFamily::Vav)?, &settings.geometry)?;
        assert!(!sealed.model().hvac.air_loops.is_empty());
        assert!(
            sealed
                .model()
                .hvac
                .air_loops
                .iter()
                .all(|l| l.stage() == BuildStage::Serializable)
        );
        // Sealing again leaves serializable loops alone
        let again = seal(sealed.into_inner(), &settings.geometry)?;
        assert_eq!(again.schema(), SchemaVersion::default());
        Ok(())
    }

    #[test]
    fn test_case_mismatch_is_reported_then_corrected() -> Result<(), GenerationError> {
        let settings = GeneratorSettings::default();
        let mut model = sample_model(SystemFamily::Vav)?;
        oa_controller_mut(&mut model).economizer_control_type = "differential dry bulb".to_string();

        let report = validate_model(&model, &settings.geometry);
        assert!(report.errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidEnumLiteral { field, value, .. }
                if field == "Economizer Control Type" && value == "differential dry bulb"
        )));

        let corrections = auto_correct(&mut model, &report);
        assert_eq!(corrections.len(), 1);
        assert_eq!(oa_controller_mut(&mut model).economizer_control_type, "DifferentialDryBulb");
        assert!(validate_model(&model, &settings.geometry).is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_literal_is_not_guessed() -> Result<(), GenerationError> {
        let settings = GeneratorSettings::default();
        let mut model = sample_model(SystemFamily::Rtu)?;
        oa_controller_mut(&mut model).economizer_control_type = "Sometimes".to_string();
        let report = validate_model(&model, &settings.geometry);
        assert!(auto_correct(&mut model, &report).is_empty());
        assert!(!validate_model(&model, &settings.geometry).is_empty());
        assert!(check_enumerated_fields(&model.hvac.air_loops[0].supply_branch[0], model.schema).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_schedule_reference() -> Result<(), GenerationError> {
        let settings = GeneratorSettings::default();
        let mut model = sample_model(SystemFamily::Ptac)?;
        model.schedules.retain(|s| s.name != crate::schedule::ALWAYS_ON);
        let report = validate_model(&model, &settings.geometry);
        assert!(report.errors.iter().any(|e| matches!(
            e,
            ValidationError::MissingReference { kind: "schedule", target, .. } if target == "AlwaysOn"
        )));
        Ok(())
    }

    #[test]
    fn test_duplicate_and_malformed_names() -> Result<(), GenerationError> {
        let settings = GeneratorSettings::default();
        let mut model = sample_model(SystemFamily::IdealLoads)?;
        let first = model.constructions.materials[0].clone();
        model.constructions.materials.push(first);
        model.type_limits[0].name = "Fraction, bad".to_string();
        let report = validate_model(&model, &settings.geometry);
        assert!(report.errors.iter().any(|e| matches!(
            e,
            ValidationError::DuplicateObjectName { class, .. } if class == "Material"
        )));
        assert!(report.errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidFieldValue { field, value, .. } if field == "Name" && value == "Fraction, bad"
        )));
        Ok(())
    }

    #[test]
    fn test_separators_in_building_and_site_names() -> Result<(), GenerationError> {
        let settings = GeneratorSettings::default();
        let mut model = sample_model(SystemFamily::IdealLoads)?;
        model.building.name = "Acme; HQ".to_string();
        model.building.location.name = "233 S Wacker Dr, Chicago, IL".to_string();
        let report = validate_model(&model, &settings.geometry);
        let flagged: Vec<&str> = report
            .errors
            .iter()
            .filter_map(|e| match e {
                ValidationError::InvalidFieldValue { object, field, .. } if field == "Name" => Some(object.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(flagged, vec!["Building", "Site:Location"]);

        let corrections = auto_correct(&mut model, &report);
        assert_eq!(corrections.len(), 2);
        assert_eq!(model.building.name, "Acme HQ");
        assert_eq!(model.building.location.name, "233 S Wacker Dr Chicago IL");
        assert!(validate_model(&model, &settings.geometry).is_empty());
        Ok(())
    }

    #[test]
    fn test_name_of_only_separators_is_left_alone() {
        assert_eq!(strip_separators(" ; , "), None);
        assert_eq!(strip_separators("Plain"), None);
        assert_eq!(strip_separators("a,b"), Some("a b".to_string()));
    }

    #[test]
    fn test_two_managers_on_one_node() -> Result<(), GenerationError> {
        let settings = GeneratorSettings::default();
        let mut model = sample_model(SystemFamily::Rtu)?;
        let node = model.hvac.air_loops[0].supply_outlet;
        model.hvac.setpoint_managers.push(SetpointManager::Scheduled {
            name: "Fixed24".to_string(),
            control_variable: "Temperature".to_string(),
            schedule: crate::schedule::COOLING_SETPOINT.to_string(),
            node,
        });
        let report = validate_model(&model, &settings.geometry);
        assert!(report.errors.iter().any(|e| matches!(
            e,
            ValidationError::ConflictingSetpoints { managers, .. } if managers.contains(&"Fixed24".to_string())
        )));
        Ok(())
    }

    fn test_zones() -> Vec<Zone> {
        (0..2)
            .map(|i| {
                let x = i as f64 * 10.;
                let fp = Polygon::from_xy(&[(x, 0.), (x + 10., 0.), (x + 10., 10.), (x, 10.)], 0.);
                Zone::new(&format!("Z{i}"), 0, UsageType::Office, fp, 3., 100.)
            })
            .collect()
    }

    #[test]
    fn test_missing_terminal_makes_zone_unreachable() -> Result<(), crate::error::TopologyError> {
        let system = build_topology(&test_zones(), SystemFamily::Vav, &GeneratorSettings::default())?;
        let mut l = system.air_loops[0].clone();
        check_loop_connectivity(&l, &system.registry, &system.zone_equipment).unwrap();
        l.terminals.remove(0);
        let err = check_loop_connectivity(&l, &system.registry, &system.zone_equipment).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnreachableZone {
                air_loop: "VAV_F01".to_string(),
                zone: "Z0".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_supply_side_cycle_is_detected() -> Result<(), crate::error::TopologyError> {
        let system = build_topology(&test_zones(), SystemFamily::Rtu, &GeneratorSettings::default())?;
        let mut l = system.air_loops[0].clone();
        let mixed = l.outdoor_air_system().unwrap().mixer.mixed_air;
        let heating_outlet = l.supply_fan().unwrap().inlet;
        l.supply_branch.push(HvacComponent::Fan(Fan {
            name: "LoopBackFan".to_string(),
            kind: FanKind::ConstantVolume,
            availability_schedule: "AlwaysOn".to_string(),
            inlet: heating_outlet,
            outlet: mixed,
            max_flow: 1.,
            pressure_rise: 100.,
            total_efficiency: 0.6,
            motor_efficiency: 0.9,
            min_flow_fraction: 0.,
            parent: None,
        }));
        let err = check_loop_connectivity(&l, &system.registry, &system.zone_equipment).unwrap_err();
        match err {
            ValidationError::Cycle { scope, .. } => assert!(scope.ends_with("supply side")),
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_supply_outlet_feeding_a_component_is_rejected() -> Result<(), crate::error::TopologyError> {
        let system = build_topology(&test_zones(), SystemFamily::Rtu, &GeneratorSettings::default())?;
        let mut l = system.air_loops[0].clone();
        check_no_duplicate_node_roles(&l, &system.registry).unwrap();
        // Point the splitter at the supply outlet instead of the demand inlet
        if let HvacComponent::ZoneSplitter(s) = &mut l.supply_path.components[0] {
            s.inlet = l.supply_outlet;
        }
        let err = check_no_duplicate_node_roles(&l, &system.registry).unwrap_err();
        assert!(matches!(err, ValidationError::IncompatibleNodeRoles { .. }));
        Ok(())
    }

    #[test]
    fn test_degenerate_and_flipped_surfaces() {
        let settings = GeneratorSettings::default().geometry;
        let mut zone = test_zones().remove(0);
        let collinear = Polygon::from_xy(&[(0., 0.), (5., 0.), (10., 0.)], 3.);
        zone.attach_surface_unchecked(Surface::new(
            "Z0_Sliver",
            "Z0",
            SurfaceType::Wall,
            collinear,
            "ExteriorWall",
            Adjacency::Exterior,
        ));
        // Counterclockwise seen from above faces up, which is wrong for a floor
        let up = Polygon::from_xy(&[(0., 0.), (10., 0.), (10., 10.), (0., 10.)], 0.);
        zone.attach_surface_unchecked(Surface::new(
            "Z0_Floor",
            "Z0",
            SurfaceType::Floor,
            up.clone(),
            "GroundFloor",
            Adjacency::Ground,
        ));
        zone.attach_surface_unchecked(Surface::new(
            "Z0_Ceiling",
            "Z0",
            SurfaceType::Ceiling,
            up,
            "InteriorCeiling",
            Adjacency::Adiabatic,
        ));
        let errors = check_surface_integrity(&zone, &settings)
            .err()
            .map(|r| r.errors)
            .unwrap_or_default();
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            ValidationError::DegenerateSurface { surface, .. } if surface == "Z0_Sliver"
        ));
        assert!(matches!(
            &errors[1],
            ValidationError::InvalidFieldValue { object, .. } if object == "Z0_Floor"
        ));
    }

    #[test]
    fn test_near_miss_requires_unique_match() {
        let allowed: &'static [&'static str] = &["Normal", "Reverse", "ReverseWithLimits"];
        assert_eq!(near_miss("reverse", allowed), Some("Reverse"));
        assert_eq!(near_miss("Reverse With Limits", allowed), Some("ReverseWithLimits"));
        assert_eq!(near_miss("Backwards", allowed), None);
    }
}
