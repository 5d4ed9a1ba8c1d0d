//! Generation Orchestrator.
//!
//! Sequences the pipeline for one building: area precedence, zones, HVAC topology,
//! validation (with at most one correction pass), then serialization. Nothing is
//! written unless the model passed validation.

use crate::collab::{ExternalBuildingData, LocationRecord, ParameterRecord};
use crate::config::GeneratorSettings;
use crate::envelope::{ConstructionEra, ConstructionSet};
use crate::error::{GenerationError, GeometryError, LocationResolutionError, TopologyError, ValidationError};
use crate::geom::building::Building;
use crate::geom::polygon::validate_surface;
use crate::geom::zone::{UsageType, Zone};
use crate::hvac::{HvacSystem, SystemFamily, build_topology};
use crate::idf;
use crate::loads::zone_loads;
use crate::manifest::{GenerationManifest, Recorded, ValueSource};
use crate::model::BuildingModel;
use crate::schedule::{build_schedules, standard_type_limits};
use crate::validate::{auto_correct, seal, validate_model};
use crate::zoning::{BuildingType, build_zones, resolve_area};
use crate::{Polygon, UID};
use rayon::prelude::*;
use std::borrow::Cow;
use tracing::{info, warn};

/// Special features the generator knows how to honour.
const FEATURE_ECONOMIZER: &str = "economizer";
const FEATURE_NO_ECONOMIZER: &str = "no_economizer";

/// Everything known about one building before generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub name: String,
    pub params: ParameterRecord,
    /// Resolved by the geocoding collaborator. Required.
    pub location: Option<LocationRecord>,
    pub external: Option<ExternalBuildingData>,
    /// Footprint outline (x, y) drawn by the user. Its area stands in for a missing
    /// area per story; zones are still laid out on an equal-area rectangle.
    pub footprint: Option<Vec<(f64, f64)>>,
}

impl GenerationRequest {
    pub fn new(name: &str, params: ParameterRecord, location: LocationRecord) -> Self {
        Self {
            name: name.to_string(),
            params,
            location: Some(location),
            external: None,
            footprint: None,
        }
    }

    pub fn with_external(mut self, external: ExternalBuildingData) -> Self {
        self.external = Some(external);
        self
    }

    pub fn with_footprint(mut self, footprint: Vec<(f64, f64)>) -> Self {
        self.footprint = Some(footprint);
        self
    }
}

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub idf: String,
    pub manifest: GenerationManifest,
    pub model: BuildingModel,
}

/// Builds the in-memory model of one building without validating it.
pub fn build_model(
    req: &GenerationRequest,
    settings: &GeneratorSettings,
) -> Result<(BuildingModel, GenerationManifest), GenerationError> {
    settings.validate()?;
    let schema = settings.schema()?;
    let location = req
        .location
        .clone()
        .ok_or(LocationResolutionError::MissingLocation)?;
    location.validate()?;

    let mut params = req.params.clone();
    if let Some(outline) = &req.footprint {
        let footprint_area = check_footprint(outline, settings)?;
        if params.floor_area_per_story_m2.is_none() {
            params.floor_area_per_story_m2 = Some(footprint_area);
        }
    }

    let building_type = match params.building_type {
        Some(t) => Recorded::new(t, ValueSource::UserInput),
        None => Recorded::new(BuildingType::Office, ValueSource::Estimated),
    };
    let plan = resolve_area(&params, req.external.as_ref(), building_type.value)?;

    let era = match params.construction_era {
        Some(year) => Recorded::new(ConstructionEra::from_year(year), ValueSource::UserInput),
        None => Recorded::new(ConstructionEra::default(), ValueSource::Estimated),
    };
    let constructions = ConstructionSet::for_era(era.value);
    let zone_model = build_zones(&plan, building_type.value, &settings.geometry, &constructions)?;

    let family = match params.hvac_family {
        Some(f) => Recorded::new(f, ValueSource::UserInput),
        None => Recorded::new(building_type.value.default_system_family(), ValueSource::Estimated),
    };

    let mut ignored_features = Vec::new();
    let effective = effective_settings(settings, &params, &mut ignored_features);
    let mut corrections = Vec::new();
    let hvac = topology_with_retry(&zone_model.zones, family.value, &effective, &mut corrections)?;

    let loads = zone_model.zones.iter().flat_map(zone_loads).collect();
    let mut usages: Vec<UsageType> = zone_model.zones.iter().map(|z| z.usage).collect();
    usages.sort_unstable();
    usages.dedup();
    let schedules = build_schedules(&usages, &settings.setpoints);

    let building = Building::new(
        &req.name,
        building_type.value,
        location,
        plan.story_count(),
        settings.geometry.floor_to_floor_height_m,
        zone_model.zones,
    )?;

    let manifest = GenerationManifest {
        run_id: UID::new(),
        schema_version: schema.as_str().to_string(),
        building_name: req.name.clone(),
        location: building.location.name.clone(),
        building_type: relabel(&building_type, building_type.value.as_str()),
        stories: plan.stories.clone(),
        total_floor_area_m2: plan.total_area.clone(),
        floor_area_per_story_m2: plan.story_area(),
        area_source: plan.total_area.source,
        hvac_family: relabel(&family, family.value.as_str()),
        construction_era: relabel(&era, era.value.as_str()),
        zone_count: building.zones().len(),
        air_loop_count: hvac.air_loops.len(),
        dropped_surfaces: zone_model.dropped_surfaces,
        corrections,
        ignored_features,
    };

    let model = BuildingModel {
        building,
        hvac,
        constructions,
        type_limits: standard_type_limits(),
        schedules,
        loads,
        schema,
    };
    Ok((model, manifest))
}

/// Generates the input file of one building.
///
/// The model is validated once; if that fails and auto-correction is enabled, the
/// unambiguous cases are repaired in the model and it is validated a second time.
/// Anything still failing is returned as an error and no text is produced.
pub fn generate(req: &GenerationRequest, settings: &GeneratorSettings) -> Result<GenerationOutput, GenerationError> {
    let (mut model, mut manifest) = build_model(req, settings)?;

    let report = validate_model(&model, &settings.geometry);
    if !report.is_empty() {
        if !settings.auto_correct {
            return Err(report.into());
        }
        let corrections = auto_correct(&mut model, &report);
        if corrections.is_empty() {
            return Err(report.into());
        }
        manifest.corrections.extend(corrections);
        manifest.building_name = model.building.name.clone();
        manifest.location = model.building.location.name.clone();
    }
    let validated = seal(model, &settings.geometry)?;
    let idf = idf::serialize(&validated)?;

    info!(
        building = %req.name,
        zones = manifest.zone_count,
        air_loops = manifest.air_loop_count,
        area_m2 = manifest.total_floor_area_m2.value,
        area_source = %manifest.area_source,
        corrections = manifest.corrections.len(),
        "generated input file"
    );
    Ok(GenerationOutput {
        idf,
        manifest,
        model: validated.into_inner(),
    })
}

/// Generates many buildings in parallel. Results keep the order of `requests`.
pub fn generate_batch(
    requests: &[GenerationRequest],
    settings: &GeneratorSettings,
) -> Vec<Result<GenerationOutput, GenerationError>> {
    requests.par_iter().map(|req| generate(req, settings)).collect()
}

fn check_footprint(outline: &[(f64, f64)], settings: &GeneratorSettings) -> Result<f64, GeometryError> {
    let g = &settings.geometry;
    let poly = validate_surface(&Polygon::from_xy(outline, 0.), g.coincident_tolerance_m, g.min_surface_area_m2)
        .map_err(|source| GeometryError::NoValidFootprint {
            reason: source.to_string(),
        })?;
    Ok(poly.area())
}

/// Per-building copy of the settings with special features applied.
fn effective_settings<'a>(
    settings: &'a GeneratorSettings,
    params: &ParameterRecord,
    ignored: &mut Vec<String>,
) -> Cow<'a, GeneratorSettings> {
    let mut out = Cow::Borrowed(settings);
    for feature in &params.special_features {
        match feature.trim().to_lowercase().as_str() {
            FEATURE_ECONOMIZER => {
                if out.hvac.economizer_control_type == "NoEconomizer" {
                    out.to_mut().hvac.economizer_control_type = "DifferentialDryBulb".to_string();
                }
            }
            FEATURE_NO_ECONOMIZER => {
                out.to_mut().hvac.economizer_control_type = "NoEconomizer".to_string();
            }
            _ => {
                warn!(feature = %feature, "ignoring unsupported special feature");
                ignored.push(feature.clone());
            }
        }
    }
    out
}

/// Builds the topology. A supply outlet name colliding with another node suffix is
/// the one wiring failure repaired here: the suffixes are disambiguated and the
/// topology is built once more.
fn topology_with_retry(
    zones: &[Zone],
    family: SystemFamily,
    settings: &GeneratorSettings,
    corrections: &mut Vec<String>,
) -> Result<HvacSystem, GenerationError> {
    match build_topology(zones, family, settings) {
        Ok(system) => Ok(system),
        Err(TopologyError::Wiring {
            air_loop,
            source: source @ ValidationError::NodeNameCollision { .. },
        }) if settings.auto_correct => {
            let mut retry = settings.clone();
            retry.hvac.node_naming = settings.hvac.node_naming.disambiguated();
            let correction = format!("{air_loop}: {source}; node suffixes disambiguated");
            warn!(air_loop = %air_loop, "disambiguating colliding node names");
            let system = build_topology(zones, family, &retry)?;
            corrections.push(correction);
            Ok(system)
        }
        Err(e) => Err(e.into()),
    }
}

fn relabel<T>(rec: &Recorded<T>, label: &str) -> Recorded<String> {
    Recorded {
        value: label.to_string(),
        source: rec.source,
        overridden: rec.overridden.clone(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub fn chicago() -> LocationRecord {
        LocationRecord::new("Chicago Ohare Intl Ap", 41.98, -87.92, 201., -6.).with_climate_zone("5A")
    }

    /// Two-story office with the requested system family, not yet validated.
    pub fn sample_model(family: SystemFamily) -> Result<BuildingModel, GenerationError> {
        let params = ParameterRecord {
            building_type: Some(BuildingType::Office),
            stories: Some(2),
            floor_area_per_story_m2: Some(600.),
            hvac_family: Some(family),
            ..Default::default()
        };
        let req = GenerationRequest::new("Sample", params, chicago());
        let (model, _) = build_model(&req, &GeneratorSettings::default())?;
        Ok(model)
    }
}
