use anyhow::Result;
use building_idf::collab::{
    BuildingDataSource, ExternalBuildingData, Geocoder, KeywordExtractor, ParameterExtractor, ParameterRecord,
    StaticBuildingData, StaticCityTable,
};
use building_idf::error::{GeometryError, LocationResolutionError, ValidationError, ZoneModelError};
use building_idf::generate::build_model;
use building_idf::hvac::{SetpointManager, SystemFamily};
use building_idf::manifest::ValueSource;
use building_idf::zoning::AREA_TOLERANCE;
use building_idf::{GenerationError, GenerationRequest, GeneratorSettings, generate};

const WACKER: &str = "233 S Wacker Dr, Chicago, IL";

fn chicago_request(params: ParameterRecord) -> Result<GenerationRequest> {
    let location = StaticCityTable::default().resolve(WACKER)?;
    Ok(GenerationRequest::new("Wacker", params, location))
}

#[test]
fn test_user_area_overrides_external_footprint_data() -> Result<()> {
    let mut footprints = StaticBuildingData::default();
    footprints.insert(
        WACKER,
        ExternalBuildingData {
            source: "footprint database".to_string(),
            total_floor_area_m2: Some(14_090.2),
            ..Default::default()
        },
    );
    let params = ParameterRecord {
        address: Some(WACKER.to_string()),
        floor_area_per_story_m2: Some(1500.),
        stories: Some(10),
        ..Default::default()
    };
    let mut req = chicago_request(params)?;
    req.external = footprints.lookup(WACKER);
    assert!(req.external.is_some());

    let out = generate(&req, &GeneratorSettings::default())?;
    let building = &out.model.building;

    assert!((building.total_area() - 15_000.).abs() < 15_000. * AREA_TOLERANCE);
    assert_eq!(building.zones().len(), 256);
    assert_eq!(out.manifest.zone_count, 256);
    assert_eq!(out.manifest.area_source, ValueSource::UserOverride);
    assert_eq!(out.manifest.total_floor_area_m2.value, 15_000.);
    assert!(
        out.manifest
            .total_floor_area_m2
            .overridden
            .iter()
            .any(|o| o.source == ValueSource::ExternalData && o.value == "14090.2")
    );
    // One central loop per story
    assert_eq!(out.manifest.air_loop_count, 10);
    for story in 0..10 {
        let area = building.story_area(story);
        assert!((area - 1500.).abs() <= 1500. * AREA_TOLERANCE, "story {story}: {area}");
    }
    Ok(())
}

#[test]
fn test_description_fills_what_flags_leave_out() -> Result<()> {
    let mut params = ParameterRecord {
        stories: Some(4),
        ..Default::default()
    };
    params.fill_missing(KeywordExtractor.extract("A 6-story retail store, 900 m2 per floor, rooftop units"));
    assert_eq!(params.stories, Some(4));
    assert_eq!(params.hvac_family, Some(SystemFamily::Rtu));

    let out = generate(&chicago_request(params)?, &GeneratorSettings::default())?;
    assert_eq!(out.manifest.stories.value, 4);
    assert_eq!(out.manifest.building_type.value, "retail");
    assert!((out.model.building.total_area() - 3600.).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_degenerate_footprint_produces_no_file() -> Result<()> {
    let settings = GeneratorSettings::default();
    for outline in [vec![(5., 5.)], vec![(0., 0.), (0., 0.), (0., 0.)]] {
        let req = chicago_request(ParameterRecord::default())?.with_footprint(outline);
        match generate(&req, &settings) {
            Err(GenerationError::Geometry(GeometryError::NoValidFootprint { .. })) => {}
            other => panic!("expected a footprint error, got {:?}", other.map(|o| o.idf.len())),
        }
    }
    Ok(())
}

#[test]
fn test_zero_area_is_a_user_input_error() -> Result<()> {
    let params = ParameterRecord {
        floor_area_per_story_m2: Some(0.),
        stories: Some(3),
        ..Default::default()
    };
    let err = generate(&chicago_request(params)?, &GeneratorSettings::default()).err();
    assert!(matches!(
        err,
        Some(GenerationError::ZoneModel(ZoneModelError::InvalidArea { .. }))
    ));
    assert!(err.is_some_and(|e| e.is_user_input_error()));
    Ok(())
}

#[test]
fn test_unknown_address_is_not_replaced_by_a_default() {
    let err = StaticCityTable::default().resolve("12 Unknown Road, Nowhere");
    assert!(matches!(err, Err(LocationResolutionError::NotFound { .. })));
}

#[test]
fn test_conflicting_setpoint_managers_are_rejected() -> Result<()> {
    let params = ParameterRecord {
        stories: Some(1),
        floor_area_per_story_m2: Some(600.),
        hvac_family: Some(SystemFamily::Vav),
        ..Default::default()
    };
    let (mut model, _) = build_model(&chicago_request(params)?, &GeneratorSettings::default())?;
    let outlet = model.hvac.air_loops[0].supply_outlet;
    let before = model.hvac.setpoint_managers.len();

    let err = model.hvac.add_setpoint_manager(SetpointManager::Scheduled {
        name: "Always24".to_string(),
        control_variable: "Temperature".to_string(),
        schedule: "AlwaysOn".to_string(),
        node: outlet,
    });
    assert!(matches!(err, Err(ValidationError::ConflictingSetpoints { .. })));
    assert_eq!(model.hvac.setpoint_managers.len(), before);
    Ok(())
}

#[test]
fn test_unsupported_schema_version_is_rejected() -> Result<()> {
    let settings = GeneratorSettings {
        schema_version: "9.4".to_string(),
        ..Default::default()
    };
    let err = generate(&chicago_request(ParameterRecord::default())?, &settings).err();
    assert!(matches!(err, Some(GenerationError::Validation(_))));
    assert!(!err.is_some_and(|e| e.is_user_input_error()));
    Ok(())
}
