use anyhow::Result;
use building_idf::collab::{LocationRecord, ParameterRecord};
use building_idf::generate::build_model;
use building_idf::geom::surface::SurfaceType;
use building_idf::hvac::{NodeRole, SystemFamily};
use building_idf::idf::{serialize, split_objects};
use building_idf::validate::seal;
use building_idf::zoning::BuildingType;
use building_idf::{GenerationOutput, GenerationRequest, GeneratorSettings, generate};

fn denver() -> LocationRecord {
    LocationRecord::new("Denver Intl Ap", 39.83, -104.65, 1650., -7.)
}

fn request(building_type: BuildingType, family: SystemFamily, stories: u32) -> GenerationRequest {
    let params = ParameterRecord {
        building_type: Some(building_type),
        stories: Some(stories),
        floor_area_per_story_m2: Some(1200.),
        hvac_family: Some(family),
        ..Default::default()
    };
    GenerationRequest::new(&format!("{building_type}_{family}"), params, denver())
}

fn all_outputs() -> Result<Vec<GenerationOutput>> {
    let settings = GeneratorSettings::default();
    let mut out = Vec::new();
    for family in SystemFamily::ALL {
        for building_type in BuildingType::ALL {
            out.push(generate(&request(building_type, family, 3), &settings)?);
        }
    }
    Ok(out)
}

#[test]
fn test_supply_outlet_is_not_reused_as_an_inlet() -> Result<()> {
    for out in all_outputs()? {
        let hvac = &out.model.hvac;
        for l in &hvac.air_loops {
            assert_ne!(hvac.node_name(l.supply_outlet), hvac.node_name(l.demand_inlet));
            assert_eq!(l.supply_path.inlet, l.demand_inlet);
            let outlet = hvac.registry.node(l.supply_outlet);
            assert!(!outlet.has_role(NodeRole::ComponentInlet), "{}", hvac.node_name(l.supply_outlet));
            assert!(!outlet.has_role(NodeRole::SupplyPathInlet));
        }
        for (id, _) in hvac.registry.iter() {
            hvac.registry.check_roles(id)?;
        }
    }
    Ok(())
}

#[test]
fn test_ceilings_face_up() -> Result<()> {
    for out in all_outputs()? {
        for zone in out.model.building.zones() {
            for s in zone.surfaces() {
                let tilt = s.polygon.tilt().unwrap_or(f64::NAN);
                match s.surface_type {
                    SurfaceType::Ceiling | SurfaceType::Roof => {
                        assert!(tilt.abs() < 1., "{} tilt {tilt}", s.name)
                    }
                    SurfaceType::Floor => assert!((tilt - 180.).abs() < 1., "{} tilt {tilt}", s.name),
                    SurfaceType::Wall => assert!((tilt - 90.).abs() < 1., "{} tilt {tilt}", s.name),
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_surfaces_are_valid_polygons() -> Result<()> {
    for out in all_outputs()? {
        for zone in out.model.building.zones() {
            for s in zone.surfaces() {
                let cleaned = s.polygon.remove_coincident_vertices(0.001);
                assert!(cleaned.len() >= 3, "{}", s.name);
                assert!(cleaned.area() > 0.01, "{}", s.name);
            }
        }
    }
    Ok(())
}

#[test]
fn test_every_object_is_terminated_once() -> Result<()> {
    for out in all_outputs()? {
        let blocks: Vec<&str> = out
            .idf
            .split("\n\n")
            .map(str::trim)
            .filter(|b| !b.is_empty() && !b.starts_with("!-"))
            .collect();
        assert_eq!(blocks.len(), split_objects(&out.idf).len());
        for block in blocks {
            let code: String = block
                .lines()
                .map(|l| l.split('!').next().unwrap_or("").trim_end())
                .collect::<Vec<_>>()
                .join("\n");
            assert_eq!(code.matches(';').count(), 1, "{block}");
            assert!(code.ends_with(';'), "{block}");
        }
    }
    Ok(())
}

#[test]
fn test_serialization_is_deterministic() -> Result<()> {
    let settings = GeneratorSettings::default();
    let req = request(BuildingType::Office, SystemFamily::Vav, 4);

    let (model, _) = build_model(&req, &settings)?;
    let sealed = seal(model, &settings.geometry)?;
    assert_eq!(serialize(&sealed)?, serialize(&sealed)?);

    let first = generate(&req, &settings)?;
    let second = generate(&req, &settings)?;
    assert_eq!(first.idf, second.idf);
    assert_ne!(first.manifest.run_id, second.manifest.run_id);
    Ok(())
}

#[test]
fn test_declared_version_matches_settings() -> Result<()> {
    let settings = GeneratorSettings {
        schema_version: "23.1".to_string(),
        ..Default::default()
    };
    let out = generate(&request(BuildingType::Warehouse, SystemFamily::Rtu, 1), &settings)?;
    let objects = split_objects(&out.idf);
    assert_eq!(objects[0], ("Version".to_string(), vec!["23.1".to_string()]));
    assert_eq!(objects.iter().filter(|(class, _)| class == "Version").count(), 1);
    Ok(())
}

#[test]
fn test_separators_in_user_names_do_not_split_objects() -> Result<()> {
    let mut req = request(BuildingType::Office, SystemFamily::IdealLoads, 1);
    req.name = "Acme; HQ".to_string();
    req.location = Some(LocationRecord::new("233 S Wacker Dr, Chicago, IL", 41.88, -87.64, 180., -6.));
    let out = generate(&req, &GeneratorSettings::default())?;

    let objects = split_objects(&out.idf);
    let building = objects.iter().find(|(class, _)| class == "Building");
    assert_eq!(building.map(|(_, f)| (f[0].as_str(), f.len())), Some(("Acme HQ", 8)));
    let site = objects.iter().find(|(class, _)| class == "Site:Location");
    assert_eq!(
        site.map(|(_, f)| (f[0].as_str(), f.len())),
        Some(("233 S Wacker Dr Chicago IL", 5))
    );
    assert!(objects.iter().all(|(class, _)| class != "HQ"));
    assert_eq!(out.manifest.corrections.len(), 2);
    assert_eq!(out.manifest.location, "233 S Wacker Dr Chicago IL");

    let mut strict = GeneratorSettings::default();
    strict.auto_correct = false;
    assert!(generate(&req, &strict).is_err());
    Ok(())
}
