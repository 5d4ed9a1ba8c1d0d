//! Generator settings.
//!
//! One immutable value is passed by reference through the whole pipeline. There are
//! no module-level switches: enabling or disabling a system family, pinning the
//! schema version or changing a tolerance is done here.

use crate::error::GenerationError;
use crate::geom::zone::UsageType;
use crate::hvac::SystemFamily;
use crate::idf::schema::SchemaVersion;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Target engine schema version, e.g. "23.2". Must match the engine build exactly.
    pub schema_version: String,
    pub geometry: GeometrySettings,
    pub hvac: HvacSettings,
    pub sizing: SizingSettings,
    pub setpoints: SetpointSettings,
    pub concurrency: ConcurrencySettings,
    /// Allow one pass of unambiguous automatic corrections before giving up.
    pub auto_correct: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            schema_version: SchemaVersion::default().as_str().to_string(),
            geometry: GeometrySettings::default(),
            hvac: HvacSettings::default(),
            sizing: SizingSettings::default(),
            setpoints: SetpointSettings::default(),
            concurrency: ConcurrencySettings::default(),
            auto_correct: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometrySettings {
    /// Vertices closer than this are merged (m).
    pub coincident_tolerance_m: f64,
    /// Surfaces not larger than this are dropped (m^2).
    pub min_surface_area_m2: f64,
    pub floor_to_floor_height_m: f64,
    /// Depth of perimeter zones from the facade (m).
    pub perimeter_depth_m: f64,
    /// Perimeter zones longer than this along the facade are split (m).
    pub max_perimeter_zone_length_m: f64,
    /// Core areas larger than this are split into strips (m^2).
    pub max_core_zone_area_m2: f64,
    /// Target floor area of one residential unit (m^2).
    pub residential_unit_area_m2: f64,
    /// Footprint width / depth per building type. Missing types use the template default.
    pub aspect_ratios: BTreeMap<String, f64>,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            coincident_tolerance_m: 0.001,
            min_surface_area_m2: 0.01,
            floor_to_floor_height_m: 3.96,
            perimeter_depth_m: 4.57,
            max_perimeter_zone_length_m: 8.0,
            max_core_zone_area_m2: 200.0,
            residential_unit_area_m2: 80.0,
            aspect_ratios: BTreeMap::new(),
        }
    }
}

/// Node name suffixes appended to the air loop name.
///
/// `supply_outlet` and `zone_equipment_inlet` must differ: they name the two ends of
/// the supply/demand boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeNaming {
    pub supply_inlet: String,
    pub supply_outlet: String,
    pub zone_equipment_inlet: String,
    pub demand_outlet: String,
    pub mixed_air: String,
    pub outdoor_air: String,
    pub relief_air: String,
    pub cooling_coil_outlet: String,
    pub heating_coil_outlet: String,
}

impl Default for NodeNaming {
    fn default() -> Self {
        Self {
            supply_inlet: "_SupplyInlet".to_string(),
            supply_outlet: "_SupplyOutlet".to_string(),
            zone_equipment_inlet: "_ZoneEquipmentInlet".to_string(),
            demand_outlet: "_DemandOutlet".to_string(),
            mixed_air: "_MixedAir".to_string(),
            outdoor_air: "_OutdoorAirInlet".to_string(),
            relief_air: "_ReliefAir".to_string(),
            cooling_coil_outlet: "_CoolingCoilOutlet".to_string(),
            heating_coil_outlet: "_HeatingCoilOutlet".to_string(),
        }
    }
}

impl NodeNaming {
    fn suffixes(&self) -> [(&'static str, &str); 9] {
        [
            ("supply_inlet", &self.supply_inlet),
            ("supply_outlet", &self.supply_outlet),
            ("zone_equipment_inlet", &self.zone_equipment_inlet),
            ("demand_outlet", &self.demand_outlet),
            ("mixed_air", &self.mixed_air),
            ("outdoor_air", &self.outdoor_air),
            ("relief_air", &self.relief_air),
            ("cooling_coil_outlet", &self.cooling_coil_outlet),
            ("heating_coil_outlet", &self.heating_coil_outlet),
        ]
    }

    /// First pair of suffix fields sharing the same value.
    pub fn first_collision(&self) -> Option<(&'static str, &'static str)> {
        let suffixes = self.suffixes();
        for (i, (a, va)) in suffixes.iter().enumerate() {
            for (b, vb) in &suffixes[i + 1..] {
                if va == vb {
                    return Some((*a, *b));
                }
            }
        }
        None
    }

    /// Copy in which every suffix colliding with an earlier one gets a distinct
    /// variant. The supply outlet keeps its name, the later field is renamed.
    pub fn disambiguated(&self) -> Self {
        let mut out = self.clone();
        let mut taken: Vec<String> = Vec::new();
        for field in [
            &mut out.supply_inlet,
            &mut out.supply_outlet,
            &mut out.zone_equipment_inlet,
            &mut out.demand_outlet,
            &mut out.mixed_air,
            &mut out.outdoor_air,
            &mut out.relief_air,
            &mut out.cooling_coil_outlet,
            &mut out.heating_coil_outlet,
        ] {
            let base = field.clone();
            let mut n = 2;
            while taken.contains(field) {
                *field = format!("{base}{n}");
                n += 1;
            }
            taken.push(field.clone());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HvacSettings {
    pub enabled_families: Vec<SystemFamily>,
    /// Controller:OutdoorAir economizer control type literal.
    pub economizer_control_type: String,
    /// Fuel literal of gas-fired heating coils.
    pub heating_fuel: String,
    pub node_naming: NodeNaming,
    /// Minimum outdoor air per floor area (m^3/s per m^2).
    pub outdoor_air_per_area_m3s_m2: f64,
    pub fan_pressure_rise_pa: f64,
    pub fan_total_efficiency: f64,
    pub fan_motor_efficiency: f64,
    pub cooling_cop: f64,
    pub cooling_sensible_heat_ratio: f64,
    pub fuel_burner_efficiency: f64,
}

impl Default for HvacSettings {
    fn default() -> Self {
        Self {
            enabled_families: SystemFamily::ALL.to_vec(),
            economizer_control_type: "DifferentialDryBulb".to_string(),
            heating_fuel: "NaturalGas".to_string(),
            node_naming: NodeNaming::default(),
            outdoor_air_per_area_m3s_m2: 0.0003,
            fan_pressure_rise_pa: 600.0,
            fan_total_efficiency: 0.6,
            fan_motor_efficiency: 0.9,
            cooling_cop: 3.0,
            cooling_sensible_heat_ratio: 0.75,
            fuel_burner_efficiency: 0.8,
        }
    }
}

/// Sizing hints. These are tuning values kept inside the engine's accepted ranges,
/// not physical truths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingSettings {
    /// Lower bound of rated air flow per rated cooling capacity (m^3/s per W).
    pub min_flow_per_watt: f64,
    /// Upper bound of rated air flow per rated cooling capacity (m^3/s per W).
    pub max_flow_per_watt: f64,
    /// Supply-to-room temperature difference used to derive flow from load (K).
    pub supply_delta_t_k: f64,
    /// Floor on coil capacity scaled by zone area (W/m^2).
    pub min_capacity_w_per_m2: f64,
    /// Absolute floor on coil capacity (W).
    pub min_capacity_w: f64,
    pub vav_min_flow_fraction: f64,
    pub max_vav_min_flow_fraction: f64,
    /// Heating design load density (W/m^2).
    pub heating_load_w_per_m2: f64,
    /// Cooling design load density per usage (W/m^2).
    pub cooling_load_w_per_m2: BTreeMap<UsageType, f64>,
}

impl Default for SizingSettings {
    fn default() -> Self {
        let cooling_load_w_per_m2 = BTreeMap::from([
            (UsageType::Office, 90.0),
            (UsageType::Retail, 110.0),
            (UsageType::Lobby, 80.0),
            (UsageType::Corridor, 45.0),
            (UsageType::Storage, 30.0),
            (UsageType::Mechanical, 40.0),
            (UsageType::Residential, 60.0),
            (UsageType::Warehouse, 25.0),
        ]);
        Self {
            min_flow_per_watt: 4.027e-5,
            max_flow_per_watt: 6.041e-5,
            supply_delta_t_k: 11.0,
            min_capacity_w_per_m2: 25.0,
            min_capacity_w: 1000.0,
            vav_min_flow_fraction: 0.3,
            max_vav_min_flow_fraction: 0.4,
            heating_load_w_per_m2: 60.0,
            cooling_load_w_per_m2,
        }
    }
}

impl SizingSettings {
    pub fn cooling_load_density(&self, usage: UsageType) -> f64 {
        self.cooling_load_w_per_m2.get(&usage).copied().unwrap_or(60.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetpointSettings {
    pub heating_c: f64,
    pub cooling_c: f64,
    pub heating_setback_c: f64,
    pub cooling_setback_c: f64,
    pub outdoor_air_reset: OutdoorAirReset,
}

impl Default for SetpointSettings {
    fn default() -> Self {
        Self {
            heating_c: 21.0,
            cooling_c: 24.0,
            heating_setback_c: 15.6,
            cooling_setback_c: 26.7,
            outdoor_air_reset: OutdoorAirReset::default(),
        }
    }
}

/// Supply air temperature reset between two outdoor temperature break points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutdoorAirReset {
    pub setpoint_at_outdoor_low_c: f64,
    pub outdoor_low_c: f64,
    pub setpoint_at_outdoor_high_c: f64,
    pub outdoor_high_c: f64,
}

impl Default for OutdoorAirReset {
    fn default() -> Self {
        Self {
            setpoint_at_outdoor_low_c: 16.7,
            outdoor_low_c: 0.0,
            setpoint_at_outdoor_high_c: 12.8,
            outdoor_high_c: 21.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencySettings {
    /// Maximum number of scenario simulations running at the same time.
    pub max_concurrent_simulations: usize,
}

impl Default for ConcurrencySettings {
    fn default() -> Self {
        Self {
            max_concurrent_simulations: 4,
        }
    }
}

impl GeneratorSettings {
    pub fn schema(&self) -> Result<SchemaVersion, GenerationError> {
        SchemaVersion::parse(&self.schema_version).map_err(GenerationError::from)
    }

    /// Checks internal consistency. Node naming collisions are left to the
    /// topology builder, which reports them against the air loop they break.
    pub fn validate(&self) -> Result<(), GenerationError> {
        self.schema()?;
        let g = &self.geometry;
        let positive = [
            ("geometry.coincident_tolerance_m", g.coincident_tolerance_m),
            ("geometry.floor_to_floor_height_m", g.floor_to_floor_height_m),
            ("geometry.perimeter_depth_m", g.perimeter_depth_m),
            ("geometry.max_perimeter_zone_length_m", g.max_perimeter_zone_length_m),
            ("geometry.max_core_zone_area_m2", g.max_core_zone_area_m2),
            ("geometry.residential_unit_area_m2", g.residential_unit_area_m2),
            ("sizing.min_flow_per_watt", self.sizing.min_flow_per_watt),
            ("sizing.supply_delta_t_k", self.sizing.supply_delta_t_k),
            ("hvac.fan_total_efficiency", self.hvac.fan_total_efficiency),
            ("hvac.cooling_cop", self.hvac.cooling_cop),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.) {
                return Err(GenerationError::Settings(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }
        if !(g.min_surface_area_m2 >= 0.) {
            return Err(GenerationError::Settings(format!(
                "geometry.min_surface_area_m2 must not be negative, got {}",
                g.min_surface_area_m2
            )));
        }
        if let Some((name, ratio)) = g.aspect_ratios.iter().find(|(_, r)| !(r.is_finite() && **r > 0.)) {
            return Err(GenerationError::Settings(format!(
                "geometry.aspect_ratios.{name} must be positive, got {ratio}"
            )));
        }
        let s = &self.sizing;
        if s.max_flow_per_watt < s.min_flow_per_watt {
            return Err(GenerationError::Settings(format!(
                "sizing.max_flow_per_watt ({}) is below sizing.min_flow_per_watt ({})",
                s.max_flow_per_watt, s.min_flow_per_watt
            )));
        }
        if !(0. ..=1.).contains(&s.max_vav_min_flow_fraction) {
            return Err(GenerationError::Settings(format!(
                "sizing.max_vav_min_flow_fraction must be within 0..=1, got {}",
                s.max_vav_min_flow_fraction
            )));
        }
        if self.hvac.enabled_families.is_empty() {
            return Err(GenerationError::Settings(
                "hvac.enabled_families must not be empty".to_string(),
            ));
        }
        let sp = &self.setpoints;
        if sp.heating_c >= sp.cooling_c || sp.heating_setback_c >= sp.cooling_setback_c {
            return Err(GenerationError::Settings(
                "heating setpoints must be below cooling setpoints".to_string(),
            ));
        }
        if self.concurrency.max_concurrent_simulations == 0 {
            return Err(GenerationError::Settings(
                "concurrency.max_concurrent_simulations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reads settings from a JSON file. Missing sections take their defaults.
pub fn load_settings(path: &Path) -> Result<GeneratorSettings> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open settings file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let settings: GeneratorSettings = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse settings from: {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings_are_valid() -> Result<(), GenerationError> {
        GeneratorSettings::default().validate()
    }

    #[test]
    fn test_load_partial_settings() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(
            file,
            r#"{{"schema_version": "23.1", "geometry": {{"perimeter_depth_m": 5.0}}}}"#
        )?;
        let s = load_settings(file.path())?;
        assert_eq!(s.schema_version, "23.1");
        assert_eq!(s.geometry.perimeter_depth_m, 5.0);
        // Untouched fields keep their defaults
        assert_eq!(s.geometry.max_core_zone_area_m2, 200.0);
        assert_eq!(s.concurrency.max_concurrent_simulations, 4);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_settings(Path::new("/nonexistent/settings.json")).is_err());
    }

    #[test]
    fn test_unsupported_schema_version() {
        let s = GeneratorSettings {
            schema_version: "9.4".to_string(),
            ..Default::default()
        };
        assert!(matches!(s.validate(), Err(GenerationError::Validation(_))));
    }

    #[test]
    fn test_inverted_flow_bounds_rejected() {
        let mut s = GeneratorSettings::default();
        s.sizing.max_flow_per_watt = 1e-5;
        assert!(matches!(s.validate(), Err(GenerationError::Settings(_))));
    }

    #[test]
    fn test_node_naming_disambiguation() {
        let mut naming = NodeNaming::default();
        assert_eq!(naming.first_collision(), None);
        naming.zone_equipment_inlet = naming.supply_outlet.clone();
        assert_eq!(
            naming.first_collision(),
            Some(("supply_outlet", "zone_equipment_inlet"))
        );
        let fixed = naming.disambiguated();
        assert_eq!(fixed.first_collision(), None);
        assert_eq!(fixed.supply_outlet, "_SupplyOutlet");
        assert_eq!(fixed.zone_equipment_inlet, "_SupplyOutlet2");
    }
}
