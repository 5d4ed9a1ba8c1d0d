//! Interfaces of the collaborators around the generator core.
//!
//! The core never performs lookups itself: it consumes a [`ParameterRecord`], a
//! [`LocationRecord`] and optionally [`ExternalBuildingData`] that the caller has
//! already fetched through these traits.

use crate::error::LocationResolutionError;
use crate::hvac::SystemFamily;
use crate::results::SimulationOutput;
use crate::zoning::BuildingType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Real-world site of a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
    /// Hours from UTC.
    pub timezone_offset: f64,
    pub climate_zone: Option<String>,
}

impl LocationRecord {
    pub fn new(name: &str, latitude: f64, longitude: f64, elevation_m: f64, timezone_offset: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
            elevation_m,
            timezone_offset,
            climate_zone: None,
        }
    }

    pub fn with_climate_zone(mut self, climate_zone: &str) -> Self {
        self.climate_zone = Some(climate_zone.to_string());
        self
    }

    /// Rejects coordinates that cannot be a real place.
    pub fn validate(&self) -> Result<(), LocationResolutionError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        let tz_ok = self.timezone_offset.is_finite() && (-12.0..=14.0).contains(&self.timezone_offset);
        if lat_ok && lon_ok && tz_ok && self.elevation_m.is_finite() {
            Ok(())
        } else {
            Err(LocationResolutionError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// Partial description of a building. Absent fields are estimated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterRecord {
    pub address: Option<String>,
    pub building_type: Option<BuildingType>,
    pub stories: Option<u32>,
    pub floor_area_per_story_m2: Option<f64>,
    pub total_floor_area_m2: Option<f64>,
    pub hvac_family: Option<SystemFamily>,
    pub construction_era: Option<i32>,
    pub special_features: BTreeSet<String>,
}

impl ParameterRecord {
    /// Fills fields that are absent here from `other`. Fields already set are kept.
    pub fn fill_missing(&mut self, other: ParameterRecord) {
        self.address = self.address.take().or(other.address);
        self.building_type = self.building_type.or(other.building_type);
        self.stories = self.stories.or(other.stories);
        self.floor_area_per_story_m2 = self.floor_area_per_story_m2.or(other.floor_area_per_story_m2);
        self.total_floor_area_m2 = self.total_floor_area_m2.or(other.total_floor_area_m2);
        self.hvac_family = self.hvac_family.or(other.hvac_family);
        self.construction_era = self.construction_era.or(other.construction_era);
        self.special_features.extend(other.special_features);
    }
}

/// Building data fetched from a third-party source (e.g. a footprint database).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalBuildingData {
    pub source: String,
    pub total_floor_area_m2: Option<f64>,
    pub footprint_area_m2: Option<f64>,
    pub stories: Option<u32>,
}

/// Resolves an address to real coordinates.
///
/// Implementations must fail with [`LocationResolutionError::NotFound`] instead of
/// returning a placeholder location.
pub trait Geocoder: Send + Sync {
    fn resolve(&self, address: &str) -> Result<LocationRecord, LocationResolutionError>;
}

/// Extracts building parameters from free text.
pub trait ParameterExtractor: Send + Sync {
    fn extract(&self, input: &str) -> ParameterRecord;
}

/// Looks up external building data for an address.
pub trait BuildingDataSource: Send + Sync {
    fn lookup(&self, address: &str) -> Option<ExternalBuildingData>;
}

/// Runs the simulation engine on a generated input file.
pub trait SimulationRunner: Send + Sync {
    fn simulate(&self, idf: &str) -> anyhow::Result<SimulationOutput>;
}

/// Offline geocoder backed by a table of weather-station locations.
///
/// Matches an address by the city name it contains.
pub struct StaticCityTable {
    entries: Vec<(&'static str, LocationRecord)>,
}

impl Default for StaticCityTable {
    fn default() -> Self {
        let entries = vec![
            ("chicago", LocationRecord::new("Chicago O'Hare Intl Ap IL USA", 41.98, -87.92, 201., -6.).with_climate_zone("5A")),
            ("new york", LocationRecord::new("New York Central Park NY USA", 40.78, -73.97, 40., -5.).with_climate_zone("4A")),
            ("los angeles", LocationRecord::new("Los Angeles Intl Ap CA USA", 33.93, -118.40, 32., -8.).with_climate_zone("3B")),
            ("houston", LocationRecord::new("Houston Bush Intl Ap TX USA", 29.98, -95.36, 33., -6.).with_climate_zone("2A")),
            ("phoenix", LocationRecord::new("Phoenix Sky Harbor Intl Ap AZ USA", 33.43, -112.02, 339., -7.).with_climate_zone("2B")),
            ("denver", LocationRecord::new("Denver Intl Ap CO USA", 39.83, -104.65, 1650., -7.).with_climate_zone("5B")),
            ("seattle", LocationRecord::new("Seattle Tacoma Intl Ap WA USA", 47.46, -122.31, 132., -8.).with_climate_zone("4C")),
            ("miami", LocationRecord::new("Miami Intl Ap FL USA", 25.82, -80.30, 2., -5.).with_climate_zone("1A")),
            ("boston", LocationRecord::new("Boston Logan Intl Ap MA USA", 42.37, -71.02, 6., -5.).with_climate_zone("5A")),
            ("san francisco", LocationRecord::new("San Francisco Intl Ap CA USA", 37.62, -122.40, 2., -8.).with_climate_zone("3C")),
            ("atlanta", LocationRecord::new("Atlanta Hartsfield Intl Ap GA USA", 33.64, -84.43, 308., -5.).with_climate_zone("3A")),
            ("minneapolis", LocationRecord::new("Minneapolis St Paul Intl Ap MN USA", 44.88, -93.23, 255., -6.).with_climate_zone("6A")),
        ];
        Self { entries }
    }
}

impl StaticCityTable {
    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(city, _)| *city)
    }
}

impl Geocoder for StaticCityTable {
    fn resolve(&self, address: &str) -> Result<LocationRecord, LocationResolutionError> {
        let query = address.to_lowercase();
        self.entries
            .iter()
            .find(|(city, _)| query.contains(*city))
            .map(|(_, record)| record.clone())
            .ok_or_else(|| LocationResolutionError::NotFound {
                query: address.to_string(),
            })
    }
}

/// External data keyed by exact address, e.g. loaded from a cached export.
#[derive(Debug, Clone, Default)]
pub struct StaticBuildingData {
    entries: Vec<(String, ExternalBuildingData)>,
}

impl StaticBuildingData {
    pub fn insert(&mut self, address: &str, data: ExternalBuildingData) {
        self.entries.push((normalize_address(address), data));
    }
}

impl BuildingDataSource for StaticBuildingData {
    fn lookup(&self, address: &str) -> Option<ExternalBuildingData> {
        let key = normalize_address(address);
        self.entries
            .iter()
            .find(|(a, _)| *a == key)
            .map(|(_, d)| d.clone())
    }
}

fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Square feet to square meters.
const FT2_TO_M2: f64 = 0.092_903;

/// Rule-based extractor for short English descriptions such as
/// "10-story office, 1500 m2 per floor, VAV".
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl ParameterExtractor for KeywordExtractor {
    fn extract(&self, input: &str) -> ParameterRecord {
        let text = strip_thousands_separators(&input.to_lowercase());
        let tokens: Vec<&str> = text
            .split(|c: char| !(c.is_alphanumeric() || c == '.'))
            .map(|t| t.trim_matches('.'))
            .filter(|t| !t.is_empty())
            .collect();

        let mut record = ParameterRecord::default();
        for (i, tok) in tokens.iter().enumerate() {
            if record.building_type.is_none() {
                record.building_type = building_type_keyword(tok);
            }
            if record.hvac_family.is_none() {
                record.hvac_family = hvac_keyword(tok);
            }
            if let Some(value) = parse_number(tok) {
                let next = tokens.get(i + 1).copied().unwrap_or("");
                let after = tokens.get(i + 2).copied().unwrap_or("");
                match next {
                    "story" | "stories" | "storey" | "storeys" | "floor" | "floors" => {
                        if value >= 1. && value.fract() == 0. {
                            record.stories = Some(value as u32);
                        }
                    }
                    "m2" | "sqm" | "m²" => assign_area(&mut record, value, &tokens[i + 2..]),
                    "square" if after.starts_with("met") => {
                        assign_area(&mut record, value, &tokens[(i + 3).min(tokens.len())..])
                    }
                    "square" if after.starts_with("f") => {
                        assign_area(&mut record, value * FT2_TO_M2, &tokens[(i + 3).min(tokens.len())..])
                    }
                    "sqft" | "ft2" => {
                        assign_area(&mut record, value * FT2_TO_M2, &tokens[i + 2..])
                    }
                    _ => {}
                }
                if (1800. ..=2100.).contains(&value)
                    && value.fract() == 0.
                    && i > 0
                    && matches!(tokens[i - 1], "in" | "built" | "year" | "constructed")
                {
                    record.construction_era = Some(value as i32);
                }
            }
        }
        record
    }
}

fn assign_area(record: &mut ParameterRecord, area: f64, rest: &[&str]) {
    let per_floor = rest
        .iter()
        .take(3)
        .any(|t| matches!(*t, "per" | "each" | "floor" | "story" | "storey"));
    if per_floor {
        record.floor_area_per_story_m2.get_or_insert(area);
    } else {
        record.total_floor_area_m2.get_or_insert(area);
    }
}

fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.)
}

/// "1,500" -> "1500"; other commas are kept.
fn strip_thousands_separators(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|&(i, c)| {
            !(*c == ','
                && i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()))
        })
        .map(|(_, c)| *c)
        .collect()
}

fn building_type_keyword(token: &str) -> Option<BuildingType> {
    match token {
        "office" | "offices" => Some(BuildingType::Office),
        "retail" | "store" | "shop" | "supermarket" => Some(BuildingType::Retail),
        "warehouse" | "storage" | "distribution" => Some(BuildingType::Warehouse),
        "apartment" | "apartments" | "residential" | "condo" | "multifamily" => {
            Some(BuildingType::Residential)
        }
        _ => None,
    }
}

fn hvac_keyword(token: &str) -> Option<SystemFamily> {
    match token {
        "vav" => Some(SystemFamily::Vav),
        "rtu" | "rooftop" => Some(SystemFamily::Rtu),
        "ptac" => Some(SystemFamily::Ptac),
        "ideal" => Some(SystemFamily::IdealLoads),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_city_table_resolves_chicago() -> Result<(), LocationResolutionError> {
        let table = StaticCityTable::default();
        let loc = table.resolve("233 S Wacker Dr, Chicago, IL")?;
        assert!((loc.latitude - 41.98).abs() < 1e-9);
        assert_eq!(loc.climate_zone.as_deref(), Some("5A"));
        loc.validate()?;
        Ok(())
    }

    #[test]
    fn test_unknown_address_is_an_error() {
        let table = StaticCityTable::default();
        assert_eq!(
            table.resolve("1 Nowhere Lane, Atlantis"),
            Err(LocationResolutionError::NotFound {
                query: "1 Nowhere Lane, Atlantis".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_coordinates() {
        let loc = LocationRecord::new("bad", 95., 0., 0., 0.);
        assert!(loc.validate().is_err());
    }

    #[test]
    fn test_keyword_extractor() {
        let r = KeywordExtractor.extract("A 10-story office tower, 1,500 m2 per floor, VAV system, built in 1995");
        assert_eq!(r.building_type, Some(BuildingType::Office));
        assert_eq!(r.stories, Some(10));
        assert_eq!(r.floor_area_per_story_m2, Some(1500.));
        assert_eq!(r.total_floor_area_m2, None);
        assert_eq!(r.hvac_family, Some(SystemFamily::Vav));
        assert_eq!(r.construction_era, Some(1995));
    }

    #[test]
    fn test_keyword_extractor_square_feet_total() {
        let r = KeywordExtractor.extract("small retail store of 10000 sqft");
        assert_eq!(r.building_type, Some(BuildingType::Retail));
        let area = r.total_floor_area_m2.unwrap();
        assert!((area - 929.03).abs() < 0.01);
    }

    #[test]
    fn test_fill_missing_keeps_explicit_values() {
        let mut explicit = ParameterRecord {
            stories: Some(10),
            ..Default::default()
        };
        explicit.fill_missing(ParameterRecord {
            stories: Some(3),
            building_type: Some(BuildingType::Office),
            ..Default::default()
        });
        assert_eq!(explicit.stories, Some(10));
        assert_eq!(explicit.building_type, Some(BuildingType::Office));
    }

    #[test]
    fn test_static_building_data_lookup() {
        let mut data = StaticBuildingData::default();
        data.insert(
            "233 S Wacker Dr,  Chicago, IL",
            ExternalBuildingData {
                source: "footprints".to_string(),
                total_floor_area_m2: Some(14090.2),
                ..Default::default()
            },
        );
        let found = data.lookup("233 s wacker dr, chicago, il").unwrap();
        assert_eq!(found.total_floor_area_m2, Some(14090.2));
        assert!(data.lookup("elsewhere").is_none());
    }
}
