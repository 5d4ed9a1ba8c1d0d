//! Building container - the top level of the hierarchy.
//!
//! Hierarchy: Building → Zone → Surface → Polygon

use crate::collab::LocationRecord;
use crate::error::ValidationError;
use crate::geom::zone::Zone;
use crate::sortbyname::first_duplicate_name;
use crate::zoning::BuildingType;
use crate::{HasName, UID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    pub uid: UID,
    pub building_type: BuildingType,
    pub location: LocationRecord,
    pub stories: u32,
    pub floor_to_floor_height: f64,
    zones: Vec<Zone>,
}

impl HasName for Building {
    fn get_name(&self) -> &str {
        &self.name
    }
}

impl Building {
    /// Creates a building from its zones. Zone names must be unique.
    pub fn new(
        name: &str,
        building_type: BuildingType,
        location: LocationRecord,
        stories: u32,
        floor_to_floor_height: f64,
        zones: Vec<Zone>,
    ) -> Result<Self, ValidationError> {
        if let Some(name) = first_duplicate_name(&zones) {
            return Err(ValidationError::DuplicateObjectName {
                class: "Zone".to_string(),
                name,
            });
        }
        Ok(Self {
            name: name.to_string(),
            uid: UID::new(),
            building_type,
            location,
            stories,
            floor_to_floor_height,
            zones,
        })
    }

    /// Zones in story order, then in partition order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn zones_in_story(&self, story: u32) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(move |z| z.story == story)
    }

    /// Sum of the authoritative zone areas.
    pub fn total_area(&self) -> f64 {
        self.zones.iter().map(|z| z.area()).sum()
    }

    pub fn story_area(&self, story: u32) -> f64 {
        self.zones_in_story(story).map(|z| z.area()).sum()
    }

    pub fn surface_count(&self) -> usize {
        self.zones.iter().map(|z| z.surfaces().len()).sum()
    }
}
