//! Authoritative floor area and story count.
//!
//! Precedence is strict: explicit user input always wins over external data, which
//! wins over estimates. Every decision is logged and recorded for the manifest.

use crate::collab::{ExternalBuildingData, ParameterRecord};
use crate::error::ZoneModelError;
use crate::manifest::{Recorded, ValueSource};
use crate::zoning::BuildingType;
use tracing::{info, warn};

/// Resolved area budget of a building.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaPlan {
    pub stories: Recorded<u32>,
    pub total_area: Recorded<f64>,
}

impl AreaPlan {
    pub fn story_count(&self) -> u32 {
        self.stories.value
    }

    pub fn total(&self) -> f64 {
        self.total_area.value
    }

    /// Every story gets the same share of the total.
    pub fn story_area(&self) -> f64 {
        self.total_area.value / self.stories.value as f64
    }
}

/// Resolves the story count and total floor area from user input, external data
/// and estimates, in that order.
pub fn resolve_area(
    params: &ParameterRecord,
    external: Option<&ExternalBuildingData>,
    building_type: BuildingType,
) -> Result<AreaPlan, ZoneModelError> {
    for (quantity, value) in [
        ("floor_area_per_story_m2", params.floor_area_per_story_m2),
        ("total_floor_area_m2", params.total_floor_area_m2),
    ] {
        if let Some(v) = value {
            check_area(quantity, v)?;
        }
    }

    let ext_stories = external.and_then(|e| e.stories);
    let stories = match (params.stories, ext_stories) {
        (Some(s), Some(e)) if s != e => {
            Recorded::new(s, ValueSource::UserInput).overriding(ValueSource::ExternalData, e)
        }
        (Some(s), _) => Recorded::new(s, ValueSource::UserInput),
        (None, Some(e)) => Recorded::new(e, ValueSource::ExternalData),
        (None, None) => Recorded::new(building_type.typical_stories(), ValueSource::Estimated),
    };
    if stories.value == 0 {
        return Err(ZoneModelError::InvalidStoryCount { stories: 0 });
    }
    let n = stories.value as f64;

    // Candidates from external data, in their own precedence order
    let ext_total = external.and_then(|e| e.total_floor_area_m2);
    let ext_from_footprint = external.and_then(|e| e.footprint_area_m2).map(|a| a * n);
    let external_candidates: Vec<f64> = ext_total.into_iter().chain(ext_from_footprint).collect();

    let total_area = match (params.floor_area_per_story_m2, params.stories, params.total_floor_area_m2) {
        (Some(per_story), Some(user_stories), user_total) => {
            let total = per_story * user_stories as f64;
            let mut rec = Recorded::new(total, ValueSource::UserOverride);
            if let Some(t) = user_total.filter(|t| !same_area(*t, total)) {
                rec = rec.overriding(ValueSource::UserInput, t);
            }
            override_all(rec, &external_candidates)
        }
        (per_story, _, Some(total)) => {
            let mut rec = Recorded::new(total, ValueSource::UserInput);
            // No user story count here; a per-story area loses to the total
            if let Some(from_story) = per_story.map(|a| a * n).filter(|a| !same_area(*a, total)) {
                warn!(
                    total_floor_area_m2 = total,
                    per_story_total_m2 = from_story,
                    stories = stories.value,
                    "user total floor area wins over per-story area without a story count"
                );
                rec = rec.overriding(ValueSource::UserInput, from_story);
            }
            override_all(rec, &external_candidates)
        }
        (Some(per_story), None, None) => override_all(
            Recorded::new(per_story * n, ValueSource::UserInput),
            &external_candidates,
        ),
        (None, _, None) => match external_candidates.first() {
            Some(&area) => {
                check_area("external floor area", area)?;
                Recorded::new(area, ValueSource::ExternalData)
            }
            None => Recorded::new(
                building_type.typical_story_area() * n,
                ValueSource::Estimated,
            ),
        },
    };
    check_area("total floor area", total_area.value)?;

    info!(
        total_area_m2 = total_area.value,
        area_source = %total_area.source,
        stories = stories.value,
        stories_source = %stories.source,
        overridden = ?total_area.overridden,
        "resolved authoritative floor area"
    );

    Ok(AreaPlan {
        stories,
        total_area,
    })
}

fn override_all(mut rec: Recorded<f64>, candidates: &[f64]) -> Recorded<f64> {
    for &c in candidates {
        if !same_area(c, rec.value) {
            rec = rec.overriding(ValueSource::ExternalData, c);
        }
    }
    rec
}

fn same_area(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.)
}

fn check_area(quantity: &'static str, value: f64) -> Result<(), ZoneModelError> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(ZoneModelError::InvalidArea { quantity, value })
    }
}
