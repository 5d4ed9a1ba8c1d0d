//! Audit trail of where every derived quantity came from.

use crate::UID;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of a value, in decreasing order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// User input that explicitly overrides any external or estimated value
    /// (area per story times story count).
    UserOverride,
    UserInput,
    ExternalData,
    Estimated,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UserOverride => "user_override",
            Self::UserInput => "user_input",
            Self::ExternalData => "external_data",
            Self::Estimated => "estimated",
        })
    }
}

/// A candidate value that lost to a higher-precedence source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overridden {
    pub source: ValueSource,
    pub value: String,
}

/// A value together with the source that won and the candidates it overrode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recorded<T> {
    pub value: T,
    pub source: ValueSource,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub overridden: Vec<Overridden>,
}

impl<T> Recorded<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self {
            value,
            source,
            overridden: Vec::new(),
        }
    }

    pub fn overriding(mut self, source: ValueSource, value: impl ToString) -> Self {
        self.overridden.push(Overridden {
            source,
            value: value.to_string(),
        });
        self
    }
}

/// Manifest written next to the generated file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationManifest {
    pub run_id: UID,
    pub schema_version: String,
    pub building_name: String,
    pub location: String,
    pub building_type: Recorded<String>,
    pub stories: Recorded<u32>,
    pub total_floor_area_m2: Recorded<f64>,
    pub floor_area_per_story_m2: f64,
    /// Shortcut for `total_floor_area_m2.source`.
    pub area_source: ValueSource,
    pub hvac_family: Recorded<String>,
    pub construction_era: Recorded<String>,
    pub zone_count: usize,
    pub air_loop_count: usize,
    pub dropped_surfaces: Vec<String>,
    pub corrections: Vec<String>,
    pub ignored_features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_source_serializes_snake_case() -> anyhow::Result<()> {
        let json = serde_json::to_string(&ValueSource::UserOverride)?;
        assert_eq!(json, "\"user_override\"");
        assert_eq!(ValueSource::ExternalData.to_string(), "external_data");
        Ok(())
    }

    #[test]
    fn test_precedence_order() {
        assert!(ValueSource::UserOverride < ValueSource::UserInput);
        assert!(ValueSource::UserInput < ValueSource::ExternalData);
        assert!(ValueSource::ExternalData < ValueSource::Estimated);
    }

    #[test]
    fn test_recorded_overriding() {
        let r = Recorded::new(15000., ValueSource::UserOverride)
            .overriding(ValueSource::ExternalData, 14090.2);
        assert_eq!(r.overridden.len(), 1);
        assert_eq!(r.overridden[0].value, "14090.2");
    }
}
