//! Error taxonomy of the generator.
//!
//! Surface-level geometry problems never reach these types: they are dropped with a
//! warning where they happen. Everything here aborts the generation of one building.

use std::fmt;
use thiserror::Error;

/// Polygon degeneracy. Fatal only when it concerns the footprint itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon has {count} distinct vertices, at least 3 are required")]
    TooFewVertices { count: usize },
    #[error("polygon vertex {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("polygon area {area:.6} m2 is not above the minimum of {min_area} m2")]
    AreaTooSmall { area: f64, min_area: f64 },
    #[error("extrusion height must be positive and finite, got {height}")]
    InvalidHeight { height: f64 },
    #[error("no valid footprint: {reason}")]
    NoValidFootprint { reason: String },
}

/// The area/usage partition cannot be satisfied with the given input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneModelError {
    #[error("story count must be at least 1, got {stories}")]
    InvalidStoryCount { stories: u32 },
    #[error("{quantity} must be positive and finite, got {value}")]
    InvalidArea { quantity: &'static str, value: f64 },
    #[error("story {story}: zone areas sum to {actual:.3} m2 instead of {expected:.3} m2")]
    AreaNotConserved { story: u32, expected: f64, actual: f64 },
    #[error("template '{template}' produced no zones for story {story}")]
    EmptyPartition { template: String, story: u32 },
    #[error("footprint for story {story} is unusable: {source}")]
    Footprint {
        story: u32,
        #[source]
        source: GeometryError,
    },
}

/// The HVAC graph cannot be constructed for the requested family and zone set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("no zones to serve with system family {family}")]
    NoZones { family: String },
    #[error("system family {family} is disabled in the generator settings")]
    FamilyDisabled { family: String },
    #[error("air loop {air_loop}: wiring failed: {source}")]
    Wiring {
        air_loop: String,
        #[source]
        source: ValidationError,
    },
    #[error("air loop {air_loop}: cannot move from stage {from} to {to}")]
    InvalidTransition {
        air_loop: String,
        from: String,
        to: String,
    },
}

/// A specific, identified invariant violation.
///
/// These indicate a generator defect (or a misconfiguration of the settings), never a
/// problem with the user's building description.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("node {node} is already allocated by {existing_owner}, {owner} tried to allocate it again")]
    NodeNameCollision {
        node: String,
        existing_owner: String,
        owner: String,
    },
    #[error("node {node}: {first} is incompatible with {second} ({rule})")]
    IncompatibleNodeRoles {
        node: String,
        first: String,
        second: String,
        rule: &'static str,
    },
    #[error("node {node} is dangling: {reason}")]
    DanglingNode { node: String, reason: String },
    #[error("air loop {air_loop}: zone {zone} is not reachable from the supply inlet")]
    UnreachableZone { air_loop: String, zone: String },
    #[error("{scope}: component {component} is part of a cycle")]
    Cycle { scope: String, component: String },
    #[error("zone {zone}: surface {surface} is degenerate: {source}")]
    DegenerateSurface {
        zone: String,
        surface: String,
        #[source]
        source: GeometryError,
    },
    #[error("{object}: field '{field}' has value '{value}', expected one of {allowed:?}")]
    InvalidEnumLiteral {
        object: String,
        field: String,
        value: String,
        allowed: &'static [&'static str],
    },
    #[error("{object}: field '{field}' has invalid value '{value}': {reason}")]
    InvalidFieldValue {
        object: String,
        field: String,
        value: String,
        reason: String,
    },
    #[error("{class} has {count} fields, schema {version} accepts {min}..={max}")]
    FieldCount {
        class: String,
        version: String,
        count: usize,
        min: usize,
        max: usize,
    },
    #[error("{target}: setpoint managers {managers:?} all write {variable}")]
    ConflictingSetpoints {
        target: String,
        variable: String,
        managers: Vec<String>,
    },
    #[error("{object}: field '{field}' references unknown {kind} '{target}'")]
    MissingReference {
        object: String,
        field: String,
        kind: &'static str,
        target: String,
    },
    #[error("duplicate {class} name '{name}'")]
    DuplicateObjectName { class: String, name: String },
    #[error("schema version '{version}' is not supported (supported: {supported:?})")]
    UnsupportedSchemaVersion {
        version: String,
        supported: &'static [&'static str],
    },
}

/// All violations found by one validation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, err: ValidationError) {
        self.errors.push(err);
    }

    /// Runs a check and records its failure, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.errors.push(e);
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())?;
        for e in &self.errors {
            write!(f, "\n  - {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

impl From<ValidationError> for ValidationReport {
    fn from(err: ValidationError) -> Self {
        Self { errors: vec![err] }
    }
}

/// Raised by the geocoding collaborator. Never papered over with a default location.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationResolutionError {
    #[error("no address or explicit coordinates were given")]
    MissingLocation,
    #[error("no real-world coordinates found for '{query}'")]
    NotFound { query: String },
    #[error("coordinates out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

/// Umbrella error returned by the orchestrator.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("location resolution failed: {0}")]
    Location(#[from] LocationResolutionError),
    #[error("geometry generation failed: {0}")]
    Geometry(#[from] GeometryError),
    #[error("zone model failed: {0}")]
    ZoneModel(#[from] ZoneModelError),
    #[error("HVAC topology failed: {0}")]
    Topology(#[from] TopologyError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationReport),
    #[error("invalid settings: {0}")]
    Settings(String),
}

impl GenerationError {
    /// True when the caller's input was insufficient or contradictory, as opposed to an
    /// internal invariant violation that should be reported as a generator defect.
    pub fn is_user_input_error(&self) -> bool {
        matches!(
            self,
            Self::Location(_) | Self::ZoneModel(_) | Self::Geometry(_)
        )
    }
}

impl From<ValidationError> for GenerationError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display_lists_errors() {
        let mut report = ValidationReport::default();
        report.push(ValidationError::DuplicateObjectName {
            class: "Zone".to_string(),
            name: "Z1".to_string(),
        });
        report.check(Ok(()));
        let text = report.to_string();
        assert!(text.starts_with("1 validation error(s)"));
        assert!(text.contains("duplicate Zone name 'Z1'"));
    }

    #[test]
    fn test_user_input_classification() {
        let loc: GenerationError = LocationResolutionError::MissingLocation.into();
        assert!(loc.is_user_input_error());
        let val: GenerationError = ValidationError::DanglingNode {
            node: "N".to_string(),
            reason: "no consumer".to_string(),
        }
        .into();
        assert!(!val.is_user_input_error());
        assert!(val.to_string().starts_with("validation failed"));
    }
}
