pub mod building;
pub mod extrude;
pub mod footprint;
pub mod point;
pub mod polygon;
pub mod surface;
pub mod vector;
pub mod zone;

/// Geometric precision
const EPS: f64 = 1e-13;

/// Vertices closer than this (in meters) are treated as coincident.
pub const COINCIDENT_TOLERANCE: f64 = 0.001;

/// Surfaces with an area not above this (in m^2) are rejected.
pub const MIN_SURFACE_AREA: f64 = 0.01;
