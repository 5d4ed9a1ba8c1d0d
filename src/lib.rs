pub mod collab;
pub mod config;
pub mod envelope;
pub mod error;
pub mod generate;
pub mod geom;
pub mod hvac;
pub mod idf;
pub mod io;
pub mod loads;
pub mod manifest;
pub mod model;
pub mod results;
pub mod retrofit;
pub mod schedule;
mod sortbyname;
mod uid;
pub mod validate;
pub mod zoning;

// Prelude
pub use geom::point::Point;
pub use geom::polygon::Polygon;
pub use geom::vector::Vector;
pub use sortbyname::{HasName, SortByName};
pub use uid::UID;
// Pipeline entry points
pub use config::GeneratorSettings;
pub use error::GenerationError;
pub use generate::{GenerationOutput, GenerationRequest, generate, generate_batch};
