use anyhow::{Context, Result};
use building_idf::collab::{
    ExternalBuildingData, Geocoder, KeywordExtractor, LocationRecord, ParameterExtractor, ParameterRecord,
    StaticCityTable,
};
use building_idf::config::load_settings;
use building_idf::hvac::SystemFamily;
use building_idf::io::{manifest_path_for, write_idf, write_manifest};
use building_idf::zoning::BuildingType;
use building_idf::{GenerationError, GenerationRequest, GeneratorSettings, generate};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const EXIT_OTHER: u8 = 1;
const EXIT_USER_INPUT: u8 = 2;
const EXIT_INTERNAL: u8 = 3;

#[derive(Parser)]
#[command(name = "building_idf")]
#[command(about = "Generates EnergyPlus input files from coarse building descriptions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generates an input file for one building
    Generate(GenerateArgs),
    /// Prints the default generator settings as JSON
    Settings,
}

#[derive(Args)]
struct GenerateArgs {
    /// Free text naming the building and where it is, e.g. "10-story office at 233 S
    /// Wacker Dr, Chicago". Read both ways: geocoded as the address unless --address is
    /// given, and mined for parameters unless --description is given
    input: Option<String>,

    /// Street address, geocoded with the built-in city table
    #[arg(long)]
    address: Option<String>,

    /// Free-text description, e.g. "10-story office, 1500 m2 per floor"
    #[arg(long)]
    description: Option<String>,

    /// Building name written into the file
    #[arg(long, default_value = "Building")]
    name: String,

    #[arg(long)]
    building_type: Option<BuildingType>,

    #[arg(long)]
    stories: Option<u32>,

    /// Floor area of one story (m2)
    #[arg(long)]
    floor_area_per_story: Option<f64>,

    /// Total floor area (m2)
    #[arg(long)]
    total_floor_area: Option<f64>,

    /// vav, rtu, ptac or ideal_loads
    #[arg(long)]
    hvac: Option<SystemFamily>,

    /// Construction year, selects the envelope
    #[arg(long)]
    construction_year: Option<i32>,

    /// Special feature, e.g. "economizer"; repeatable
    #[arg(long = "feature")]
    features: Vec<String>,

    /// Footprint outline as x,y pairs (m)
    #[arg(long, value_parser = parse_xy, num_args = 3..)]
    footprint: Option<Vec<(f64, f64)>>,

    #[arg(long, requires = "longitude")]
    latitude: Option<f64>,

    #[arg(long, requires = "latitude")]
    longitude: Option<f64>,

    /// Site elevation (m)
    #[arg(long, default_value_t = 0.)]
    elevation: f64,

    /// Hours from UTC, derived from the longitude when absent
    #[arg(long)]
    timezone: Option<f64>,

    /// Total floor area reported by an external source (m2)
    #[arg(long)]
    external_area: Option<f64>,

    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file; the input file goes to stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Manifest file; defaults to <output>.manifest.json when --output is given
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

fn parse_xy(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{s}'"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("invalid coordinate '{v}': {e}"));
    Ok((parse(x)?, parse(y)?))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Settings => print_settings(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn exit_code(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<GenerationError>() {
        Some(g) if g.is_user_input_error() => EXIT_USER_INPUT,
        Some(_) => EXIT_INTERNAL,
        None => EXIT_OTHER,
    }
}

fn print_settings() -> Result<()> {
    let json = serde_json::to_string_pretty(&GeneratorSettings::default())?;
    println!("{json}");
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => GeneratorSettings::default(),
    };

    let (address, description) = address_and_description(&args);

    let mut params = ParameterRecord {
        address: address.clone(),
        building_type: args.building_type,
        stories: args.stories,
        floor_area_per_story_m2: args.floor_area_per_story,
        total_floor_area_m2: args.total_floor_area,
        hvac_family: args.hvac,
        construction_era: args.construction_year,
        special_features: args.features.iter().cloned().collect(),
    };
    if let Some(text) = &description {
        params.fill_missing(KeywordExtractor.extract(text));
    }

    let location = resolve_location(&args, address.as_deref())?;
    let request = GenerationRequest {
        name: args.name.clone(),
        params,
        location,
        external: args.external_area.map(|area| ExternalBuildingData {
            source: "command line".to_string(),
            total_floor_area_m2: Some(area),
            ..Default::default()
        }),
        footprint: args.footprint.clone(),
    };

    let out = generate(&request, &settings)?;

    match &args.output {
        Some(path) => {
            write_idf(path, &out.idf)?;
            info!(path = %path.display(), "wrote input file");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(out.idf.as_bytes())
                .context("Failed to write input file to stdout")?;
        }
    }
    let manifest_path = args
        .manifest
        .clone()
        .or_else(|| args.output.as_deref().map(manifest_path_for));
    if let Some(path) = manifest_path {
        write_manifest(&path, &out.manifest)?;
        info!(path = %path.display(), "wrote manifest");
    }
    Ok(())
}

/// The positional input stands in for whichever of --address and --description is
/// missing.
fn address_and_description(args: &GenerateArgs) -> (Option<String>, Option<String>) {
    let address = args.address.clone().or_else(|| args.input.clone());
    let description = args.description.clone().or_else(|| args.input.clone());
    (address, description)
}

/// Explicit coordinates win over geocoding. With neither, the location stays
/// missing and generation fails.
fn resolve_location(args: &GenerateArgs, address: Option<&str>) -> Result<Option<LocationRecord>, GenerationError> {
    if let (Some(lat), Some(lon)) = (args.latitude, args.longitude) {
        let timezone = args.timezone.unwrap_or((lon / 15.).round());
        let name = address.unwrap_or("Site");
        return Ok(Some(LocationRecord::new(name, lat, lon, args.elevation, timezone)));
    }
    match address {
        Some(a) => Ok(Some(StaticCityTable::default().resolve(a)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(argv: &[&str]) -> Option<GenerateArgs> {
        let cli = Cli::try_parse_from(argv).ok()?;
        match cli.command {
            Commands::Generate(args) => Some(args),
            Commands::Settings => None,
        }
    }

    #[test]
    fn test_input_fills_address_and_description() {
        let text = "10-story office at 233 S Wacker Dr, Chicago";
        let args = generate_args(&["building_idf", "generate", text]);
        let (address, description) = args.as_ref().map(address_and_description).unwrap_or_default();
        assert_eq!(address.as_deref(), Some(text));
        assert_eq!(description.as_deref(), Some(text));

        let args = generate_args(&["building_idf", "generate", text, "--address", "Denver"]);
        let (address, description) = args.as_ref().map(address_and_description).unwrap_or_default();
        assert_eq!(address.as_deref(), Some("Denver"));
        assert_eq!(description.as_deref(), Some(text));
    }
}
