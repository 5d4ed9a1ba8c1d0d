//! Writing generated artifacts to disk.
//!
//! The input file is plain text; the manifest is pretty-printed JSON next to it.

use crate::manifest::GenerationManifest;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the rendered input file.
pub fn write_idf(path: &Path, idf: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(idf.as_bytes())
        .with_context(|| format!("Failed to write input file to: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush: {}", path.display()))?;
    Ok(())
}

/// Writes the manifest as JSON.
pub fn write_manifest(path: &Path, manifest: &GenerationManifest) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, manifest)
        .with_context(|| format!("Failed to serialize manifest to: {}", path.display()))?;

    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<GenerationManifest> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let manifest: GenerationManifest = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse manifest from: {}", path.display()))?;

    Ok(manifest)
}

/// Default manifest path for an input file: `model.idf` -> `model.manifest.json`.
pub fn manifest_path_for(idf_path: &Path) -> PathBuf {
    idf_path.with_extension("manifest.json")
}
