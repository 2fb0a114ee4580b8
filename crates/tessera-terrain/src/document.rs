//! Generation-settings document: biome generator plus filter chain as JSON.
//!
//! ```json
//! { "biomeGenerator": { "seed": 0, "biomes": { ... }, ... },
//!   "filters": [ { "name": "Terrain Noise", ... } ] }
//! ```
//!
//! Saving always writes the complete state. Loading is tolerant: missing keys
//! keep their current value and unknown entries are skipped.

use std::path::Path;

use serde_json::{Map, Value};

use crate::filter::FilterChain;
use crate::generator::BiomeMapGenerator;

const BIOME_GENERATOR_KEY: &str = "biomeGenerator";
const FILTERS_KEY: &str = "filters";

/// Errors that can occur reading or writing a settings document.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write settings {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("settings document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings document must be a JSON object")]
    NotAnObject,
}

/// Build the full document for `generator` and `chain`.
pub fn to_document(generator: &BiomeMapGenerator, chain: &FilterChain) -> Value {
    let mut doc = Map::new();
    doc.insert(BIOME_GENERATOR_KEY.into(), generator.to_json());
    doc.insert(FILTERS_KEY.into(), chain.to_json());
    Value::Object(doc)
}

/// Apply a parsed document. A missing `filters` key leaves the chain as is.
pub fn apply_document(
    doc: &Value,
    generator: &mut BiomeMapGenerator,
    chain: &mut FilterChain,
) -> Result<(), SettingsError> {
    if !doc.is_object() {
        return Err(SettingsError::NotAnObject);
    }
    if let Some(data) = doc.get(BIOME_GENERATOR_KEY) {
        generator.load_json(data);
    }
    if let Some(filters) = doc.get(FILTERS_KEY) {
        chain.load_json(filters);
    }
    Ok(())
}

/// Write the document to `path` as pretty JSON, creating parent directories.
pub fn save_settings(
    path: &Path,
    generator: &BiomeMapGenerator,
    chain: &FilterChain,
) -> Result<(), SettingsError> {
    let write_err = |source| SettingsError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let text = serde_json::to_string_pretty(&to_document(generator, chain))?;
    std::fs::write(path, text).map_err(write_err)?;
    tracing::info!(path = %path.display(), filters = chain.len(), "saved generation settings");
    Ok(())
}

/// Read `path` and apply it. The biome map is not regenerated here.
pub fn load_settings(
    path: &Path,
    generator: &mut BiomeMapGenerator,
    chain: &mut FilterChain,
) -> Result<(), SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let doc: Value = serde_json::from_str(&text)?;
    apply_document(&doc, generator, chain)?;
    tracing::info!(path = %path.display(), filters = chain.len(), "loaded generation settings");
    Ok(())
}
