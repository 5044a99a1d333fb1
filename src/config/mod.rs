//! Configuration for the replay engine and its transport layer.
//!
//! Configuration is read from a JSON properties file, mirroring the keys the
//! front-end tooling already uses (`config/replay.json`). Every field has a
//! default so a partial file is enough.

use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// SAREF relation linking an observation to the sensor that made it.
pub const DEFAULT_MADE_BY_RELATION: &str = "https://saref.etsi.org/core/measurementMadeBy";

/// SAREF attribute holding an observation's timestamp.
pub const DEFAULT_TIMESTAMP_ATTRIBUTE: &str = "https://saref.etsi.org/core/hasTimestamp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Replay engine and transport configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplayConfig {
    /// Port the HTTP transport listens on.
    pub port: u16,
    /// Local folder holding the replayable datasets.
    pub dataset_folder: String,
    /// URL of the destination LDES in LDP collection.
    pub destination_url: String,
    /// Relation whose subjects are the observations of the dataset.
    pub made_by_relation: String,
    /// Attribute holding each observation's timestamp.
    pub timestamp_attribute: String,
    /// Ordering attribute announced to the sink (tree path). Defaults to the
    /// timestamp attribute.
    pub tree_path: String,
    /// Upper bound on observations fetched per drain iteration.
    pub batch_size: usize,
    /// Number of observations shown at each end of the sequence preview.
    pub chunk_size: usize,
    /// Bucket size hint handed to the sink on every write.
    pub bucket_size: usize,
    /// Target serialized size, in bytes, of one sink resource.
    pub target_resource_size: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            dataset_folder: "./datasets".to_string(),
            destination_url: "http://localhost:3000/replay/".to_string(),
            made_by_relation: DEFAULT_MADE_BY_RELATION.to_string(),
            timestamp_attribute: DEFAULT_TIMESTAMP_ATTRIBUTE.to_string(),
            tree_path: DEFAULT_TIMESTAMP_ATTRIBUTE.to_string(),
            batch_size: 1000,
            chunk_size: 10,
            bucket_size: 100,
            target_resource_size: 2048,
        }
    }
}

impl ReplayConfig {
    /// Load configuration from a JSON properties file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// List the replayable RDF files in a dataset folder, sorted by name.
///
/// Only files with a recognized RDF extension are returned; everything else
/// in the folder (checksums, readme files) is skipped.
pub fn list_datasets(folder: &str) -> Result<Vec<String>, ConfigError> {
    let rdf_file = Regex::new(r"(?i)\.(nt|ntriples|nq|nquads|ttl|turtle|trig|rdf|xml|owl|n3)$")
        .expect("static pattern");
    let mut datasets = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if rdf_file.is_match(&name) {
            datasets.push(name);
        }
    }
    datasets.sort();
    Ok(datasets)
}
