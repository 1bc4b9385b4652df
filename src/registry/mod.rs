//! Content-addressed model registry
//!
//! A flat, file-backed ledger mapping (ticker, configuration hash) to an
//! append-only list of saved model artifacts. The index is one JSON document
//! (`index.json`) under the registry root; artifacts are opaque bincode blobs
//! stored under `<root>/<ticker>/<hash>/`.
//!
//! The index is read once at [`ModelRegistry::open`] and rewritten wholesale
//! after every [`ModelRegistry::register`]. There is no locking: two writers
//! racing on the same root can clobber each other's updates. Single-writer
//! use is assumed.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{RegressionError, Result};
use crate::model::{ModelConfig, ModelKind};

const INDEX_FILE: &str = "index.json";

/// Deterministic fingerprint of a model configuration.
///
/// The configuration is canonicalized through a `serde_json::Value` round
/// trip (object keys in BTreeMap order, serde_json's fixed float formatting)
/// and the resulting string is SHA-256 hashed. Two configurations differing
/// in any hyperparameter or input option hash differently.
pub fn config_hash(config: &ModelConfig) -> Result<String> {
    let canonical = serde_json::to_value(config)?.to_string();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Metadata entry describing one trained artifact. Created at save time,
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Generated artifact name: `<hash>_<unix-millis>.model`
    #[serde(rename = "model_name")]
    pub name: String,
    /// Artifact path relative to the registry root
    #[serde(rename = "model_path")]
    pub path: String,
    /// Kind of the saved model
    pub model: ModelKind,
    /// When the artifact was registered
    pub trained_at: DateTime<Utc>,
}

/// The persisted ledger: ticker -> hash -> records, plus the configuration
/// behind each known hash.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryIndex {
    pub models: HashMap<String, HashMap<String, Vec<ModelRecord>>>,
    #[serde(rename = "modelTypes")]
    pub model_types: HashMap<String, ModelConfig>,
}

/// File-backed model registry
pub struct ModelRegistry {
    root: PathBuf,
    index: RegistryIndex,
}

impl ModelRegistry {
    /// Create or open a registry rooted at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root)?;
        }

        let index_path = root.join(INDEX_FILE);
        let index = if index_path.exists() {
            let file = File::open(&index_path)?;
            serde_json::from_reader(BufReader::new(file))
                .map_err(|e| RegressionError::SerializationError(format!("bad index: {}", e)))?
        } else {
            RegistryIndex::default()
        };

        Ok(Self { root, index })
    }

    /// Registry root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rewrite the whole index document. Non-atomic: a concurrent writer can
    /// corrupt the ledger.
    fn save_index(&self) -> Result<()> {
        let file = File::create(self.root.join(INDEX_FILE))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.index)
            .map_err(|e| RegressionError::SerializationError(format!("write index: {}", e)))?;
        Ok(())
    }

    /// Serialize `estimator` under `<ticker>/<hash>/` and append a record for
    /// it. The configuration is stored once per hash in `modelTypes`.
    pub fn register<M: Serialize>(
        &mut self,
        ticker: &str,
        config: &ModelConfig,
        estimator: &M,
    ) -> Result<ModelRecord> {
        let hash = config_hash(config)?;

        let rel_dir = format!("{}/{}", ticker, hash);
        fs::create_dir_all(self.root.join(&rel_dir))?;

        let trained_at = Utc::now();
        let name = format!("{}_{}.model", hash, trained_at.timestamp_millis());
        let rel_path = format!("{}/{}", rel_dir, name);

        let bytes = bincode::serialize(estimator)?;
        fs::write(self.root.join(&rel_path), bytes)?;

        let record = ModelRecord {
            name,
            path: rel_path,
            model: config.model,
            trained_at,
        };

        self.index
            .models
            .entry(ticker.to_string())
            .or_default()
            .entry(hash.clone())
            .or_default()
            .push(record.clone());

        self.index
            .model_types
            .entry(hash.clone())
            .or_insert_with(|| config.clone());

        self.save_index()?;

        info!(ticker, hash = %hash, artifact = %record.name, "registered model");
        Ok(record)
    }

    /// All records for a (ticker, hash) pair, oldest first
    pub fn records(&self, ticker: &str, hash: &str) -> Option<&[ModelRecord]> {
        self.index
            .models
            .get(ticker)
            .and_then(|by_hash| by_hash.get(hash))
            .map(|records| records.as_slice())
    }

    /// Most recent record for a (ticker, hash) pair
    pub fn latest_record(&self, ticker: &str, hash: &str) -> Option<&ModelRecord> {
        self.records(ticker, hash).and_then(|records| records.last())
    }

    /// Absolute path of the most recent artifact for a (ticker, hash) pair,
    /// or `None` if the ticker or hash is unknown
    pub fn latest_path(&self, ticker: &str, hash: &str) -> Option<PathBuf> {
        self.latest_record(ticker, hash)
            .map(|record| self.root.join(&record.path))
    }

    /// Configuration behind a known hash
    pub fn config_for(&self, hash: &str) -> Option<&ModelConfig> {
        self.index.model_types.get(hash)
    }

    /// Configuration hashes known for a ticker
    pub fn hashes(&self, ticker: &str) -> Option<Vec<String>> {
        self.index
            .models
            .get(ticker)
            .map(|by_hash| by_hash.keys().cloned().collect())
    }

    /// Tickers with at least one saved model
    pub fn tickers(&self) -> Vec<String> {
        self.index.models.keys().cloned().collect()
    }

    /// Deserialize the artifact behind a record
    pub fn load_artifact<M: DeserializeOwned>(&self, record: &ModelRecord) -> Result<M> {
        let bytes = fs::read(self.root.join(&record.path))?;
        Ok(bincode::deserialize(&bytes)?)
    }
}
