//! Persistence of trained model artifacts
//!
//! Each SKU owns one directory under the models root holding the artifact
//! triple: `model.json`, optional `scaler.json`, and `metadata.json`. The
//! triple is a single logical unit: a directory missing the model or the
//! metadata file is treated as "no model", never as a degraded one.
//!
//! `registry.json` at the root is a denormalized index of trained models
//! (the platform's database row equivalent), kept in step on every save and
//! delete.
//!
//! Nothing outside this module writes under the models root. Training
//! overwriting a model while a forecast is reading it is an accepted race;
//! see DESIGN.md.

use crate::error::{ForecastError, Result};
use crate::metadata::ModelMetadata;
use crate::regressor::Regressor;
use crate::scaler::StandardScaler;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const MODEL_FILE: &str = "model.json";
const SCALER_FILE: &str = "scaler.json";
const METADATA_FILE: &str = "metadata.json";
const REGISTRY_FILE: &str = "registry.json";

/// A fully loaded model artifact triple
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub regressor: Regressor,
    pub scaler: Option<StandardScaler>,
    pub metadata: ModelMetadata,
}

/// Registry index entry for one trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub sku: String,
    pub model_type: String,
    pub version: String,
    pub path: PathBuf,
    pub metrics: BTreeMap<String, f64>,
    pub trained_at: DateTime<Utc>,
}

/// Filesystem store for per-SKU model artifacts
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn sku_dir(&self, sku: &str) -> PathBuf {
        self.root.join(sanitize_sku(sku))
    }

    /// Persist the artifact triple and upsert the registry entry.
    ///
    /// Metadata is written last: until it lands, the directory reads as "no
    /// model" rather than as a half-written one.
    pub fn save(
        &self,
        sku: &str,
        regressor: &Regressor,
        scaler: Option<&StandardScaler>,
        metadata: &ModelMetadata,
    ) -> Result<()> {
        validate_shapes(sku, regressor, scaler, metadata)?;

        let dir = self.sku_dir(sku);
        fs::create_dir_all(&dir)?;

        fs::write(dir.join(MODEL_FILE), serde_json::to_string_pretty(regressor)?)?;

        let scaler_path = dir.join(SCALER_FILE);
        match scaler {
            Some(scaler) => {
                fs::write(&scaler_path, serde_json::to_string_pretty(scaler)?)?;
            }
            // Drop a stale scaler left over from a previous training run
            None if scaler_path.exists() => {
                fs::remove_file(&scaler_path)?;
            }
            None => {}
        }

        fs::write(
            dir.join(METADATA_FILE),
            serde_json::to_string_pretty(metadata)?,
        )?;

        let mut registry = self.read_registry()?;
        registry.insert(
            sku.to_string(),
            RegistryEntry {
                sku: sku.to_string(),
                model_type: metadata.model_type.clone(),
                version: metadata.version.clone(),
                path: dir.clone(),
                metrics: metadata.metrics.clone(),
                trained_at: metadata.trained_at,
            },
        );
        self.write_registry(&registry)?;

        info!(
            "Saved {} model for {} ({} features, {} samples)",
            metadata.model_type,
            sku,
            metadata.features.len(),
            metadata.training_samples
        );
        Ok(())
    }

    /// Load the artifact triple for a SKU.
    ///
    /// An incomplete triple is [`ForecastError::ModelNotFound`]; a present
    /// but unparseable file is [`ForecastError::CorruptArtifact`].
    pub fn load(&self, sku: &str) -> Result<LoadedModel> {
        let dir = self.sku_dir(sku);
        let model_path = dir.join(MODEL_FILE);
        let metadata_path = dir.join(METADATA_FILE);

        if !dir.is_dir() || !model_path.is_file() || !metadata_path.is_file() {
            return Err(ForecastError::ModelNotFound(sku.to_string()));
        }

        let regressor: Regressor = read_artifact(sku, &model_path)?;
        let metadata: ModelMetadata = read_artifact(sku, &metadata_path)?;

        let scaler_path = dir.join(SCALER_FILE);
        let scaler: Option<StandardScaler> = if scaler_path.is_file() {
            Some(read_artifact(sku, &scaler_path)?)
        } else {
            None
        };

        validate_shapes(sku, &regressor, scaler.as_ref(), &metadata)?;

        debug!("Loaded {} model for {}", metadata.model_type, sku);
        Ok(LoadedModel {
            regressor,
            scaler,
            metadata,
        })
    }

    /// Whether a complete artifact triple exists, without deserializing
    pub fn exists(&self, sku: &str) -> bool {
        let dir = self.sku_dir(sku);
        dir.join(MODEL_FILE).is_file() && dir.join(METADATA_FILE).is_file()
    }

    /// SKUs with a complete artifact triple on disk, sorted
    pub fn list_trained(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut skus = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if self.exists(&name) {
                skus.push(name);
            }
        }
        skus.sort();
        Ok(skus)
    }

    /// Remove all artifacts and the registry entry for a SKU.
    ///
    /// Returns whether anything was removed.
    pub fn delete(&self, sku: &str) -> Result<bool> {
        let dir = self.sku_dir(sku);
        let existed = dir.is_dir();
        if existed {
            fs::remove_dir_all(&dir)?;
        }

        let mut registry = self.read_registry()?;
        let had_entry = registry.remove(sku).is_some();
        if had_entry {
            self.write_registry(&registry)?;
        }

        if existed || had_entry {
            info!("Deleted model artifacts for {}", sku);
        }
        Ok(existed || had_entry)
    }

    /// Registry entry for a SKU, if one was recorded
    pub fn registry_entry(&self, sku: &str) -> Result<Option<RegistryEntry>> {
        Ok(self.read_registry()?.remove(sku))
    }

    fn read_registry(&self) -> Result<BTreeMap<String, RegistryEntry>> {
        let path = self.root.join(REGISTRY_FILE);
        if !path.is_file() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|err| ForecastError::CorruptArtifact {
            sku: "<registry>".to_string(),
            path,
            detail: err.to_string(),
        })
    }

    fn write_registry(&self, registry: &BTreeMap<String, RegistryEntry>) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(
            self.root.join(REGISTRY_FILE),
            serde_json::to_string_pretty(registry)?,
        )?;
        Ok(())
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(sku: &str, path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|err| ForecastError::CorruptArtifact {
        sku: sku.to_string(),
        path: path.to_path_buf(),
        detail: err.to_string(),
    })
}

/// The metadata schema, the regressor input size and the scaler width must
/// all agree; mismatches fail here, at save/load time, not at predict time.
fn validate_shapes(
    sku: &str,
    regressor: &Regressor,
    scaler: Option<&StandardScaler>,
    metadata: &ModelMetadata,
) -> Result<()> {
    if regressor.feature_count() != metadata.features.len() {
        return Err(ForecastError::SchemaMismatch {
            sku: sku.to_string(),
            detail: format!(
                "regressor expects {} features, metadata records {}",
                regressor.feature_count(),
                metadata.features.len()
            ),
        });
    }

    if let Some(scaler) = scaler {
        if scaler.len() != metadata.features.len() {
            return Err(ForecastError::SchemaMismatch {
                sku: sku.to_string(),
                detail: format!(
                    "scaler covers {} features, metadata records {}",
                    scaler.len(),
                    metadata.features.len()
                ),
            });
        }
    }

    Ok(())
}

/// Keep SKU-derived directory names path-safe
fn sanitize_sku(sku: &str) -> String {
    sku.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sku() {
        assert_eq!(sanitize_sku("SKU-1001"), "SKU-1001");
        assert_eq!(sanitize_sku("a/b\\c:d"), "a_b_c_d");
    }
}
