//! Abstract architecture descriptions for incremental growth.
//!
//! The ensemble core never interprets layers. It only reads names, splices
//! new layers into the sequence and renames them, so a layer is kept as an
//! opaque `{ class_name, config }` record with the name under `config.name`.

pub mod injection;
pub mod weights;

pub use injection::{IncrementalGrowth, InjectionIndex, InjectionPolicy};
pub use weights::{LayerWeights, WarmStart, WeightSnapshot};

use crate::core::error::{Result, ToupeeError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

/// One layer of an architecture description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Layer type, e.g. `Dense`
    pub class_name: String,
    /// Nested layer configuration
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl LayerSpec {
    /// Create a layer with the given type and name.
    pub fn new<C: Into<String>, N: Into<String>>(class_name: C, name: N) -> Self {
        let mut config = Map::new();
        config.insert("name".to_string(), Value::String(name.into()));
        LayerSpec {
            class_name: class_name.into(),
            config,
        }
    }

    /// Add a configuration entry.
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Layer name, if it has one
    pub fn name(&self) -> Option<&str> {
        self.config.get("name").and_then(Value::as_str)
    }

    /// Replace the layer name.
    pub fn set_name<N: Into<String>>(&mut self, name: N) {
        self.config.insert("name".to_string(), Value::String(name.into()));
    }
}

/// Ordered sequence of layer specifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelConfig {
    layers: Vec<LayerSpec>,
}

impl ModelConfig {
    /// Create a config from layers.
    pub fn new(layers: Vec<LayerSpec>) -> Self {
        ModelConfig { layers }
    }

    /// Load a config from a `.json` or `.toml` file.
    ///
    /// TOML files hold the layers under a top-level `layers` array.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ToupeeError::config(format!(
                "Failed to read architecture file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => {
                #[derive(Deserialize)]
                struct TomlLayers {
                    layers: Vec<LayerSpec>,
                }
                let parsed: TomlLayers = toml::from_str(&content)?;
                ModelConfig::new(parsed.layers)
            }
            _ => {
                return Err(ToupeeError::config(
                    "Unsupported architecture file format. Use .json or .toml",
                ))
            }
        };

        log::debug!("Loaded {} layers from {}", config.len(), path.display());
        Ok(config)
    }

    /// Layers in order
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the config holds no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Names of all named layers, in order.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().filter_map(LayerSpec::name)
    }

    /// Insert `new_layers` before position `index`.
    pub fn splice(&mut self, index: usize, new_layers: Vec<LayerSpec>) -> Result<()> {
        if index > self.layers.len() {
            return Err(ToupeeError::config(format!(
                "injection index {} falls outside a config of {} layers",
                index,
                self.layers.len()
            )));
        }
        self.layers.splice(index..index, new_layers);
        Ok(())
    }

    /// Fail if two layers share a name.
    pub fn ensure_unique_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in self.layer_names() {
            if !seen.insert(name) {
                return Err(ToupeeError::config(format!(
                    "layer name '{}' appears more than once",
                    name
                )));
            }
        }
        Ok(())
    }
}
