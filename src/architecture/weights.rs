//! Parameter snapshots and warm starts across architecture changes.
//!
//! A [`WeightSnapshot`] lists a trained member's parameters layer by layer.
//! When the architecture grows, [`WarmStart::carry_forward`] lines the
//! snapshot up with the new layer sequence: layers that survive by name keep
//! their tensors, injected layers get `None` and are initialized fresh by the
//! trainer.

use super::ModelConfig;
use crate::core::types::Feature;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// Trained tensors of one named layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    /// Layer name, matching `LayerSpec::name`
    pub name: String,
    /// Parameter tensors in the layer's own order (kernel, bias, ...)
    pub tensors: Vec<ArrayD<Feature>>,
}

impl LayerWeights {
    /// Create layer weights.
    pub fn new<N: Into<String>>(name: N, tensors: Vec<ArrayD<Feature>>) -> Self {
        LayerWeights {
            name: name.into(),
            tensors,
        }
    }

    /// Whether the tensors have exactly the given shapes.
    ///
    /// Trainers call this before loading carried tensors; a layer whose
    /// input width changed because of an injection must be reinitialized.
    pub fn matches_shapes(&self, shapes: &[&[usize]]) -> bool {
        self.tensors.len() == shapes.len()
            && self
                .tensors
                .iter()
                .zip(shapes)
                .all(|(tensor, shape)| tensor.shape() == *shape)
    }

    /// Total number of scalar parameters
    pub fn num_parameters(&self) -> usize {
        self.tensors.iter().map(|t| t.len()).sum()
    }
}

/// Parameters of a whole member, in layer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightSnapshot {
    layers: Vec<LayerWeights>,
}

impl WeightSnapshot {
    /// Create a snapshot from per-layer weights.
    pub fn new(layers: Vec<LayerWeights>) -> Self {
        WeightSnapshot { layers }
    }

    /// Layers in order
    pub fn layers(&self) -> &[LayerWeights] {
        &self.layers
    }

    /// Weights of the named layer
    pub fn get(&self, name: &str) -> Option<&LayerWeights> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Total number of scalar parameters
    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(LayerWeights::num_parameters).sum()
    }
}

/// Initial parameters for each layer of an architecture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarmStart {
    layers: Vec<Option<LayerWeights>>,
}

impl WarmStart {
    /// Align `snapshot` with `config`, one slot per layer of `config`.
    pub fn carry_forward(snapshot: &WeightSnapshot, config: &ModelConfig) -> Self {
        let layers = config
            .layers()
            .iter()
            .map(|spec| spec.name().and_then(|name| snapshot.get(name)).cloned())
            .collect();
        WarmStart { layers }
    }

    /// One slot per layer; `None` means "initialize fresh".
    pub fn layers(&self) -> &[Option<LayerWeights>] {
        &self.layers
    }

    /// Number of layers that carry trained weights
    pub fn num_carried(&self) -> usize {
        self.layers.iter().filter(|l| l.is_some()).count()
    }

    /// Number of layers that start fresh
    pub fn num_fresh(&self) -> usize {
        self.layers.len() - self.num_carried()
    }
}
