//! Common test utilities for toupee integration tests.
//!
//! Examples carry their own index as the single feature, so a scripted
//! member can answer "which class for example i" by table lookup.

#![allow(dead_code)]

use ndarray::{Array1, Array2, ArrayD, ArrayView2, IxDyn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use toupee::*;

/// Split whose single feature is the example index.
pub fn indexed_split(labels: &[usize]) -> Split {
    let features = Array2::from_shape_fn((labels.len(), 1), |(i, _)| i as f32);
    Split::new(features, Array1::from_vec(labels.to_vec())).unwrap()
}

/// Dataset using the same indexed split for train, valid and test.
pub fn indexed_dataset(labels: &[usize]) -> Dataset {
    let split = indexed_split(labels);
    Dataset::new(split.clone(), split.clone(), split).unwrap()
}

/// Member answering from a per-example table of class calls.
#[derive(Debug, Clone)]
pub struct TableMember {
    calls: Vec<usize>,
    num_classes: usize,
    weights: WeightSnapshot,
}

impl TableMember {
    pub fn new(calls: Vec<usize>, num_classes: usize) -> Self {
        TableMember {
            calls,
            num_classes,
            weights: WeightSnapshot::default(),
        }
    }

    pub fn with_weights(mut self, weights: WeightSnapshot) -> Self {
        self.weights = weights;
        self
    }

    /// Probability given to the called class; the rest is spread evenly.
    pub const CONFIDENCE: f64 = 0.7;
}

impl Member for TableMember {
    fn predict_proba(
        &self,
        data: ArrayView2<'_, Feature>,
        _batch_size: usize,
    ) -> Result<Array2<Probability>> {
        let rest = (1.0 - Self::CONFIDENCE) / (self.num_classes - 1) as f64;
        let mut out = Array2::from_elem((data.nrows(), self.num_classes), rest);
        for (row, example) in data.column(0).iter().enumerate() {
            let call = self.calls[*example as usize];
            out[[row, call]] = Self::CONFIDENCE;
        }
        Ok(out)
    }

    fn get_weights(&self) -> WeightSnapshot {
        self.weights.clone()
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

/// Member returning the same probability row for every input.
#[derive(Debug, Clone)]
pub struct ConstantMember(pub Vec<f64>);

impl Member for ConstantMember {
    fn predict_proba(
        &self,
        data: ArrayView2<'_, Feature>,
        _batch_size: usize,
    ) -> Result<Array2<Probability>> {
        Ok(Array2::from_shape_fn((data.nrows(), self.0.len()), |(_, j)| self.0[j]))
    }

    fn get_weights(&self) -> WeightSnapshot {
        WeightSnapshot::default()
    }

    fn num_classes(&self) -> usize {
        self.0.len()
    }
}

/// What the trainer was asked to do in one round.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub member_number: usize,
    pub n_epochs: usize,
    pub train_len: usize,
    pub architecture: Option<ModelConfig>,
    pub carried_layers: Option<usize>,
    pub fresh_layers: Option<usize>,
}

/// Trainer replaying one table of class calls per round.
///
/// Each member's weights hold one tensor per named layer of the architecture
/// it was built from, filled with its member number.
#[derive(Debug)]
pub struct ScriptedTrainer {
    script: VecDeque<Vec<usize>>,
    num_classes: usize,
    fail_at: Option<usize>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedTrainer {
    pub fn new(script: Vec<Vec<usize>>, num_classes: usize) -> Self {
        ScriptedTrainer {
            script: script.into(),
            num_classes,
            fail_at: None,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail when asked for member `member_number`.
    pub fn failing_at(mut self, member_number: usize) -> Self {
        self.fail_at = Some(member_number);
        self
    }

    /// Handle on the request log that outlives the session.
    pub fn log(&self) -> Arc<Mutex<Vec<RecordedRequest>>> {
        Arc::clone(&self.log)
    }
}

impl ModelTrainer for ScriptedTrainer {
    type Member = TableMember;

    fn train(
        &mut self,
        data: &TrainingData<'_>,
        request: &TrainingRequest<'_>,
    ) -> anyhow::Result<TableMember> {
        self.log.lock().unwrap().push(RecordedRequest {
            member_number: request.member_number,
            n_epochs: request.params.n_epochs,
            train_len: data.train.len(),
            architecture: request.architecture.cloned(),
            carried_layers: request.warm_start.map(WarmStart::num_carried),
            fresh_layers: request.warm_start.map(WarmStart::num_fresh),
        });

        if self.fail_at == Some(request.member_number) {
            anyhow::bail!("out of memory while training member {}", request.member_number);
        }
        let calls = self
            .script
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted"))?;

        let weights = request
            .architecture
            .map(|config| {
                let layers = config
                    .layer_names()
                    .map(|name| {
                        LayerWeights::new(
                            name,
                            vec![ArrayD::from_elem(IxDyn(&[2]), request.member_number as f32)],
                        )
                    })
                    .collect();
                WeightSnapshot::new(layers)
            })
            .unwrap_or_default();

        Ok(TableMember::new(calls, self.num_classes).with_weights(weights))
    }
}

/// Base architecture used by the DIB tests.
pub fn base_architecture() -> ModelConfig {
    ModelConfig::new(vec![
        LayerSpec::new("Dense", "input").with("units", 32),
        LayerSpec::new("Dense", "hidden").with("units", 32),
        LayerSpec::new("Dense", "output").with("units", 2),
    ])
}

/// Parameters for a quick ensemble of `size` members.
pub fn params(method: MethodParams, size: usize) -> EnsembleParams {
    EnsembleParamsBuilder::new()
        .method(method)
        .ensemble_size(size)
        .n_epochs(10)
        .batch_size(4)
        .random_seed(7)
        .build()
        .unwrap()
}
