//! Core data types shared by every ensemble component.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input feature value type.
pub type Feature = f32;

/// Class probability type. Kept at 64 bits so boosting arithmetic stays stable.
pub type Probability = f64;

/// Class label, as an index into the output layer.
pub type ClassLabel = usize;

/// Member number within an ensemble, starting at 1.
pub type MemberNumber = usize;

/// Ensemble method identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    /// Bootstrap aggregation
    Bagging,
    /// AdaBoost-M1
    AdaBoostM1,
    /// Deep Incremental Boosting
    Dib,
}

impl MethodKind {
    /// Whether the method maintains a boosting distribution
    pub fn is_boosting(&self) -> bool {
        !matches!(self, MethodKind::Bagging)
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKind::Bagging => write!(f, "Bagging"),
            MethodKind::AdaBoostM1 => write!(f, "AdaBoostM1"),
            MethodKind::Dib => write!(f, "DIB"),
        }
    }
}

/// Index of the largest value in each row; ties resolve to the lowest index.
pub fn argmax_rows(values: ArrayView2<'_, Probability>) -> Array1<ClassLabel> {
    values.map_axis(Axis(1), |row| argmax(row))
}

fn argmax(row: ArrayView1<'_, Probability>) -> ClassLabel {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in row.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// One-hot encode labels against `num_classes` columns.
pub fn one_hot(labels: ArrayView1<'_, ClassLabel>, num_classes: usize) -> Array2<Probability> {
    let mut encoded = Array2::zeros((labels.len(), num_classes));
    for (row, &label) in labels.iter().enumerate() {
        if label < num_classes {
            encoded[[row, label]] = 1.0;
        }
    }
    encoded
}
