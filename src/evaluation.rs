//! Member evaluation against labelled splits.

use crate::core::error::{Result, ToupeeError};
use crate::core::traits::Member;
use crate::core::types::{argmax_rows, ClassLabel, Probability};
use crate::dataset::Split;
use ndarray::{Array1, Array2};

/// Predicted class of every example in `split`.
pub fn predicted_labels<M: Member + ?Sized>(
    member: &M,
    split: &Split,
    batch_size: usize,
) -> Result<Array1<ClassLabel>> {
    let proba = member.predict_proba(split.features(), batch_size)?;
    check_prediction_shape(&proba, split.len(), member.num_classes())?;
    Ok(argmax_rows(proba.view()))
}

/// Per-example misclassification indicator on `split`.
pub fn misclassified<M: Member + ?Sized>(
    member: &M,
    split: &Split,
    batch_size: usize,
) -> Result<Vec<bool>> {
    let predicted = predicted_labels(member, split, batch_size)?;
    Ok(predicted
        .iter()
        .zip(split.labels().iter())
        .map(|(p, y)| p != y)
        .collect())
}

/// Fraction of correctly classified examples; 0 for an empty split.
pub fn accuracy<M: Member + ?Sized>(member: &M, split: &Split, batch_size: usize) -> Result<f64> {
    if split.is_empty() {
        return Ok(0.0);
    }
    let errors = misclassified(member, split, batch_size)?;
    Ok(label_accuracy(errors.iter().filter(|&&e| !e).count(), errors.len()))
}

pub(crate) fn label_accuracy(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}

pub(crate) fn check_prediction_shape(
    proba: &Array2<Probability>,
    rows: usize,
    num_classes: usize,
) -> Result<()> {
    if proba.nrows() != rows || proba.ncols() != num_classes {
        return Err(ToupeeError::dimension_mismatch(
            format!("({}, {})", rows, num_classes),
            format!("({}, {})", proba.nrows(), proba.ncols()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::WeightSnapshot;
    use crate::core::types::Feature;
    use ndarray::{array, ArrayView2};

    /// Predicts class 1 when the first feature is positive.
    #[derive(Debug)]
    struct SignMember;

    impl Member for SignMember {
        fn predict_proba(
            &self,
            data: ArrayView2<'_, Feature>,
            _batch_size: usize,
        ) -> Result<Array2<Probability>> {
            Ok(Array2::from_shape_fn((data.nrows(), 2), |(i, j)| {
                let positive = data[[i, 0]] > 0.0;
                if (j == 1) == positive {
                    0.9
                } else {
                    0.1
                }
            }))
        }

        fn get_weights(&self) -> WeightSnapshot {
            WeightSnapshot::default()
        }

        fn num_classes(&self) -> usize {
            2
        }
    }

    fn split() -> Split {
        Split::new(array![[1.0], [-1.0], [2.0], [-3.0]], array![1, 0, 0, 0]).unwrap()
    }

    #[test]
    fn test_misclassified() {
        let errors = misclassified(&SignMember, &split(), 2).unwrap();
        assert_eq!(errors, vec![false, false, true, false]);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&SignMember, &split(), 2).unwrap(), 0.75);
    }

    #[test]
    fn test_default_predict_is_one_hot() {
        let hard = SignMember.predict(split().features(), 2).unwrap();
        assert_eq!(hard.row(0).to_vec(), vec![0.0, 1.0]);
        assert_eq!(hard.row(1).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_shape_check() {
        let proba = Array2::zeros((3, 2));
        assert!(check_prediction_shape(&proba, 3, 2).is_ok());
        assert!(check_prediction_shape(&proba, 4, 2).is_err());
        assert!(check_prediction_shape(&proba, 3, 3).is_err());
    }
}
