//! Per-round and whole-ensemble results.

use crate::core::error::Result;
use crate::core::types::{MemberNumber, MethodKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What happened in one `create_member` round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Member number, starting at 1
    pub member_number: MemberNumber,
    /// Number of examples in the resample the member was trained on
    pub resample_size: usize,
    /// Training epochs requested for the member
    pub n_epochs: usize,
    /// Weighted training error (boosting methods only)
    pub weighted_error: Option<f64>,
    /// Boosting coefficient appended in this round
    pub coefficient: Option<f64>,
    /// Whether the member ended boosting by classifying every example correctly
    pub converged: bool,
    /// Number of layers in the member's architecture (DIB only)
    pub architecture_len: Option<usize>,
    /// Layers initialized from the previous member (DIB only)
    pub carried_layers: Option<usize>,
    /// Member accuracy on the validation split
    pub valid_accuracy: f64,
    /// Member accuracy on the test split
    pub test_accuracy: f64,
    /// Wall-clock time of the round in seconds
    pub elapsed_secs: f64,
    /// When the round finished
    pub finished_at: DateTime<Utc>,
}

/// Summary of a finished ensemble build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleReport {
    /// Method identifier
    pub kind: MethodKind,
    /// Method and parameter description
    pub method: String,
    /// Members requested by the configuration
    pub requested_members: usize,
    /// Members used by the aggregator
    pub aggregated_members: usize,
    /// Index of the member that ended boosting early, if any
    pub converged_at: Option<usize>,
    /// Boosting coefficients in member order
    pub coefficients: Vec<f64>,
    /// Ensemble accuracy on the validation split
    pub valid_accuracy: f64,
    /// Ensemble accuracy on the test split
    pub test_accuracy: f64,
    /// Per-round history
    pub rounds: Vec<RoundReport>,
    /// When the report was produced
    pub finished_at: DateTime<Utc>,
}

impl EnsembleReport {
    /// Number of rounds that trained a member
    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Total training time across rounds, in seconds
    pub fn total_elapsed_secs(&self) -> f64 {
        self.rounds.iter().map(|r| r.elapsed_secs).sum()
    }

    /// Best single-member test accuracy, if any round ran
    pub fn best_member_test_accuracy(&self) -> Option<f64> {
        self.rounds
            .iter()
            .map(|r| r.test_accuracy)
            .fold(None, |best, acc| Some(best.map_or(acc, |b: f64| b.max(acc))))
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as JSON to `path`.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a report written by [`EnsembleReport::save_json`].
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(member_number: usize, test_accuracy: f64) -> RoundReport {
        RoundReport {
            member_number,
            resample_size: 100,
            n_epochs: 5,
            weighted_error: Some(0.2),
            coefficient: Some(0.69),
            converged: false,
            architecture_len: None,
            carried_layers: None,
            valid_accuracy: 0.8,
            test_accuracy,
            elapsed_secs: 1.5,
            finished_at: Utc::now(),
        }
    }

    fn report() -> EnsembleReport {
        EnsembleReport {
            kind: MethodKind::AdaBoostM1,
            method: "AdaBoostM1".to_string(),
            requested_members: 2,
            aggregated_members: 2,
            converged_at: None,
            coefficients: vec![0.69, 0.4],
            valid_accuracy: 0.85,
            test_accuracy: 0.84,
            rounds: vec![round(1, 0.8), round(2, 0.82)],
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_summaries() {
        let report = report();
        assert_eq!(report.num_rounds(), 2);
        assert_eq!(report.total_elapsed_secs(), 3.0);
        assert_eq!(report.best_member_test_accuracy(), Some(0.82));
    }

    #[test]
    fn test_json_file() {
        let report = report();
        let file = tempfile::NamedTempFile::new().unwrap();
        report.save_json(file.path()).unwrap();
        let loaded = EnsembleReport::load_json(file.path()).unwrap();
        assert_eq!(loaded, report);
        assert!(report.to_json().unwrap().contains("\"kind\": \"AdaBoostM1\""));
    }
}
