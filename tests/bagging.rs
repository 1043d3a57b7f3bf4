//! Bagging ensembles end to end.

mod common;

use common::*;
use toupee::*;

const LABELS: [usize; 4] = [0, 1, 0, 1];

#[test]
fn test_bagging_trains_requested_members() {
    let trainer = ScriptedTrainer::new(vec![vec![0, 1, 0, 1]; 5], 2);
    let log = trainer.log();
    let mut params = params(MethodParams::Bagging { voting: false }, 5);
    params.resample_size = 6;

    let mut session = EnsembleSession::prepare(params, indexed_dataset(&LABELS), trainer).unwrap();
    for _ in 0..5 {
        assert_eq!(session.create_member().unwrap(), RoundStatus::Trained);
    }
    assert!(session.is_complete());
    assert_eq!(session.num_members(), 5);
    assert_eq!(session.history().len(), 5);
    assert!(session.resampler().weights().is_none());

    let requests = log.lock().unwrap();
    let numbers: Vec<usize> = requests.iter().map(|r| r.member_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert!(requests.iter().all(|r| r.train_len == 6 && r.n_epochs == 10));
    assert!(requests.iter().all(|r| r.carried_layers.is_none()));
    drop(requests);

    let aggregator = session.create_aggregator().unwrap();
    assert_eq!(aggregator.strategy(), &AggregationStrategy::Average);
    assert_eq!(aggregator.len(), 5);
}

#[test]
fn test_bagging_rejects_extra_member() {
    let trainer = ScriptedTrainer::new(vec![vec![0, 1, 0, 1]; 3], 2);
    let mut session = EnsembleSession::prepare(
        params(MethodParams::Bagging { voting: false }, 1),
        indexed_dataset(&LABELS),
        trainer,
    )
    .unwrap();
    session.create_member().unwrap();
    assert!(session.create_member().unwrap_err().is_configuration());
}

#[test]
fn test_majority_vote_scenario() {
    // Members call [A, A, B] for example 0.
    let trainer = ScriptedTrainer::new(
        vec![vec![0, 1, 0, 1], vec![0, 1, 0, 1], vec![1, 1, 0, 1]],
        2,
    );
    let build = build_ensemble(
        params(MethodParams::Bagging { voting: true }, 3),
        indexed_dataset(&LABELS),
        trainer,
    )
    .unwrap();

    let aggregator = &build.aggregator;
    assert_eq!(aggregator.strategy(), &AggregationStrategy::MajorityVote);
    let data = indexed_split(&LABELS);
    let labels = aggregator.predict_labels(data.features()).unwrap();
    assert_eq!(labels[0], 0);

    let votes = aggregator.predict(data.features()).unwrap();
    assert!((votes[[0, 0]] - 2.0 / 3.0).abs() < 1e-12);
    assert!((votes[[0, 1]] - 1.0 / 3.0).abs() < 1e-12);

    assert_eq!(build.report.kind, MethodKind::Bagging);
    assert_eq!(build.report.aggregated_members, 3);
    assert!(build.report.coefficients.is_empty());
    assert_eq!(build.report.test_accuracy, 1.0);
}

#[test]
fn test_trainer_failure_aborts_build() {
    let trainer = ScriptedTrainer::new(vec![vec![0, 1, 0, 1]; 3], 2).failing_at(2);
    let err = build_ensemble(
        params(MethodParams::Bagging { voting: false }, 3),
        indexed_dataset(&LABELS),
        trainer,
    )
    .unwrap_err();

    assert!(matches!(err, ToupeeError::Training { round: 2, .. }));
    assert_eq!(err.round(), Some(2));
    assert_eq!(err.category(), "training");
    assert!(!err.is_recoverable());
}

#[test]
fn test_bagging_member_reports() {
    let trainer = ScriptedTrainer::new(vec![vec![0, 1, 0, 0], vec![0, 1, 0, 1]], 2);
    let mut session = EnsembleSession::prepare(
        params(MethodParams::Bagging { voting: false }, 2),
        indexed_dataset(&LABELS),
        trainer,
    )
    .unwrap();
    session.create_member().unwrap();
    session.create_member().unwrap();

    let history = session.history();
    assert_eq!(history[0].member_number, 1);
    assert_eq!(history[0].test_accuracy, 0.75);
    assert_eq!(history[1].test_accuracy, 1.0);
    assert!(history.iter().all(|r| r.weighted_error.is_none() && r.coefficient.is_none()));
    assert_eq!(history[0].resample_size, LABELS.len());
}
