//! Deep Incremental Boosting: architecture growth and weight carry-over.

mod common;

use common::*;
use std::io::Write;
use toupee::*;

const LABELS: [usize; 4] = [0, 1, 0, 1];

fn dib(index: InjectionIndex, grow_forward: bool) -> MethodParams {
    dib_with_layers(
        index,
        grow_forward,
        vec![LayerSpec::new("Dense", "extra").with("units", 16)],
    )
}

fn dib_with_layers(
    index: InjectionIndex,
    grow_forward: bool,
    incremental_layers: Vec<LayerSpec>,
) -> MethodParams {
    MethodParams::Dib {
        n_epochs_after_first: 3,
        grow_forward,
        incremental_index: index,
        incremental_layers,
    }
}

/// Three members that each miss one example, so no round converges.
fn script() -> Vec<Vec<usize>> {
    vec![vec![0, 1, 0, 0], vec![1, 1, 0, 1], vec![0, 0, 0, 1]]
}

fn names(config: &ModelConfig) -> Vec<String> {
    config.layer_names().map(str::to_string).collect()
}

fn run_dib(method: MethodParams) -> (EnsembleSession<ScriptedTrainer>, Vec<RecordedRequest>) {
    let trainer = ScriptedTrainer::new(script(), 2);
    let log = trainer.log();
    let mut session = EnsembleSession::prepare_with_architecture(
        params(method, 3),
        indexed_dataset(&LABELS),
        trainer,
        Some(base_architecture()),
    )
    .unwrap();
    for _ in 0..3 {
        assert_eq!(session.create_member().unwrap(), RoundStatus::Trained);
    }
    let requests = log.lock().unwrap().clone();
    (session, requests)
}

#[test]
fn test_architecture_grows_by_incremental_layers_each_round() {
    let (session, requests) = run_dib(dib(InjectionIndex::Position(-2), false));

    let lengths: Vec<usize> = requests
        .iter()
        .map(|r| r.architecture.as_ref().unwrap().len())
        .collect();
    assert_eq!(lengths, vec![3, 4, 5]);

    let final_config = session.method().architecture().unwrap();
    assert_eq!(
        names(final_config),
        vec!["input", "incremental-2-0", "incremental-3-0", "hidden", "output"]
    );
    assert!(final_config.ensure_unique_names().is_ok());

    let injected = &final_config.layers()[1];
    assert_eq!(injected.class_name, "Dense");
    assert_eq!(injected.config.get("units"), Some(&serde_json::json!(16)));

    let reported: Vec<Option<usize>> = session.history().iter().map(|r| r.architecture_len).collect();
    assert_eq!(reported, vec![Some(3), Some(4), Some(5)]);
}

#[test]
fn test_first_member_trains_longer_without_warm_start() {
    let (_, requests) = run_dib(dib(InjectionIndex::End, false));

    let epochs: Vec<usize> = requests.iter().map(|r| r.n_epochs).collect();
    assert_eq!(epochs, vec![10, 3, 3]);

    assert_eq!(requests[0].carried_layers, None);
    // Every layer of the previous member is carried; the new layer starts fresh.
    assert_eq!(requests[1].carried_layers, Some(3));
    assert_eq!(requests[1].fresh_layers, Some(1));
    assert_eq!(requests[2].carried_layers, Some(4));
    assert_eq!(requests[2].fresh_layers, Some(1));
}

#[test]
fn test_end_index_appends() {
    let (session, _) = run_dib(dib(InjectionIndex::End, false));
    assert_eq!(
        names(session.method().architecture().unwrap()),
        vec!["input", "hidden", "output", "incremental-2-0", "incremental-3-0"]
    );
}

#[test]
fn test_minus_one_index_appends() {
    let (session, _) = run_dib(dib(InjectionIndex::Position(-1), false));
    assert_eq!(
        names(session.method().architecture().unwrap()),
        vec!["input", "hidden", "output", "incremental-2-0", "incremental-3-0"]
    );
}

#[test]
fn test_grow_forward_advances_one_position_per_member() {
    let layers = vec![
        LayerSpec::new("Dense", "extra").with("units", 16),
        LayerSpec::new("Dropout", "drop"),
    ];
    let (session, requests) = run_dib(dib_with_layers(InjectionIndex::Position(1), true, layers));

    let lengths: Vec<usize> = requests
        .iter()
        .map(|r| r.architecture.as_ref().unwrap().len())
        .collect();
    assert_eq!(lengths, vec![3, 5, 7]);
    assert_eq!(
        names(session.method().architecture().unwrap()),
        vec![
            "input",
            "incremental-2-0",
            "incremental-3-0",
            "incremental-3-1",
            "incremental-2-1",
            "hidden",
            "output"
        ]
    );
}

#[test]
fn test_grow_forward_advances_past_earlier_injections() {
    let (session, _) = run_dib(dib(InjectionIndex::Position(1), true));
    assert_eq!(
        names(session.method().architecture().unwrap()),
        vec!["input", "incremental-2-0", "incremental-3-0", "hidden", "output"]
    );

    let (session, _) = run_dib(dib(InjectionIndex::Position(1), false));
    assert_eq!(
        names(session.method().architecture().unwrap()),
        vec!["input", "incremental-3-0", "incremental-2-0", "hidden", "output"]
    );
}

#[test]
fn test_dib_keeps_boosting_weights() {
    let (session, _) = run_dib(dib(InjectionIndex::End, false));
    let state = session.method().boosting_state().unwrap();
    assert_eq!(state.coefficients().len(), 3);
    assert!(state.is_normalized());
    assert!(state.coefficients().iter().all(|&c| c > 0.0));

    let aggregator = session.create_aggregator().unwrap();
    assert!(matches!(
        aggregator.strategy(),
        AggregationStrategy::WeightedAverage { coefficients } if coefficients.len() == 3
    ));
}

#[test]
fn test_dib_without_architecture_is_rejected() {
    let err = EnsembleSession::prepare(
        params(dib(InjectionIndex::End, false), 3),
        indexed_dataset(&LABELS),
        ScriptedTrainer::new(script(), 2),
    )
    .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_dib_loads_architecture_from_model_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    let layers = serde_json::to_string(&base_architecture()).unwrap();
    file.write_all(layers.as_bytes()).unwrap();

    let mut params = params(dib(InjectionIndex::Position(-1), false), 2);
    params.model_file = Some(file.path().to_path_buf());

    let trainer = ScriptedTrainer::new(script(), 2);
    let log = trainer.log();
    let build = build_ensemble(params, indexed_dataset(&LABELS), trainer).unwrap();

    assert_eq!(build.report.kind, MethodKind::Dib);
    assert_eq!(build.report.num_rounds(), 2);
    assert_eq!(build.report.rounds[1].carried_layers, Some(3));
    let requests = log.lock().unwrap();
    assert_eq!(requests[0].architecture.as_ref(), Some(&base_architecture()));
}
