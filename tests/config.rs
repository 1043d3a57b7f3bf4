//! Configuration files and environment overrides.

use std::io::Write;
use toupee::*;

fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_dib_toml() {
    let file = write_config(
        ".toml",
        r#"
ensemble_size = 5
resample_size = 6000
n_epochs = 20
model_file = "mnist.json"

[method]
type = "DIB"
n_epochs_after_first = 3
grow_forward = true
incremental_index = -1

[[method.incremental_layers]]
class_name = "Dense"
config = { name = "extra", units = 128 }

[trainer]
optimizer = "sgd"
"#,
    );

    let params = EnsembleParams::load_from_file(file.path()).unwrap();
    assert_eq!(params.ensemble_size, 5);
    assert_eq!(params.effective_resample_size(60000), 6000);
    assert_eq!(params.batch_size, DEFAULT_BATCH_SIZE);
    assert_eq!(params.method.kind(), MethodKind::Dib);
    assert_eq!(
        params.method.injection_policy(),
        Some(InjectionPolicy {
            index: InjectionIndex::Position(-1),
            grow_forward: true,
        })
    );
    assert_eq!(params.training_params(3).extra["optimizer"], "sgd");
    assert!(params.method.describe().contains("incremental_layers: [Dense]"));
}

#[test]
fn test_load_bagging_json() {
    let file = write_config(
        ".json",
        r#"{"method": {"type": "Bagging", "voting": true}, "ensemble_size": 7}"#,
    );
    let params = EnsembleParams::load_from_file(file.path()).unwrap();
    assert_eq!(params.method, MethodParams::Bagging { voting: true });
    assert_eq!(params.random_seed, DEFAULT_RANDOM_SEED);
}

#[test]
fn test_unknown_method_field_is_rejected() {
    let file = write_config(
        ".json",
        r#"{"method": {"type": "DIB", "n_epochs_after_first": 3, "grow_forwards": true}, "ensemble_size": 7}"#,
    );
    let err = EnsembleParams::load_from_file(file.path()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_zero_epochs_after_first_is_rejected() {
    let file = write_config(
        ".json",
        r#"{"method": {"type": "DIB", "n_epochs_after_first": 0}, "ensemble_size": 2}"#,
    );
    assert!(matches!(
        EnsembleParams::load_from_file(file.path()),
        Err(ToupeeError::InvalidParameter { .. })
    ));
}

#[test]
fn test_environment_overrides() {
    let mut params = EnsembleParams::default();
    std::env::set_var("TOUPEE_ENSEMBLE_SIZE", "12");
    std::env::set_var("TOUPEE_RANDOM_SEED", "99");
    let result = params.apply_environment_overrides();
    std::env::remove_var("TOUPEE_ENSEMBLE_SIZE");
    std::env::remove_var("TOUPEE_RANDOM_SEED");

    result.unwrap();
    assert_eq!(params.ensemble_size, 12);
    assert_eq!(params.random_seed, 99);
}

#[test]
fn test_save_and_reload_json() {
    let params = EnsembleParamsBuilder::new()
        .method(MethodParams::AdaBoostM1)
        .ensemble_size(3)
        .batch_size(64)
        .build()
        .unwrap();
    let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    params.save_to_file(file.path()).unwrap();
    assert_eq!(EnsembleParams::load_from_file(file.path()).unwrap(), params);
}
