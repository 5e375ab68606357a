// Tests for JSON configuration loading.

use std::io::Write;

use dense_nn::activations::ActivationKind;
use dense_nn::config::{load_config, OptimizerConfig};
use dense_nn::NnError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"{
            "optimizer": { "type": "rmsprop", "learning_rate": 0.02, "decay": 1e-5, "rho": 0.95 },
            "regularization": { "weight_l2": 5e-4, "bias_l2": 5e-4 },
            "dropout_rate": 0.1,
            "hidden_activation": "sigmoid"
        }"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.optimizer,
        OptimizerConfig::Rmsprop {
            learning_rate: 0.02,
            decay: 1e-5,
            epsilon: 1e-7,
            rho: 0.95,
        }
    );
    assert_eq!(config.regularization.weight_l2, 5e-4);
    assert_eq!(config.regularization.weight_l1, 0.0);
    assert_eq!(config.hidden_activation(), ActivationKind::Sigmoid);

    let dropout = config.dropout(&mut StdRng::seed_from_u64(0)).unwrap().unwrap();
    assert!((dropout.rate() - 0.1).abs() < 1e-12);

    let optimizer = config.optimizer.build().unwrap();
    assert_eq!(optimizer.current_learning_rate(), 0.02);
    assert_eq!(optimizer.iterations(), 0);
}

#[test]
fn test_sgd_momentum_config() {
    let file = write_config(
        r#"{ "optimizer": { "type": "sgd", "learning_rate": 0.5, "momentum": 0.9 } }"#,
    );
    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.optimizer,
        OptimizerConfig::Sgd {
            learning_rate: 0.5,
            decay: 0.0,
            momentum: 0.9,
        }
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_config(dir.path().join("missing.json"));
    assert!(matches!(result, Err(NnError::Io(_))));
}

#[test]
fn test_malformed_json_is_parse_error() {
    let file = write_config("{ \"optimizer\": ");
    assert!(matches!(load_config(file.path()), Err(NnError::Json(_))));
}

#[test]
fn test_unknown_field_rejected() {
    let file = write_config(r#"{ "learning_rate": 0.1 }"#);
    assert!(matches!(load_config(file.path()), Err(NnError::Json(_))));
}

#[test]
fn test_unknown_activation_rejected() {
    let file = write_config(r#"{ "hidden_activation": "tanh" }"#);
    assert!(matches!(load_config(file.path()), Err(NnError::Json(_))));
}

#[test]
fn test_invalid_hyperparameter_is_configuration_error() {
    let file = write_config(r#"{ "optimizer": { "type": "adam", "beta_2": 1.0 } }"#);
    assert!(matches!(
        load_config(file.path()),
        Err(NnError::Configuration { parameter: "beta_2", .. })
    ));
}

#[test]
fn test_bundled_adam_config_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/toy_adam.json");
    let config = load_config(path).unwrap();
    assert_eq!(config.optimizer.name(), "adam");
    assert_eq!(config.hidden_activation(), ActivationKind::Relu);
    assert!(config.dropout_rate.is_some());
}
