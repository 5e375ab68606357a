//! Configuration structures for training
//!
//! This module provides the JSON-backed hyperparameter configuration: which
//! optimizer to build and with what settings, the regularization strengths of
//! the dense layers, the dropout rate and the hidden activation.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::activations::ActivationKind;
use crate::error::{NnError, Result};
use crate::layers::{DropoutLayer, Regularization};
use crate::optimizers::{Adagrad, Adam, Optimizer, RMSprop, SGD};

/// Training hyperparameters.
///
/// Every field may be omitted; missing values fall back to plain SGD with
/// learning rate 1.0, no regularization, no dropout and ReLU hidden units.
///
/// # Example
///
/// ```json
/// {
///   "optimizer": { "type": "adam", "learning_rate": 0.05, "decay": 5e-7 },
///   "regularization": { "weight_l2": 5e-4, "bias_l2": 5e-4 },
///   "dropout_rate": 0.1,
///   "hidden_activation": "relu"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Strengths applied to every trainable dense layer
    #[serde(default)]
    pub regularization: Regularization,

    /// Fraction of units zeroed during training; no dropout layer when absent
    pub dropout_rate: Option<f64>,

    /// Activation between hidden layers (default "relu")
    pub hidden_activation: Option<ActivationKind>,
}

impl TrainingConfig {
    pub fn hidden_activation(&self) -> ActivationKind {
        self.hidden_activation.unwrap_or(ActivationKind::Relu)
    }

    /// Dropout layer for the configured rate, if any.
    pub fn dropout<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Option<DropoutLayer>> {
        self.dropout_rate
            .map(|rate| DropoutLayer::new(rate, rng))
            .transpose()
    }
}

/// Optimizer selection, tagged by `"type"`.
///
/// Omitted fields take the optimizer's usual defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptimizerConfig {
    Sgd {
        #[serde(default = "unit_learning_rate")]
        learning_rate: f64,
        #[serde(default)]
        decay: f64,
        #[serde(default)]
        momentum: f64,
    },
    Adagrad {
        #[serde(default = "unit_learning_rate")]
        learning_rate: f64,
        #[serde(default)]
        decay: f64,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
    Rmsprop {
        #[serde(default = "small_learning_rate")]
        learning_rate: f64,
        #[serde(default)]
        decay: f64,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
        #[serde(default = "default_rho")]
        rho: f64,
    },
    Adam {
        #[serde(default = "small_learning_rate")]
        learning_rate: f64,
        #[serde(default)]
        decay: f64,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
        #[serde(default = "default_beta_1")]
        beta_1: f64,
        #[serde(default = "default_beta_2")]
        beta_2: f64,
    },
}

fn unit_learning_rate() -> f64 {
    1.0
}

fn small_learning_rate() -> f64 {
    0.001
}

fn default_epsilon() -> f64 {
    1e-7
}

fn default_rho() -> f64 {
    0.9
}

fn default_beta_1() -> f64 {
    0.9
}

fn default_beta_2() -> f64 {
    0.999
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Sgd {
            learning_rate: unit_learning_rate(),
            decay: 0.0,
            momentum: 0.0,
        }
    }
}

impl OptimizerConfig {
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerConfig::Sgd { .. } => "sgd",
            OptimizerConfig::Adagrad { .. } => "adagrad",
            OptimizerConfig::Rmsprop { .. } => "rmsprop",
            OptimizerConfig::Adam { .. } => "adam",
        }
    }

    /// Construct the configured optimizer, validating its hyperparameters.
    pub fn build(&self) -> Result<Box<dyn Optimizer>> {
        debug!(optimizer = self.name(), "building optimizer from configuration");
        let optimizer: Box<dyn Optimizer> = match *self {
            OptimizerConfig::Sgd {
                learning_rate,
                decay,
                momentum,
            } => Box::new(SGD::new(learning_rate, decay, momentum)?),
            OptimizerConfig::Adagrad {
                learning_rate,
                decay,
                epsilon,
            } => Box::new(Adagrad::new(learning_rate, decay, epsilon)?),
            OptimizerConfig::Rmsprop {
                learning_rate,
                decay,
                epsilon,
                rho,
            } => Box::new(RMSprop::new(learning_rate, decay, epsilon, rho)?),
            OptimizerConfig::Adam {
                learning_rate,
                decay,
                epsilon,
                beta_1,
                beta_2,
            } => Box::new(Adam::new(learning_rate, decay, epsilon, beta_1, beta_2)?),
        };
        Ok(optimizer)
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes it into a `TrainingConfig` and
/// validates every hyperparameter.
///
/// # Examples
///
/// ```no_run
/// use dense_nn::config::load_config;
///
/// let cfg = load_config("config/toy_adam.json").unwrap();
/// let optimizer = cfg.optimizer.build().unwrap();
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate a configuration held in memory.
pub fn parse_config(json: &str) -> Result<TrainingConfig> {
    let config: TrainingConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &TrainingConfig) -> Result<()> {
    config.regularization.validate()?;

    if let Some(rate) = config.dropout_rate {
        if !(0.0..1.0).contains(&rate) {
            return Err(NnError::config("dropout_rate", rate, "must be in range [0.0, 1.0)"));
        }
    }

    config.optimizer.build().map(drop)
}
