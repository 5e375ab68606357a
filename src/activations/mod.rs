//! Activation functions for neural networks
//!
//! Each activation is a stateful [`Layer`]: it keeps the last inputs/outputs it
//! saw so the paired `backward` call can compute its derivative. On top of the
//! layer contract every activation exposes a decision rule, `predictions`,
//! turning raw outputs into the label representation suited to its task:
//!
//! - ReLU, Linear: identity (regression-style outputs)
//! - Sigmoid: independent 0/1 per output unit (multi-label)
//! - Softmax: arg-max class index per sample

mod linear;
mod relu;
mod sigmoid;
mod softmax;

pub use linear::Linear;
pub use relu::ReLU;
pub use sigmoid::Sigmoid;
pub use softmax::Softmax;

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::NnError;
use crate::layers::Layer;
use crate::tensor::Tensor;

/// Label representation produced by [`Activation::predictions`].
#[derive(Debug, Clone, PartialEq)]
pub enum Predictions {
    /// Raw values (regression).
    Values(Tensor),
    /// One class index per sample.
    Classes(Array1<usize>),
    /// One 0/1 decision per output unit.
    Binary(Array2<u8>),
}

/// A layer that also knows how to turn its outputs into predictions.
pub trait Activation: Layer {
    fn predictions(&self, outputs: &Tensor) -> Predictions;

    fn kind(&self) -> ActivationKind;
}

/// Identifier used to pick an activation from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationKind {
    Relu,
    Sigmoid,
    Linear,
    Softmax,
}

impl ActivationKind {
    pub fn build(self) -> Box<dyn Activation> {
        match self {
            ActivationKind::Relu => Box::new(ReLU::new()),
            ActivationKind::Sigmoid => Box::new(Sigmoid::new()),
            ActivationKind::Linear => Box::new(Linear::new()),
            ActivationKind::Softmax => Box::new(Softmax::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivationKind::Relu => "relu",
            ActivationKind::Sigmoid => "sigmoid",
            ActivationKind::Linear => "linear",
            ActivationKind::Softmax => "softmax",
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivationKind {
    type Err = NnError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "relu" => Ok(ActivationKind::Relu),
            "sigmoid" => Ok(ActivationKind::Sigmoid),
            "linear" => Ok(ActivationKind::Linear),
            "softmax" => Ok(ActivationKind::Softmax),
            _ => Err(NnError::config(
                "activation",
                name,
                "must be one of: relu, sigmoid, linear, softmax",
            )),
        }
    }
}
