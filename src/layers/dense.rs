//! Dense (fully connected) layer implementation
//!
//! This module provides a DenseLayer that performs the transformation
//! `output = inputs · weights + biases`, its closed-form backward pass with
//! optional L1/L2 regularization, and the auxiliary state optimizers attach to it.

use ndarray::{Axis, Ix2};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::tensor::Tensor;

/// Scale applied to standard-normal samples when initializing weights.
const INIT_SCALE: f64 = 0.01;

/// Regularization strengths of a dense layer.
///
/// Every coefficient must be non-negative. A coefficient of exactly zero skips
/// the corresponding penalty and sub-gradient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Regularization {
    pub weight_l1: f64,
    pub weight_l2: f64,
    pub bias_l1: f64,
    pub bias_l2: f64,
}

impl Regularization {
    pub fn validate(&self) -> Result<()> {
        let coefficients = [
            ("weight_l1", self.weight_l1),
            ("weight_l2", self.weight_l2),
            ("bias_l1", self.bias_l1),
            ("bias_l2", self.bias_l2),
        ];
        for (parameter, value) in coefficients {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(NnError::config(parameter, value, "must be finite and non-negative"));
            }
        }
        Ok(())
    }

    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }
}

/// A weight-shaped and a bias-shaped tensor travelling together.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamPair {
    pub weights: Tensor,
    pub biases: Tensor,
}

impl ParamPair {
    pub(crate) fn zeros(weights: Ix2, biases: Ix2) -> Self {
        Self {
            weights: Tensor::zeros(weights),
            biases: Tensor::zeros(biases),
        }
    }
}

/// Per-layer optimizer state.
///
/// Both slots start absent and are materialized the first time an optimizer
/// that needs them updates the layer. Afterwards they persist for the whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizerState {
    /// Velocity (SGD with momentum) or first moment (Adam).
    pub momentums: Option<ParamPair>,
    /// Squared-gradient accumulator (Adagrad, RMSprop) or second moment (Adam).
    pub cache: Option<ParamPair>,
}

/// Mutable view over everything an optimizer touches during `update_params`.
pub(crate) struct ParameterUpdate<'a> {
    pub weights: &'a mut Tensor,
    pub biases: &'a mut Tensor,
    pub dweights: &'a Tensor,
    pub dbiases: &'a Tensor,
    pub state: &'a mut OptimizerState,
}

/// Dense (fully connected) layer with weights, biases and regularization.
///
/// Weights are `(input_size × output_size)`, biases `(1 × output_size)` and are
/// broadcast over the batch.
///
/// # Example
///
/// ```
/// use dense_nn::layers::{DenseLayer, Layer};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let layer = DenseLayer::new(784, 128, &mut rng);
/// assert_eq!(layer.input_size(), 784);
/// assert_eq!(layer.output_size(), 128);
/// assert_eq!(layer.parameter_count(), 784 * 128 + 128);
/// ```
#[derive(Debug, Clone)]
pub struct DenseLayer {
    weights: Tensor,
    biases: Tensor,
    regularization: Regularization,
    inputs: Option<Tensor>,
    output: Option<Tensor>,
    dweights: Option<Tensor>,
    dbiases: Option<Tensor>,
    dinputs: Option<Tensor>,
    optimizer_state: OptimizerState,
}

impl DenseLayer {
    /// Create a new DenseLayer.
    ///
    /// Weights are drawn from `0.01 × N(0, 1)` so that neurons start out
    /// different from each other; biases start at zero.
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        let weights =
            Tensor::random_using((input_size, output_size), StandardNormal, rng) * INIT_SCALE;
        Self::with_parameters(weights, Tensor::zeros((1, output_size)))
    }

    /// Build a layer from explicit parameters.
    ///
    /// `biases` must be a single row as wide as `weights`.
    pub fn from_parameters(weights: Tensor, biases: Tensor) -> Result<Self> {
        if biases.dim() != (1, weights.ncols()) {
            return Err(NnError::shape("dense biases", (1, weights.ncols()), biases.dim()));
        }
        Ok(Self::with_parameters(weights, biases))
    }

    fn with_parameters(weights: Tensor, biases: Tensor) -> Self {
        Self {
            weights,
            biases,
            regularization: Regularization::default(),
            inputs: None,
            output: None,
            dweights: None,
            dbiases: None,
            dinputs: None,
            optimizer_state: OptimizerState::default(),
        }
    }

    /// Attach regularization strengths, rejecting negative coefficients.
    pub fn with_regularization(mut self, regularization: Regularization) -> Result<Self> {
        regularization.validate()?;
        self.regularization = regularization;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn biases(&self) -> &Tensor {
        &self.biases
    }

    pub fn regularization(&self) -> &Regularization {
        &self.regularization
    }

    /// Gradient of the loss with respect to the weights from the last backward pass.
    pub fn dweights(&self) -> Option<&Tensor> {
        self.dweights.as_ref()
    }

    pub fn dbiases(&self) -> Option<&Tensor> {
        self.dbiases.as_ref()
    }

    pub fn dinputs(&self) -> Option<&Tensor> {
        self.dinputs.as_ref()
    }

    pub fn optimizer_state(&self) -> &OptimizerState {
        &self.optimizer_state
    }

    /// Weighted L1/L2 penalty of this layer's parameters.
    pub fn regularization_loss(&self) -> f64 {
        let reg = &self.regularization;
        let mut loss = 0.0;
        if reg.weight_l1 > 0.0 {
            loss += reg.weight_l1 * self.weights.mapv(f64::abs).sum();
        }
        if reg.bias_l1 > 0.0 {
            loss += reg.bias_l1 * self.biases.mapv(f64::abs).sum();
        }
        if reg.weight_l2 > 0.0 {
            loss += reg.weight_l2 * self.weights.mapv(|w| w * w).sum();
        }
        if reg.bias_l2 > 0.0 {
            loss += reg.bias_l2 * self.biases.mapv(|b| b * b).sum();
        }
        loss
    }

    pub(crate) fn parameter_update(&mut self) -> Result<ParameterUpdate<'_>> {
        let dweights = self
            .dweights
            .as_ref()
            .ok_or_else(|| NnError::uninitialized("DenseLayer", "update_params"))?;
        let dbiases = self
            .dbiases
            .as_ref()
            .ok_or_else(|| NnError::uninitialized("DenseLayer", "update_params"))?;

        Ok(ParameterUpdate {
            weights: &mut self.weights,
            biases: &mut self.biases,
            dweights,
            dbiases,
            state: &mut self.optimizer_state,
        })
    }
}

/// Sub-gradient of |x| used for L1: zero counts as positive.
fn l1_sign(value: f64) -> f64 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

impl Layer for DenseLayer {
    fn forward(&mut self, inputs: &Tensor, _training: bool) -> Result<Tensor> {
        if inputs.ncols() != self.input_size() {
            return Err(NnError::shape(
                "dense forward",
                format!("(batch, {})", self.input_size()),
                inputs.dim(),
            ));
        }

        let output = inputs.dot(&self.weights) + &self.biases;
        self.inputs = Some(inputs.clone());
        self.output = Some(output.clone());
        Ok(output)
    }

    fn backward(&mut self, dvalues: &Tensor) -> Result<Tensor> {
        let inputs = self
            .inputs
            .as_ref()
            .ok_or_else(|| NnError::uninitialized("DenseLayer", "backward"))?;
        let expected = (inputs.nrows(), self.output_size());
        if dvalues.dim() != expected {
            return Err(NnError::shape("dense backward", expected, dvalues.dim()));
        }

        let mut dweights = inputs.t().dot(dvalues);
        let mut dbiases = dvalues.sum_axis(Axis(0)).insert_axis(Axis(0));
        let dinputs = dvalues.dot(&self.weights.t());

        let reg = self.regularization;
        if reg.weight_l1 > 0.0 {
            dweights.zip_mut_with(&self.weights, |d, &w| *d += reg.weight_l1 * l1_sign(w));
        }
        if reg.bias_l1 > 0.0 {
            dbiases.zip_mut_with(&self.biases, |d, &b| *d += reg.bias_l1 * l1_sign(b));
        }
        if reg.weight_l2 > 0.0 {
            dweights.zip_mut_with(&self.weights, |d, &w| *d += 2.0 * reg.weight_l2 * w);
        }
        if reg.bias_l2 > 0.0 {
            dbiases.zip_mut_with(&self.biases, |d, &b| *d += 2.0 * reg.bias_l2 * b);
        }

        self.dweights = Some(dweights);
        self.dbiases = Some(dbiases);
        self.dinputs = Some(dinputs.clone());
        Ok(dinputs)
    }

    fn output(&self) -> Option<&Tensor> {
        self.output.as_ref()
    }

    fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }
}
