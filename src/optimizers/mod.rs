//! Optimizer abstractions for neural network parameter updates
//!
//! This module provides the Optimizer trait and implementations of the
//! gradient-descent variants used to train dense layers.
//!
//! # Overview
//!
//! Every optimizer follows the same three-phase protocol per training step,
//! driven by the caller in this exact order:
//!
//! 1. `pre_update_params()` once: refresh the decayed learning rate
//! 2. `update_params(layer)` once per trainable layer
//! 3. `post_update_params()` once: advance the step counter
//!
//! Auxiliary state (momentums, caches) lives on each [`DenseLayer`] and is
//! allocated the first time an optimizer touches the layer.
//!
//! # Available Optimizers
//!
//! - SGD: stochastic gradient descent with optional momentum
//! - Adagrad: per-parameter rates from the accumulated squared gradients
//! - RMSprop: per-parameter rates from a moving average of squared gradients
//! - Adam: momentum and RMSprop-style caches with bias correction
//!
//! # Example
//!
//! ```ignore
//! use dense_nn::optimizers::{Adam, Optimizer};
//!
//! let mut optimizer = Adam::default();
//! optimizer.pre_update_params();
//! optimizer.update_params(&mut dense1)?;
//! optimizer.update_params(&mut dense2)?;
//! optimizer.post_update_params();
//! ```

pub mod adagrad;
pub mod adam;
pub mod rmsprop;
pub mod sgd;

pub use adagrad::Adagrad;
pub use adam::Adam;
pub use rmsprop::RMSprop;
pub use sgd::SGD;

use ndarray::{Ix2, Zip};
use tracing::debug;

use crate::error::{NnError, Result};
use crate::layers::{DenseLayer, ParamPair};
use crate::tensor::Tensor;

/// Core trait for neural network optimizers.
pub trait Optimizer: std::fmt::Debug {
    /// Recompute the learning rate for the step about to run.
    fn pre_update_params(&mut self);

    /// Apply one update to the weights and biases of `layer`.
    ///
    /// # Errors
    ///
    /// `UninitializedState` if the layer has not been through `backward`.
    fn update_params(&mut self, layer: &mut DenseLayer) -> Result<()>;

    /// Finish the step; this is the only place `iterations` advances.
    fn post_update_params(&mut self);

    /// Learning rate used by the current step.
    fn current_learning_rate(&self) -> f64;

    /// Number of completed steps.
    fn iterations(&self) -> usize;
}

/// Return the state slot, allocating zeros shaped like the layer's parameters
/// the first time it is needed.
fn state_slot<'a>(
    slot: &'a mut Option<ParamPair>,
    optimizer: &'static str,
    name: &'static str,
    weights: Ix2,
    biases: Ix2,
) -> &'a mut ParamPair {
    slot.get_or_insert_with(|| {
        debug!(
            optimizer,
            slot = name,
            weights = ?weights,
            biases = ?biases,
            "allocating optimizer state"
        );
        ParamPair::zeros(weights, biases)
    })
}

/// `param -= lr × grad / (sqrt(cache) + epsilon)`, shared by Adagrad and RMSprop.
fn adaptive_step(param: &mut Tensor, grad: &Tensor, cache: &Tensor, lr: f64, epsilon: f64) {
    Zip::from(param)
        .and(grad)
        .and(cache)
        .for_each(|p, &g, &c| *p += -lr * g / (c.sqrt() + epsilon));
}

fn check_epsilon(epsilon: f64) -> Result<()> {
    if epsilon > 0.0 && epsilon.is_finite() {
        Ok(())
    } else {
        Err(NnError::config("epsilon", epsilon, "must be positive and finite"))
    }
}

/// Exponential decay rates must lie in `[0, 1)`.
fn check_rate(parameter: &'static str, value: f64) -> Result<()> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(NnError::config(parameter, value, "must be in range [0.0, 1.0)"))
    }
}
