//! Stochastic Gradient Descent (SGD) optimizer implementation
//!
//! This module provides plain SGD and SGD with momentum, both driven by the
//! shared inverse-time learning rate decay.

use tracing::trace;

use crate::error::Result;
use crate::layers::DenseLayer;
use crate::optimizers::{check_rate, state_slot, Optimizer};
use crate::utils::lr_scheduler::{InverseTimeDecay, LRScheduler};

/// Stochastic Gradient Descent optimizer.
///
/// Without momentum the update rule is:
///
/// ```text
/// parameter = parameter - learning_rate * gradient
/// ```
///
/// With momentum each layer keeps a velocity per parameter:
///
/// ```text
/// velocity  = momentum * velocity - learning_rate * gradient
/// parameter = parameter + velocity
/// ```
///
/// The velocity lives in the layer's `optimizer_state().momentums` and is only
/// allocated when `momentum > 0`.
///
/// # Example
///
/// ```
/// use dense_nn::optimizers::{Optimizer, SGD};
///
/// let optimizer = SGD::new(1.0, 1e-3, 0.9).unwrap();
/// assert_eq!(optimizer.current_learning_rate(), 1.0);
/// assert_eq!(optimizer.iterations(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct SGD {
    schedule: InverseTimeDecay,
    current_learning_rate: f64,
    momentum: f64,
}

impl SGD {
    /// Creates a new SGD optimizer.
    ///
    /// # Arguments
    ///
    /// * `learning_rate` - Initial step size (must be positive)
    /// * `decay` - Inverse-time decay factor, 0 disables decay
    /// * `momentum` - Velocity retention in `[0, 1)`, 0 disables momentum
    pub fn new(learning_rate: f64, decay: f64, momentum: f64) -> Result<Self> {
        check_rate("momentum", momentum)?;
        Ok(Self {
            schedule: InverseTimeDecay::new(learning_rate, decay)?,
            current_learning_rate: learning_rate,
            momentum,
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.schedule.initial_lr()
    }

    pub fn decay(&self) -> f64 {
        self.schedule.decay()
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }
}

impl Default for SGD {
    /// Learning rate 1.0, no decay, no momentum.
    fn default() -> Self {
        Self {
            schedule: InverseTimeDecay::preset(1.0, 0.0),
            current_learning_rate: 1.0,
            momentum: 0.0,
        }
    }
}

impl Optimizer for SGD {
    fn pre_update_params(&mut self) {
        self.current_learning_rate = self.schedule.get_lr();
        trace!(
            optimizer = "sgd",
            iteration = self.schedule.current_step(),
            learning_rate = self.current_learning_rate,
            "pre-update"
        );
    }

    fn update_params(&mut self, layer: &mut DenseLayer) -> Result<()> {
        let lr = self.current_learning_rate;
        let momentum = self.momentum;
        let update = layer.parameter_update()?;

        if momentum > 0.0 {
            let (weights_dim, biases_dim) = (update.weights.raw_dim(), update.biases.raw_dim());
            let velocity = state_slot(
                &mut update.state.momentums,
                "sgd",
                "momentums",
                weights_dim,
                biases_dim,
            );

            velocity
                .weights
                .zip_mut_with(update.dweights, |v, &g| *v = momentum * *v - lr * g);
            velocity
                .biases
                .zip_mut_with(update.dbiases, |v, &g| *v = momentum * *v - lr * g);

            *update.weights += &velocity.weights;
            *update.biases += &velocity.biases;
        } else {
            update.weights.scaled_add(-lr, update.dweights);
            update.biases.scaled_add(-lr, update.dbiases);
        }

        Ok(())
    }

    fn post_update_params(&mut self) {
        self.schedule.step();
    }

    fn current_learning_rate(&self) -> f64 {
        self.current_learning_rate
    }

    fn iterations(&self) -> usize {
        self.schedule.current_step()
    }
}
