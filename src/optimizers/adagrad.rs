//! Adagrad optimizer implementation

use tracing::trace;

use crate::error::Result;
use crate::layers::DenseLayer;
use crate::optimizers::{adaptive_step, check_epsilon, state_slot, Optimizer};
use crate::utils::lr_scheduler::{InverseTimeDecay, LRScheduler};

/// Adagrad: per-parameter learning rates from the running sum of squared
/// gradients.
///
/// ```text
/// cache     = cache + gradient²
/// parameter = parameter - learning_rate * gradient / (√cache + ε)
/// ```
///
/// The cache only grows, so the effective step of frequently updated
/// parameters keeps shrinking.
#[derive(Debug, Clone)]
pub struct Adagrad {
    schedule: InverseTimeDecay,
    current_learning_rate: f64,
    epsilon: f64,
}

impl Adagrad {
    pub fn new(learning_rate: f64, decay: f64, epsilon: f64) -> Result<Self> {
        check_epsilon(epsilon)?;
        Ok(Self {
            schedule: InverseTimeDecay::new(learning_rate, decay)?,
            current_learning_rate: learning_rate,
            epsilon,
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.schedule.initial_lr()
    }

    pub fn decay(&self) -> f64 {
        self.schedule.decay()
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for Adagrad {
    /// Learning rate 1.0, no decay, epsilon 1e-7.
    fn default() -> Self {
        Self {
            schedule: InverseTimeDecay::preset(1.0, 0.0),
            current_learning_rate: 1.0,
            epsilon: 1e-7,
        }
    }
}

impl Optimizer for Adagrad {
    fn pre_update_params(&mut self) {
        self.current_learning_rate = self.schedule.get_lr();
        trace!(
            optimizer = "adagrad",
            iteration = self.schedule.current_step(),
            learning_rate = self.current_learning_rate,
            "pre-update"
        );
    }

    fn update_params(&mut self, layer: &mut DenseLayer) -> Result<()> {
        let update = layer.parameter_update()?;
        let (weights_dim, biases_dim) = (update.weights.raw_dim(), update.biases.raw_dim());
        let cache =
            state_slot(&mut update.state.cache, "adagrad", "cache", weights_dim, biases_dim);

        cache.weights.zip_mut_with(update.dweights, |c, &g| *c += g * g);
        cache.biases.zip_mut_with(update.dbiases, |c, &g| *c += g * g);

        let (lr, epsilon) = (self.current_learning_rate, self.epsilon);
        adaptive_step(update.weights, update.dweights, &cache.weights, lr, epsilon);
        adaptive_step(update.biases, update.dbiases, &cache.biases, lr, epsilon);
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
