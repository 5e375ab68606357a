//! RMSprop optimizer implementation

use tracing::trace;

use crate::error::Result;
use crate::layers::DenseLayer;
use crate::optimizers::{adaptive_step, check_epsilon, check_rate, state_slot, Optimizer};
use crate::utils::lr_scheduler::{InverseTimeDecay, LRScheduler};

/// RMSprop: Adagrad with an exponential moving average in place of the sum.
///
/// ```text
/// cache     = ρ * cache + (1 - ρ) * gradient²
/// parameter = parameter - learning_rate * gradient / (√cache + ε)
/// ```
///
/// Weights and biases use the same moving-average rule.
#[derive(Debug, Clone)]
pub struct RMSprop {
    schedule: InverseTimeDecay,
    current_learning_rate: f64,
    epsilon: f64,
    rho: f64,
}

impl RMSprop {
    /// # Arguments
    ///
    /// * `rho` - Cache retention in `[0, 1)`
    pub fn new(learning_rate: f64, decay: f64, epsilon: f64, rho: f64) -> Result<Self> {
        check_epsilon(epsilon)?;
        check_rate("rho", rho)?;
        Ok(Self {
            schedule: InverseTimeDecay::new(learning_rate, decay)?,
            current_learning_rate: learning_rate,
            epsilon,
            rho,
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

    pub fn rho(&self) -> f64 {
        self.rho
    }
}

impl Default for RMSprop {
    /// Learning rate 0.001, no decay, epsilon 1e-7, rho 0.9.
    fn default() -> Self {
        Self {
            schedule: InverseTimeDecay::preset(0.001, 0.0),
            current_learning_rate: 0.001,
            epsilon: 1e-7,
            rho: 0.9,
        }
    }
}

impl Optimizer for RMSprop {
    fn pre_update_params(&mut self) {
        self.current_learning_rate = self.schedule.get_lr();
        trace!(
            optimizer = "rmsprop",
            iteration = self.schedule.current_step(),
            learning_rate = self.current_learning_rate,
            "pre-update"
        );
    }

    fn update_params(&mut self, layer: &mut DenseLayer) -> Result<()> {
        let rho = self.rho;
        let update = layer.parameter_update()?;
        let (weights_dim, biases_dim) = (update.weights.raw_dim(), update.biases.raw_dim());
        let cache =
            state_slot(&mut update.state.cache, "rmsprop", "cache", weights_dim, biases_dim);

        cache
            .weights
            .zip_mut_with(update.dweights, |c, &g| *c = rho * *c + (1.0 - rho) * g * g);
        cache
            .biases
            .zip_mut_with(update.dbiases, |c, &g| *c = rho * *c + (1.0 - rho) * g * g);

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
