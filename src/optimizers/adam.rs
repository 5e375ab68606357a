//! Adam (Adaptive Moment Estimation) optimizer implementation
//!
//! This module provides the Adam optimizer, which combines momentum and
//! adaptive learning rates with bias correction for improved convergence.

use ndarray::Zip;
use tracing::trace;

use crate::error::Result;
use crate::layers::DenseLayer;
use crate::optimizers::{check_epsilon, check_rate, state_slot, Optimizer};
use crate::utils::lr_scheduler::{InverseTimeDecay, LRScheduler};

/// Adam (Adaptive Moment Estimation) optimizer.
///
/// Adam keeps two moving averages for each parameter, stored on the layer:
///
/// 1. First moment (mean) of gradients in `optimizer_state().momentums`
/// 2. Second moment (uncentered variance) in `optimizer_state().cache`
///
/// The update rule is:
///
/// ```text
/// m_t = β1 * m_{t-1} + (1 - β1) * gradient
/// v_t = β2 * v_{t-1} + (1 - β2) * gradient²
/// m_hat = m_t / (1 - β1^(t+1))
/// v_hat = v_t / (1 - β2^(t+1))
/// parameter = parameter - α * m_hat / (√v_hat + ε)
/// ```
///
/// where t is the number of completed steps, so the first step corrects
/// with `1 - β`.
///
/// # Example
///
/// ```
/// use dense_nn::optimizers::{Adam, Optimizer};
///
/// let optimizer = Adam::default();
/// assert_eq!(optimizer.current_learning_rate(), 0.001);
/// assert_eq!(optimizer.beta1(), 0.9);
/// assert_eq!(optimizer.beta2(), 0.999);
/// ```
///
/// # Reference
///
/// Kingma, D. P., & Ba, J. (2014). Adam: A method for stochastic optimization.
/// arXiv preprint arXiv:1412.6980.
#[derive(Debug, Clone)]
pub struct Adam {
    schedule: InverseTimeDecay,
    current_learning_rate: f64,
    epsilon: f64,
    beta1: f64,
    beta2: f64,
}

impl Adam {
    /// Creates a new Adam optimizer with the specified hyperparameters.
    ///
    /// # Arguments
    ///
    /// * `learning_rate` - The step size for parameter updates (α, must be positive)
    /// * `decay` - Inverse-time decay factor, 0 disables decay
    /// * `epsilon` - Small constant for numerical stability (must be positive)
    /// * `beta1` - Exponential decay rate for first moment estimates, in `[0, 1)`
    /// * `beta2` - Exponential decay rate for second moment estimates, in `[0, 1)`
    pub fn new(
        learning_rate: f64,
        decay: f64,
        epsilon: f64,
        beta1: f64,
        beta2: f64,
    ) -> Result<Self> {
        check_epsilon(epsilon)?;
        check_rate("beta_1", beta1)?;
        check_rate("beta_2", beta2)?;
        Ok(Self {
            schedule: InverseTimeDecay::new(learning_rate, decay)?,
            current_learning_rate: learning_rate,
            epsilon,
            beta1,
            beta2,
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

    pub fn beta1(&self) -> f64 {
        self.beta1
    }

    pub fn beta2(&self) -> f64 {
        self.beta2
    }

    /// Divisors `(1 - β1^(t+1), 1 - β2^(t+1))` applied during the current step.
    pub fn bias_correction(&self) -> (f64, f64) {
        let exponent = (self.schedule.current_step() + 1) as i32;
        (1.0 - self.beta1.powi(exponent), 1.0 - self.beta2.powi(exponent))
    }
}

impl Default for Adam {
    /// Learning rate 0.001, no decay, epsilon 1e-7, β1 0.9, β2 0.999.
    fn default() -> Self {
        Self {
            schedule: InverseTimeDecay::preset(0.001, 0.0),
            current_learning_rate: 0.001,
            epsilon: 1e-7,
            beta1: 0.9,
            beta2: 0.999,
        }
    }
}

impl Optimizer for Adam {
    fn pre_update_params(&mut self) {
        self.current_learning_rate = self.schedule.get_lr();
        trace!(
            optimizer = "adam",
            iteration = self.schedule.current_step(),
            learning_rate = self.current_learning_rate,
            "pre-update"
        );
    }

    fn update_params(&mut self, layer: &mut DenseLayer) -> Result<()> {
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let lr = self.current_learning_rate;
        let (correction1, correction2) = self.bias_correction();

        let update = layer.parameter_update()?;
        let (weights_dim, biases_dim) = (update.weights.raw_dim(), update.biases.raw_dim());
        let momentums =
            state_slot(&mut update.state.momentums, "adam", "momentums", weights_dim, biases_dim);
        let cache = state_slot(&mut update.state.cache, "adam", "cache", weights_dim, biases_dim);

        let pairs = [
            (&mut *update.weights, update.dweights, &mut momentums.weights, &mut cache.weights),
            (&mut *update.biases, update.dbiases, &mut momentums.biases, &mut cache.biases),
        ];
        for (param, grad, m, v) in pairs {
            Zip::from(param)
                .and(grad)
                .and(m)
                .and(v)
                .for_each(|p, &g, m, v| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / correction1;
                    let v_hat = *v / correction2;
                    *p += -lr * m_hat / (v_hat.sqrt() + epsilon);
                });
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
