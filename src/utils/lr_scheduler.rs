//! Learning rate scheduler trait and implementations
//!
//! This module defines the LRScheduler trait for adjusting learning rates during
//! training, and the inverse-time decay schedule every optimizer in this crate
//! uses: `lr / (1 + decay × step)`.

use crate::error::{NnError, Result};

/// Core trait for learning rate schedulers.
///
/// Schedulers adjust the learning rate as training progresses. A step here is
/// one optimizer step (one full pre/update/post cycle).
///
/// # Example
///
/// ```ignore
/// let mut scheduler = InverseTimeDecay::new(1.0, 1e-3)?;
///
/// for _ in 0..steps {
///     let lr = scheduler.get_lr();
///     // ... update parameters with lr ...
///     scheduler.step();
/// }
/// ```
pub trait LRScheduler {
    /// Learning rate for the current step.
    fn get_lr(&self) -> f64;

    /// Advance to the next step.
    fn step(&mut self);

    /// Go back to step zero and the initial learning rate.
    fn reset(&mut self);
}

/// Inverse-time decay: `lr_t = initial_lr / (1 + decay × t)`.
///
/// With `decay == 0` the rate stays at `initial_lr` and no division happens.
///
/// # Example
///
/// ```
/// use dense_nn::utils::lr_scheduler::{InverseTimeDecay, LRScheduler};
///
/// let mut scheduler = InverseTimeDecay::new(1.0, 0.5).unwrap();
/// assert_eq!(scheduler.get_lr(), 1.0);
/// scheduler.step();
/// scheduler.step();
/// assert_eq!(scheduler.get_lr(), 0.5); // 1 / (1 + 0.5 * 2)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InverseTimeDecay {
    initial_lr: f64,
    decay: f64,
    current_step: usize,
}

impl InverseTimeDecay {
    /// Creates a new schedule.
    ///
    /// # Errors
    ///
    /// `initial_lr` must be positive and finite, `decay` non-negative and finite.
    pub fn new(initial_lr: f64, decay: f64) -> Result<Self> {
        if !(initial_lr > 0.0 && initial_lr.is_finite()) {
            return Err(NnError::config("learning_rate", initial_lr, "must be positive and finite"));
        }
        if !(decay >= 0.0 && decay.is_finite()) {
            return Err(NnError::config("decay", decay, "must be non-negative and finite"));
        }

        Ok(Self {
            initial_lr,
            decay,
            current_step: 0,
        })
    }

    /// Schedule from constants known to be valid, for optimizer defaults.
    pub(crate) const fn preset(initial_lr: f64, decay: f64) -> Self {
        Self {
            initial_lr,
            decay,
            current_step: 0,
        }
    }

    pub fn initial_lr(&self) -> f64 {
        self.initial_lr
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Number of completed steps.
    pub fn current_step(&self) -> usize {
        self.current_step
    }
}

impl LRScheduler for InverseTimeDecay {
    fn get_lr(&self) -> f64 {
        if self.decay > 0.0 {
            self.initial_lr * (1.0 / (1.0 + self.decay * self.current_step as f64))
        } else {
            self.initial_lr
        }
    }

    fn step(&mut self) {
        self.current_step += 1;
    }

    fn reset(&mut self) {
        self.current_step = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_without_decay() {
        let mut scheduler = InverseTimeDecay::new(0.1, 0.0).unwrap();
        for _ in 0..10 {
            scheduler.step();
        }
        assert_eq!(scheduler.get_lr(), 0.1);
        assert_eq!(scheduler.current_step(), 10);
    }

    #[test]
    fn test_inverse_time_decay() {
        let mut scheduler = InverseTimeDecay::new(1.0, 0.1).unwrap();
        for _ in 0..10 {
            scheduler.step();
        }
        assert!((scheduler.get_lr() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut scheduler = InverseTimeDecay::new(1.0, 1.0).unwrap();
        scheduler.step();
        assert_eq!(scheduler.get_lr(), 0.5);
        scheduler.reset();
        assert_eq!(scheduler.get_lr(), 1.0);
        assert_eq!(scheduler.current_step(), 0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(InverseTimeDecay::new(0.0, 0.0).is_err());
        assert!(InverseTimeDecay::new(-0.1, 0.0).is_err());
        assert!(InverseTimeDecay::new(0.1, -1.0).is_err());
        assert!(InverseTimeDecay::new(f64::NAN, 0.0).is_err());
    }
}
