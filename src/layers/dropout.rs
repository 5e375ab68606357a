//! Dropout layer implementation for regularization
//!
//! This module provides a DropoutLayer that randomly zeroes a fraction of its
//! inputs during training and rescales the survivors (inverted dropout), so the
//! expected activation is unchanged. During inference inputs pass through
//! unchanged and no mask is drawn.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Bernoulli;

use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::tensor::Tensor;

/// Dropout layer for regularization.
///
/// The layer stores the *keep* probability `1 - rate`. A training-mode forward
/// draws a fresh Bernoulli(keep) mask, already divided by `keep`, which the
/// next `backward` consumes. An inference-mode forward leaves that mask alone, so
/// an evaluation pass between forward and backward does not break the step.
///
/// # Example
///
/// ```
/// use dense_nn::layers::{DropoutLayer, Layer};
/// use ndarray::Array2;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut layer = DropoutLayer::new(0.1, &mut rng).unwrap();
/// let inputs = Array2::<f64>::ones((2, 3));
/// let output = layer.forward(&inputs, false).unwrap();
/// assert_eq!(output, inputs);
/// ```
#[derive(Debug)]
pub struct DropoutLayer {
    keep_probability: f64,
    binary_mask: Option<Tensor>,
    output: Option<Tensor>,
    rng: StdRng,
}

impl DropoutLayer {
    /// Creates a new dropout layer.
    ///
    /// # Arguments
    ///
    /// * `rate` - Probability of dropping each unit, in `[0.0, 1.0)`
    /// * `rng` - Seeds the layer's own generator, so masks are reproducible
    pub fn new<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> Result<Self> {
        if !(0.0..1.0).contains(&rate) {
            return Err(NnError::config("dropout rate", rate, "must be in range [0.0, 1.0)"));
        }

        Ok(Self {
            keep_probability: 1.0 - rate,
            binary_mask: None,
            output: None,
            rng: StdRng::seed_from_u64(rng.gen()),
        })
    }

    /// Requested drop rate.
    pub fn rate(&self) -> f64 {
        1.0 - self.keep_probability
    }

    pub fn keep_probability(&self) -> f64 {
        self.keep_probability
    }

    /// Scaled mask from the last training-mode forward, until backward consumes it.
    pub fn mask(&self) -> Option<&Tensor> {
        self.binary_mask.as_ref()
    }
}

impl Layer for DropoutLayer {
    fn forward(&mut self, inputs: &Tensor, training: bool) -> Result<Tensor> {
        if !training {
            self.output = Some(inputs.clone());
            return Ok(inputs.clone());
        }

        let keep = self.keep_probability;
        let bernoulli = Bernoulli::new(keep)
            .map_err(|_| NnError::config("keep probability", keep, "must be in range (0.0, 1.0]"))?;
        let rng = &mut self.rng;
        let mask = Tensor::from_shape_fn(inputs.raw_dim(), |_| {
            if rng.sample(bernoulli) {
                1.0 / keep
            } else {
                0.0
            }
        });

        let output = inputs * &mask;
        self.binary_mask = Some(mask);
        self.output = Some(output.clone());
        Ok(output)
    }

    fn backward(&mut self, dvalues: &Tensor) -> Result<Tensor> {
        let mask = self
            .binary_mask
            .take()
            .ok_or_else(|| NnError::uninitialized("DropoutLayer", "backward"))?;
        if mask.dim() != dvalues.dim() {
            return Err(NnError::shape("dropout backward", mask.dim(), dvalues.dim()));
        }
        Ok(dvalues * &mask)
    }

    fn output(&self) -> Option<&Tensor> {
        self.output.as_ref()
    }
}
