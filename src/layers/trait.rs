//! Layer trait definition for neural network layers
//!
//! This module defines the core Layer trait that every differentiable component
//! implements: Dense, Dropout and the activation functions. The trait provides a
//! common interface for forward and backward propagation over `(batch, features)`
//! tensors.

use crate::error::Result;
use crate::tensor::Tensor;

/// Core trait for differentiable network components.
///
/// A component keeps whatever it needs from its last `forward` call (inputs,
/// outputs, masks) until the matching `backward` call of the same step. Calling
/// `backward` without a prior `forward` returns
/// [`NnError::UninitializedState`](crate::NnError::UninitializedState).
///
/// # Example
///
/// ```ignore
/// let hidden = dense.forward(&batch, true)?;
/// let activated = relu.forward(&hidden, true)?;
/// // ... loss ...
/// let grad = relu.backward(&dloss)?;
/// let grad = dense.backward(&grad)?;
/// ```
pub trait Layer: std::fmt::Debug {
    /// Forward propagation through the component.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Batch of samples, one row per sample
    /// * `training` - Whether the call is part of a training step. Only Dropout
    ///   behaves differently; every other component ignores it.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when the feature count does not fit the component.
    fn forward(&mut self, inputs: &Tensor, training: bool) -> Result<Tensor>;

    /// Backward propagation through the component.
    ///
    /// Takes the gradient of the loss with respect to this component's output
    /// and returns the gradient with respect to its input. Parametric
    /// components also record gradients for their parameters.
    fn backward(&mut self, dvalues: &Tensor) -> Result<Tensor>;

    /// Output of the last forward call, if any.
    fn output(&self) -> Option<&Tensor>;

    /// Number of trainable parameters.
    fn parameter_count(&self) -> usize {
        0
    }
}
