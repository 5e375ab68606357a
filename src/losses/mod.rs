//! Loss functions and their gradients
//!
//! Every loss turns a batch of predictions into one loss value per sample
//! (`forward`) and returns the gradient of the *mean* loss with respect to the
//! predictions (`backward`), so optimizers can apply it without rescaling.
//!
//! # Available Losses
//!
//! - [`CategoricalCrossEntropy`]: multi-class, sparse or one-hot targets
//! - [`SoftmaxCrossEntropy`]: softmax and categorical cross-entropy fused
//! - [`BinaryCrossEntropy`]: independent sigmoid outputs
//! - [`MeanSquaredError`], [`MeanAbsoluteError`]: regression
//!
//! # Regularization
//!
//! The regularization penalty is not part of the data loss. Callers pass the
//! trainable layers explicitly, in network order, whenever they want it:
//!
//! ```ignore
//! let (data_loss, reg_loss) =
//!     loss.calculate_with_regularization(&output, &targets, &[&dense1, &dense2])?;
//! ```

mod binary_cross_entropy;
mod categorical_cross_entropy;
mod mean_absolute_error;
mod mean_squared_error;
mod softmax_cross_entropy;

pub use binary_cross_entropy::BinaryCrossEntropy;
pub use categorical_cross_entropy::CategoricalCrossEntropy;
pub use mean_absolute_error::MeanAbsoluteError;
pub use mean_squared_error::MeanSquaredError;
pub use softmax_cross_entropy::SoftmaxCrossEntropy;

use ndarray::{Array1, Axis};

use crate::error::{NnError, Result};
use crate::layers::DenseLayer;
use crate::tensor::{ensure_batch, Targets, Tensor};

/// Core trait for loss functions.
pub trait Loss: std::fmt::Debug {
    /// Loss of every sample in the batch.
    fn forward(&self, y_pred: &Tensor, y_true: &Targets) -> Result<Array1<f64>>;

    /// Gradient of the mean batch loss with respect to `dvalues` (the predictions).
    fn backward(&self, dvalues: &Tensor, y_true: &Targets) -> Result<Tensor>;

    /// Mean data loss over the batch.
    fn calculate(&self, output: &Tensor, y_true: &Targets) -> Result<f64> {
        let sample_losses = self.forward(output, y_true)?;
        sample_losses
            .mean()
            .ok_or_else(|| NnError::shape("loss", "at least one sample", 0))
    }

    /// Mean data loss paired with the regularization penalty of `trainable_layers`.
    fn calculate_with_regularization(
        &self,
        output: &Tensor,
        y_true: &Targets,
        trainable_layers: &[&DenseLayer],
    ) -> Result<(f64, f64)> {
        let data_loss = self.calculate(output, y_true)?;
        Ok((data_loss, regularization_loss(trainable_layers)))
    }
}

/// Sum of the L1/L2 penalties of every layer, skipping zero coefficients.
pub fn regularization_loss(trainable_layers: &[&DenseLayer]) -> f64 {
    trainable_layers
        .iter()
        .map(|layer| layer.regularization_loss())
        .sum()
}

/// Checks that targets are a matrix shaped like the predictions and returns it.
fn matching_values<'a>(context: &str, y_pred: &Tensor, y_true: &'a Targets) -> Result<&'a Tensor> {
    ensure_batch(context, y_pred, y_true)?;
    let values = y_true.values(context)?;
    if values.dim() != y_pred.dim() {
        return Err(NnError::shape(context, y_pred.dim(), values.dim()));
    }
    Ok(values)
}

/// Per-row mean of an elementwise loss matrix.
fn mean_per_sample(context: &str, losses: &Tensor) -> Result<Array1<f64>> {
    losses
        .mean_axis(Axis(1))
        .ok_or_else(|| NnError::shape(context, "at least one output", 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::Regularization;
    use ndarray::array;

    #[test]
    fn test_regularization_loss_sums_layers() {
        let reg = Regularization {
            weight_l1: 0.5,
            weight_l2: 0.25,
            bias_l1: 1.0,
            bias_l2: 2.0,
        };
        let layer = DenseLayer::from_parameters(array![[1.0, -2.0]], array![[-1.0, 0.5]])
            .unwrap()
            .with_regularization(reg)
            .unwrap();
        let plain = DenseLayer::from_parameters(array![[3.0]], array![[3.0]]).unwrap();

        // 0.5*3 + 1.0*1.5 + 0.25*5 + 2.0*1.25
        let expected = 1.5 + 1.5 + 1.25 + 2.5;
        assert!((regularization_loss(&[&layer, &plain]) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_registry_has_no_penalty() {
        assert_eq!(regularization_loss(&[]), 0.0);
    }

    #[test]
    fn test_calculate_rejects_empty_batch() {
        let loss = MeanSquaredError::new();
        let empty = Tensor::zeros((0, 2));
        assert!(loss.calculate(&empty, &Targets::from(empty.clone())).is_err());
    }
}
