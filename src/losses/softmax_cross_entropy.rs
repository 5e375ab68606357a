use crate::activations::{Activation, Predictions, Softmax};
use crate::error::{NnError, Result};
use crate::layers::{DenseLayer, Layer};
use crate::losses::{regularization_loss, CategoricalCrossEntropy, Loss};
use crate::tensor::{ensure_same_shape, Targets, Tensor};

/// Softmax activation fused with categorical cross-entropy.
///
/// The backward pass skips the softmax Jacobian entirely: the gradient of the
/// composed function with respect to the logits is `(p − y) / batch`, which is
/// what running both backward passes in sequence produces, at a fraction of
/// the cost and without dividing by tiny probabilities.
#[derive(Debug, Default)]
pub struct SoftmaxCrossEntropy {
    activation: Softmax,
    loss: CategoricalCrossEntropy,
}

impl SoftmaxCrossEntropy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs softmax on `inputs` and returns the mean data loss.
    pub fn forward(&mut self, inputs: &Tensor, y_true: &Targets) -> Result<f64> {
        let output = self.activation.forward(inputs, true)?;
        self.loss.calculate(&output, y_true)
    }

    /// Like [`forward`](Self::forward), also returning the penalty of `trainable_layers`.
    pub fn forward_with_regularization(
        &mut self,
        inputs: &Tensor,
        y_true: &Targets,
        trainable_layers: &[&DenseLayer],
    ) -> Result<(f64, f64)> {
        let data_loss = self.forward(inputs, y_true)?;
        Ok((data_loss, regularization_loss(trainable_layers)))
    }

    /// Gradient of the mean loss with respect to the logits.
    ///
    /// `dvalues` is the softmax output; one-hot targets must match its shape and
    /// are then collapsed to indices.
    pub fn backward(&self, dvalues: &Tensor, y_true: &Targets) -> Result<Tensor> {
        let samples = dvalues.nrows();
        let classes = dvalues.ncols();
        if let Targets::Values(one_hot) = y_true {
            ensure_same_shape("softmax cross-entropy backward", dvalues, one_hot)?;
        }
        let indices = y_true.to_indices();
        if indices.len() != samples {
            return Err(NnError::shape(
                "softmax cross-entropy backward",
                format!("{} samples", samples),
                format!("{} samples", indices.len()),
            ));
        }

        let mut dinputs = dvalues.clone();
        for (row, &class) in indices.iter().enumerate() {
            if class >= classes {
                return Err(NnError::shape(
                    "softmax cross-entropy backward",
                    format!("class index < {}", classes),
                    class,
                ));
            }
            dinputs[[row, class]] -= 1.0;
        }
        Ok(dinputs / samples as f64)
    }

    /// Softmax output of the last forward call.
    pub fn output(&self) -> Option<&Tensor> {
        self.activation.output()
    }

    pub fn predictions(&self, outputs: &Tensor) -> Predictions {
        self.activation.predictions(outputs)
    }
}
