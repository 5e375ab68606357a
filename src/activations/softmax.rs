//! Softmax activation for multi-class outputs.

use ndarray::{Array2, Axis, Zip};

use crate::activations::{Activation, ActivationKind, Predictions};
use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::tensor::{argmax_rows, ensure_same_shape, Tensor};

/// Row-wise softmax.
///
/// Uses the max-subtraction trick so that large logits do not overflow; every
/// output row is a probability distribution.
#[derive(Debug, Default)]
pub struct Softmax {
    output: Option<Tensor>,
}

impl Softmax {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stabilized softmax of every row of `inputs`.
pub(crate) fn softmax_rows(inputs: &Tensor) -> Tensor {
    let mut output = inputs.clone();
    for mut row in output.rows_mut() {
        let max_value = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|x| (x - max_value).exp());
        let sum = row.sum();
        row.mapv_inplace(|x| x / sum);
    }
    output
}

impl Layer for Softmax {
    fn forward(&mut self, inputs: &Tensor, _training: bool) -> Result<Tensor> {
        let output = softmax_rows(inputs);
        self.output = Some(output.clone());
        Ok(output)
    }

    /// Contracts each sample's Jacobian `diag(p) − p·pᵗ` with its gradient row.
    fn backward(&mut self, dvalues: &Tensor) -> Result<Tensor> {
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| NnError::uninitialized("Softmax", "backward"))?;
        ensure_same_shape("softmax backward", output, dvalues)?;

        let mut dinputs = Tensor::zeros(dvalues.raw_dim());
        Zip::from(dinputs.rows_mut())
            .and(output.rows())
            .and(dvalues.rows())
            .for_each(|mut dinput, probabilities, gradient| {
                let column = probabilities.insert_axis(Axis(1));
                let jacobian = Array2::from_diag(&probabilities) - column.dot(&column.t());
                dinput.assign(&jacobian.dot(&gradient));
            });
        Ok(dinputs)
    }

    fn output(&self) -> Option<&Tensor> {
        self.output.as_ref()
    }
}

impl Activation for Softmax {
    fn predictions(&self, outputs: &Tensor) -> Predictions {
        Predictions::Classes(argmax_rows(outputs))
    }

    fn kind(&self) -> ActivationKind {
        ActivationKind::Softmax
    }
}
