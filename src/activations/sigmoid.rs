use crate::activations::{Activation, ActivationKind, Predictions};
use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::tensor::{ensure_same_shape, Tensor};

/// Logistic sigmoid: `1 / (1 + e^-x)`.
#[derive(Debug, Default)]
pub struct Sigmoid {
    output: Option<Tensor>,
}

impl Sigmoid {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for Sigmoid {
    fn forward(&mut self, inputs: &Tensor, _training: bool) -> Result<Tensor> {
        let output = inputs.mapv(|x| 1.0 / (1.0 + (-x).exp()));
        self.output = Some(output.clone());
        Ok(output)
    }

    /// `dvalues × σ × (1 − σ)`, computed from the stored output.
    fn backward(&mut self, dvalues: &Tensor) -> Result<Tensor> {
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| NnError::uninitialized("Sigmoid", "backward"))?;
        ensure_same_shape("sigmoid backward", output, dvalues)?;

        let mut dinputs = dvalues.clone();
        dinputs.zip_mut_with(output, |d, &s| *d *= s * (1.0 - s));
        Ok(dinputs)
    }

    fn output(&self) -> Option<&Tensor> {
        self.output.as_ref()
    }
}

impl Activation for Sigmoid {
    /// Thresholds each unit independently at 0.5.
    fn predictions(&self, outputs: &Tensor) -> Predictions {
        Predictions::Binary(outputs.mapv(|p| u8::from(p > 0.5)))
    }

    fn kind(&self) -> ActivationKind {
        ActivationKind::Sigmoid
    }
}
