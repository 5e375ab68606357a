use crate::activations::{Activation, ActivationKind, Predictions};
use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::tensor::{ensure_same_shape, Tensor};

/// Identity activation, used as the output of regression networks.
#[derive(Debug, Default)]
pub struct Linear {
    output: Option<Tensor>,
}

impl Linear {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for Linear {
    fn forward(&mut self, inputs: &Tensor, _training: bool) -> Result<Tensor> {
        self.output = Some(inputs.clone());
        Ok(inputs.clone())
    }

    fn backward(&mut self, dvalues: &Tensor) -> Result<Tensor> {
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| NnError::uninitialized("Linear", "backward"))?;
        ensure_same_shape("linear backward", output, dvalues)?;
        Ok(dvalues.clone())
    }

    fn output(&self) -> Option<&Tensor> {
        self.output.as_ref()
    }
}

impl Activation for Linear {
    fn predictions(&self, outputs: &Tensor) -> Predictions {
        Predictions::Values(outputs.clone())
    }

    fn kind(&self) -> ActivationKind {
        ActivationKind::Linear
    }
}
