use crate::activations::{Activation, ActivationKind, Predictions};
use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::tensor::{ensure_same_shape, Tensor};

/// Rectified linear unit: `max(0, x)`.
#[derive(Debug, Default)]
pub struct ReLU {
    inputs: Option<Tensor>,
    output: Option<Tensor>,
}

impl ReLU {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for ReLU {
    fn forward(&mut self, inputs: &Tensor, _training: bool) -> Result<Tensor> {
        let output = inputs.mapv(|x| x.max(0.0));
        self.inputs = Some(inputs.clone());
        self.output = Some(output.clone());
        Ok(output)
    }

    /// Passes gradients through where the input was strictly positive.
    fn backward(&mut self, dvalues: &Tensor) -> Result<Tensor> {
        let inputs = self
            .inputs
            .as_ref()
            .ok_or_else(|| NnError::uninitialized("ReLU", "backward"))?;
        ensure_same_shape("relu backward", inputs, dvalues)?;

        let mut dinputs = dvalues.clone();
        dinputs.zip_mut_with(inputs, |d, &x| {
            if x <= 0.0 {
                *d = 0.0;
            }
        });
        Ok(dinputs)
    }

    fn output(&self) -> Option<&Tensor> {
        self.output.as_ref()
    }
}

impl Activation for ReLU {
    fn predictions(&self, outputs: &Tensor) -> Predictions {
        Predictions::Values(outputs.clone())
    }

    fn kind(&self) -> ActivationKind {
        ActivationKind::Relu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_relu_mixed() {
        let mut relu = ReLU::new();
        let output = relu
            .forward(&array![[-2.0, -1.0, 0.0, 1.0, 2.0]], false)
            .unwrap();
        assert_eq!(output, array![[0.0, 0.0, 0.0, 1.0, 2.0]]);
    }

    #[test]
    fn test_relu_zero_input_has_zero_gradient() {
        let mut relu = ReLU::new();
        relu.forward(&array![[-1.0, 0.0, 3.0]], true).unwrap();
        let dinputs = relu.backward(&array![[5.0, 5.0, 5.0]]).unwrap();
        assert_eq!(dinputs, array![[0.0, 0.0, 5.0]]);
    }

    #[test]
    fn test_backward_before_forward() {
        let mut relu = ReLU::new();
        assert!(matches!(
            relu.backward(&array![[1.0]]),
            Err(NnError::UninitializedState { .. })
        ));
    }
}
