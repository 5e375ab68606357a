use ndarray::Array1;

use crate::error::Result;
use crate::losses::{matching_values, mean_per_sample, Loss};
use crate::tensor::{Targets, Tensor};

/// Mean squared error (L2 loss), averaged over output units.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSquaredError;

impl MeanSquaredError {
    pub fn new() -> Self {
        Self
    }
}

impl Loss for MeanSquaredError {
    fn forward(&self, y_pred: &Tensor, y_true: &Targets) -> Result<Array1<f64>> {
        let y_true = matching_values("mean squared error", y_pred, y_true)?;
        let squared = (y_true - y_pred).mapv(|r| r * r);
        mean_per_sample("mean squared error", &squared)
    }

    fn backward(&self, dvalues: &Tensor, y_true: &Targets) -> Result<Tensor> {
        let y_true = matching_values("mean squared error backward", dvalues, y_true)?;
        let samples = dvalues.nrows() as f64;
        let outputs = dvalues.ncols() as f64;
        Ok((y_true - dvalues) * (-2.0 / outputs) / samples)
    }
}
