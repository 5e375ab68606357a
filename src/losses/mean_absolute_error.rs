use ndarray::Array1;

use crate::error::Result;
use crate::losses::{matching_values, mean_per_sample, Loss};
use crate::tensor::{Targets, Tensor};

/// Mean absolute error (L1 loss), averaged over output units.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanAbsoluteError;

impl MeanAbsoluteError {
    pub fn new() -> Self {
        Self
    }
}

/// Sign with `sign(0) == 0`, unlike `f64::signum`.
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl Loss for MeanAbsoluteError {
    fn forward(&self, y_pred: &Tensor, y_true: &Targets) -> Result<Array1<f64>> {
        let y_true = matching_values("mean absolute error", y_pred, y_true)?;
        let absolute = (y_true - y_pred).mapv(f64::abs);
        mean_per_sample("mean absolute error", &absolute)
    }

    /// `-sign(y_true − y_pred) / outputs / samples`, i.e. the derivative of
    /// `|y_true − y_pred|` with respect to the prediction.
    fn backward(&self, dvalues: &Tensor, y_true: &Targets) -> Result<Tensor> {
        let y_true = matching_values("mean absolute error backward", dvalues, y_true)?;
        let samples = dvalues.nrows() as f64;
        let outputs = dvalues.ncols() as f64;
        Ok((y_true - dvalues).mapv(|r| -sign(r) / outputs / samples))
    }
}
