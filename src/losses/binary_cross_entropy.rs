use ndarray::Array1;

use crate::error::Result;
use crate::losses::{matching_values, mean_per_sample, Loss};
use crate::tensor::{ensure_finite, Targets, Tensor, CLIP_EPSILON};

/// Binary cross-entropy over independent sigmoid outputs.
///
/// Per-sample loss is the mean (not the sum) over output units.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCrossEntropy;

impl BinaryCrossEntropy {
    pub fn new() -> Self {
        Self
    }
}

fn clip(p: f64) -> f64 {
    p.clamp(CLIP_EPSILON, 1.0 - CLIP_EPSILON)
}

impl Loss for BinaryCrossEntropy {
    fn forward(&self, y_pred: &Tensor, y_true: &Targets) -> Result<Array1<f64>> {
        let y_true = matching_values("binary cross-entropy", y_pred, y_true)?;

        let mut losses = y_pred.mapv(clip);
        losses.zip_mut_with(y_true, |p, &y| {
            *p = -(y * p.ln() + (1.0 - y) * (1.0 - *p).ln());
        });

        let sample_losses = mean_per_sample("binary cross-entropy", &losses)?;
        ensure_finite("binary cross-entropy forward", &sample_losses)?;
        Ok(sample_losses)
    }

    fn backward(&self, dvalues: &Tensor, y_true: &Targets) -> Result<Tensor> {
        let y_true = matching_values("binary cross-entropy backward", dvalues, y_true)?;
        let samples = dvalues.nrows() as f64;
        let outputs = dvalues.ncols() as f64;

        let mut dinputs = dvalues.mapv(clip);
        dinputs.zip_mut_with(y_true, |p, &y| {
            *p = -(y / *p - (1.0 - y) / (1.0 - *p)) / outputs / samples;
        });
        ensure_finite("binary cross-entropy backward", &dinputs)?;
        Ok(dinputs)
    }
}
