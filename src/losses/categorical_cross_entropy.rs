use ndarray::{Array1, Axis};

use crate::error::{NnError, Result};
use crate::losses::Loss;
use crate::tensor::{ensure_batch, ensure_finite, Targets, Tensor, CLIP_EPSILON};

/// Categorical cross-entropy: `-log(p_correct)` per sample.
///
/// Accepts sparse class indices or one-hot rows. Predictions are clipped to
/// `[1e-7, 1 - 1e-7]` so that neither a zero nor a one can dominate the mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {
    pub fn new() -> Self {
        Self
    }
}

impl Loss for CategoricalCrossEntropy {
    fn forward(&self, y_pred: &Tensor, y_true: &Targets) -> Result<Array1<f64>> {
        ensure_batch("categorical cross-entropy", y_pred, y_true)?;
        let clipped = y_pred.mapv(|p| p.clamp(CLIP_EPSILON, 1.0 - CLIP_EPSILON));

        let correct_confidences = match y_true {
            Targets::Indices(indices) => {
                let classes = clipped.ncols();
                indices
                    .iter()
                    .enumerate()
                    .map(|(row, &class)| {
                        if class >= classes {
                            Err(NnError::shape(
                                "categorical cross-entropy",
                                format!("class index < {}", classes),
                                class,
                            ))
                        } else {
                            Ok(clipped[[row, class]])
                        }
                    })
                    .collect::<Result<Array1<f64>>>()?
            }
            Targets::Values(one_hot) => {
                if one_hot.dim() != clipped.dim() {
                    return Err(NnError::shape(
                        "categorical cross-entropy",
                        clipped.dim(),
                        one_hot.dim(),
                    ));
                }
                (&clipped * one_hot).sum_axis(Axis(1))
            }
        };

        let losses = correct_confidences.mapv(|p| -p.ln());
        ensure_finite("categorical cross-entropy forward", &losses)?;
        Ok(losses)
    }

    /// `-y_true / dvalues`, averaged over the batch; sparse labels are expanded first.
    fn backward(&self, dvalues: &Tensor, y_true: &Targets) -> Result<Tensor> {
        ensure_batch("categorical cross-entropy backward", dvalues, y_true)?;
        let samples = dvalues.nrows() as f64;
        let one_hot = y_true.to_one_hot(dvalues.ncols())?;

        let dinputs = -(&one_hot / dvalues) / samples;
        ensure_finite("categorical cross-entropy backward", &dinputs)?;
        Ok(dinputs)
    }
}
