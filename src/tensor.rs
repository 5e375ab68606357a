//! Shared tensor glue.
//!
//! Every activation flowing between components is a dense `(batch, features)`
//! matrix of `f64`. This module holds the alias for it, the target encodings
//! accepted by the losses, and the shape/finiteness guards used before any
//! operation that could otherwise broadcast silently or propagate NaN.

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Dimension};

use crate::error::{NnError, Result};

/// Dense `(batch, features)` matrix of 64-bit floats.
pub type Tensor = Array2<f64>;

/// Predictions are clipped to `[CLIP_EPSILON, 1 - CLIP_EPSILON]` before any log.
pub const CLIP_EPSILON: f64 = 1e-7;

/// Ground truth handed to a loss.
///
/// Classification losses accept either encoding; regression and binary
/// losses need `Values` with the same shape as the predictions.
#[derive(Debug, Clone, PartialEq)]
pub enum Targets {
    /// One class index per sample (rank 1).
    Indices(Array1<usize>),
    /// One row per sample: one-hot rows, binary targets or regression values.
    Values(Tensor),
}

impl Targets {
    /// Number of samples described by the targets.
    pub fn len(&self) -> usize {
        match self {
            Targets::Indices(indices) => indices.len(),
            Targets::Values(values) => values.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expands class indices into one-hot rows of width `classes`.
    ///
    /// `Values` are returned as-is after checking their width.
    pub fn to_one_hot(&self, classes: usize) -> Result<Tensor> {
        match self {
            Targets::Indices(indices) => {
                let mut one_hot = Tensor::zeros((indices.len(), classes));
                for (row, &class) in indices.iter().enumerate() {
                    if class >= classes {
                        return Err(NnError::shape(
                            "one-hot encoding",
                            format!("class index < {}", classes),
                            class,
                        ));
                    }
                    one_hot[[row, class]] = 1.0;
                }
                Ok(one_hot)
            }
            Targets::Values(values) => {
                if values.ncols() != classes {
                    return Err(NnError::shape(
                        "one-hot encoding",
                        (values.nrows(), classes),
                        values.dim(),
                    ));
                }
                Ok(values.clone())
            }
        }
    }

    /// Collapses one-hot rows to their arg-max class index.
    pub fn to_indices(&self) -> Array1<usize> {
        match self {
            Targets::Indices(indices) => indices.clone(),
            Targets::Values(values) => argmax_rows(values),
        }
    }

    /// Borrows the target matrix, rejecting sparse labels.
    pub fn values(&self, context: &str) -> Result<&Tensor> {
        match self {
            Targets::Values(values) => Ok(values),
            Targets::Indices(indices) => Err(NnError::shape(
                context,
                "target matrix (batch, outputs)",
                format!("class indices of length {}", indices.len()),
            )),
        }
    }
}

impl From<Array1<usize>> for Targets {
    fn from(indices: Array1<usize>) -> Self {
        Targets::Indices(indices)
    }
}

impl From<Tensor> for Targets {
    fn from(values: Tensor) -> Self {
        Targets::Values(values)
    }
}

/// Row-wise arg-max; ties resolve to the lowest index.
pub fn argmax_rows(values: &Tensor) -> Array1<usize> {
    values
        .axis_iter(Axis(0))
        .map(|row| {
            let mut best = 0;
            for (index, &value) in row.iter().enumerate() {
                if value > row[best] {
                    best = index;
                }
            }
            best
        })
        .collect()
}

pub(crate) fn ensure_same_shape(context: &str, expected: &Tensor, found: &Tensor) -> Result<()> {
    if expected.dim() != found.dim() {
        return Err(NnError::shape(context, expected.dim(), found.dim()));
    }
    Ok(())
}

pub(crate) fn ensure_batch(context: &str, predictions: &Tensor, targets: &Targets) -> Result<()> {
    if predictions.nrows() != targets.len() {
        return Err(NnError::shape(
            context,
            format!("{} samples", predictions.nrows()),
            format!("{} samples", targets.len()),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_finite<S, D>(context: &str, values: &ArrayBase<S, D>) -> Result<()>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(NnError::NumericDomain {
            context: context.to_string(),
        })
    }
}
