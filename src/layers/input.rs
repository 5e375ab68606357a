//! Input adapter that turns caller data into the canonical `f64` tensor.

use ndarray::{ArrayBase, Data, Ix2};

use crate::error::{NnError, Result};
use crate::tensor::Tensor;

/// Leaf of the network: converts raw numeric data into a [`Tensor`].
///
/// It has no parameters and no backward pass.
#[derive(Debug, Default)]
pub struct InputLayer {
    output: Option<Tensor>,
}

impl InputLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts any 2-D array of numbers losslessly convertible to `f64`.
    pub fn forward<A, S>(&mut self, raw: &ArrayBase<S, Ix2>) -> Tensor
    where
        A: Copy + Into<f64>,
        S: Data<Elem = A>,
    {
        let output: Tensor = raw.mapv(Into::into);
        self.output = Some(output.clone());
        output
    }

    /// Converts row-major nested data, rejecting ragged rows.
    pub fn forward_rows<A>(&mut self, rows: &[Vec<A>]) -> Result<Tensor>
    where
        A: Copy + Into<f64>,
    {
        let width = rows.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(rows.len() * width);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(NnError::shape(
                    format!("input row {}", index),
                    width,
                    row.len(),
                ));
            }
            flat.extend(row.iter().map(|&value| value.into()));
        }

        let output = Tensor::from_shape_vec((rows.len(), width), flat)
            .map_err(|err| NnError::shape("input rows", (rows.len(), width), err.to_string()))?;
        self.output = Some(output.clone());
        Ok(output)
    }

    pub fn output(&self) -> Option<&Tensor> {
        self.output.as_ref()
    }
}
