//! Layer abstractions for neural networks
//!
//! This module provides the Layer trait and the non-activation layers: the
//! input adapter, the fully connected layer and dropout.

mod r#trait;
pub mod dense;
pub mod dropout;
pub mod input;

// Re-export the Layer trait for convenience
pub use dense::{DenseLayer, OptimizerState, ParamPair, Regularization};
pub use dropout::DropoutLayer;
pub use input::InputLayer;
pub use r#trait::Layer;
