//! Error types shared by every layer, activation, loss and optimizer.
//!
//! Failures are never recovered inside the crate: each one indicates either a
//! caller ordering bug, incompatible operands, or bad hyperparameters, and is
//! handed straight back to whoever drives the training step.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NnError>;

/// Everything that can go wrong in a forward, backward or update call.
#[derive(Debug, Error)]
pub enum NnError {
    /// Operand dimensions are incompatible for a matrix product, a broadcast
    /// or an elementwise combination.
    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// `backward` (or an optimizer update) ran before the forward pass that
    /// produces the state it consumes.
    #[error("{component}: `{operation}` called before the state it needs was produced")]
    UninitializedState {
        component: &'static str,
        operation: &'static str,
    },

    /// A log, division or square root produced a non-finite value.
    #[error("non-finite value produced in {context}")]
    NumericDomain { context: String },

    /// A hyperparameter was rejected at construction time.
    #[error("invalid {parameter} = {value}: {reason}")]
    Configuration {
        parameter: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl NnError {
    pub(crate) fn shape(
        context: impl Into<String>,
        expected: impl std::fmt::Debug,
        found: impl std::fmt::Debug,
    ) -> Self {
        NnError::ShapeMismatch {
            context: context.into(),
            expected: format!("{:?}", expected),
            found: format!("{:?}", found),
        }
    }

    pub(crate) fn uninitialized(component: &'static str, operation: &'static str) -> Self {
        NnError::UninitializedState {
            component,
            operation,
        }
    }

    pub(crate) fn config(
        parameter: &'static str,
        value: impl std::fmt::Display,
        reason: &'static str,
    ) -> Self {
        NnError::Configuration {
            parameter,
            value: value.to_string(),
            reason,
        }
    }
}
