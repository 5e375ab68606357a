//! Shared utilities
//!
//! Currently the learning-rate schedule shared by every optimizer.

pub mod lr_scheduler;
