//! Mixer error types

use thiserror::Error;

use crate::graph::GraphError;

/// Errors returned by mixer operations
///
/// Per-channel load and play failures are not errors: they are reported
/// through the event sink and the remaining channels carry on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MixerError {
    #[error("Invalid channel index {0}")]
    InvalidChannel(usize),

    #[error("Parameter value must be finite, got {0}")]
    NonFiniteValue(f32),

    #[error("Invalid track index {index} (catalog has {count} tracks)")]
    InvalidTrack { index: usize, count: usize },

    #[error("Failed to build audio graph: {0}")]
    Graph(#[from] GraphError),
}

/// Result type for mixer operations
pub type MixerResult<T> = Result<T, MixerError>;
