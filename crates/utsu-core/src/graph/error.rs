//! Audio graph error types

use thiserror::Error;

use super::NodeRef;

/// Errors reported by the platform audio graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Source locator could not be resolved or decoded
    #[error("Failed to load source {locator}: {reason}")]
    LoadFailed { locator: String, reason: String },

    /// Play request rejected by the platform
    #[error("Play request rejected: {0}")]
    PlayRejected(String),

    /// Play requested while the context is suspended
    #[error("Audio context is suspended")]
    ContextSuspended,

    /// Context could not be resumed
    #[error("Failed to resume audio context: {0}")]
    ResumeFailed(String),

    /// Play requested on a source with nothing bound
    #[error("Source has no locator bound")]
    Unbound,

    /// Handle does not belong to this graph
    #[error("Unknown graph node: {0:?}")]
    UnknownNode(NodeRef),
}

/// Result type for audio graph operations
pub type GraphResult<T> = Result<T, GraphError>;
