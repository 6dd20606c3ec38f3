//! Animation error types

use thiserror::Error;

/// Errors raised by timelines, key frames and timed animations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// An argument was rejected before anything was mutated
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not possible in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
