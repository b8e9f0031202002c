//! Error types for tempo-core

use thiserror::Error;

/// Core error type for time expression handling.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unrecognized time expression: {0:?}")]
    UnrecognizedExpression(String),

    #[error("Invalid calendar time: {0:?}")]
    InvalidCalendarTime(String),

    #[error("Magnitude overflow in expression: {0:?}")]
    Overflow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
