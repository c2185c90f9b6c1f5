//! Platform error types

use thiserror::Error;

/// Errors raised while resolving host surfaces
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// No viewport matched the selector
    #[error("viewport surface not found: {0}")]
    ViewportUnresolved(String),

    /// No content surface matched the selector
    #[error("content surface not found: {0}")]
    ContentUnresolved(String),

    /// The host refused to provide a surface
    #[error("surface unavailable: {0}")]
    Unavailable(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, SurfaceError>;
