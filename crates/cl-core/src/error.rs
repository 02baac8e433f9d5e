//! Workspace error type.
//!
//! Sub-crates define their own error enums (`SpatialError`, `LatticeError`)
//! and wrap `ClError` where a configuration problem surfaces through them.

use thiserror::Error;

/// The top-level error type for `cl-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum ClError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `cl-*` crates.
pub type ClResult<T> = Result<T, ClError>;
