//! Error types for the core crate.
//!
//! Geometry and model problems are almost always handled by skipping the
//! offending input and logging (a partial plan is still useful), so the
//! surface here is small. Device-side errors live in `cutkit-device`.

use thiserror::Error;

/// Core error type for the geometry kernel and point/path model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Input geometry is degenerate (empty path list, single-point path, ...)
    #[error("degenerate geometry: {reason}")]
    InvalidGeometry {
        /// What made the input degenerate.
        reason: String,
    },

    /// A point id does not belong to this arena.
    #[error("unknown point id {0}")]
    UnknownPoint(usize),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
