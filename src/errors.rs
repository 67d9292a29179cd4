//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`SinewError`] covers the failure modes of the
//! load-time path:
//! - Malformed imported keyframe data
//! - Invalid bind transforms
//! - Lookups by name that cannot be satisfied
//! - Configuration parsing
//!
//! Per-frame operations (sampling, evaluation, IK) never return errors. They
//! report missing data through `bool`/`Option` values and guard numerical
//! edge cases in place, so a bad frame degrades instead of aborting.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sinew::errors::{SinewError, Result};
//!
//! fn load() -> Result<()> {
//!     let model = SkinnedModel::from_import(&scene)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::animation::TargetPath;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum SinewError {
    // ========================================================================
    // Import Errors
    // ========================================================================
    /// A channel was imported with no samples at all.
    #[error("Empty {target:?} track for node '{node}' in clip '{clip}'")]
    EmptyTrack {
        clip: String,
        node: String,
        target: TargetPath,
    },

    /// Sample times must be non-decreasing within a track.
    #[error("Keyframe times decrease at index {index} of {target:?} track for node '{node}' in clip '{clip}'")]
    UnsortedKeyframes {
        clip: String,
        node: String,
        target: TargetPath,
        index: usize,
    },

    /// Uniform scale must be strictly positive.
    #[error("Invalid scale {scale} on '{context}'")]
    InvalidScale { context: String, scale: f32 },

    /// An imported matrix or sample contains NaN or infinity.
    #[error("Non-finite transform on '{0}'")]
    NonFiniteTransform(String),

    /// Two clips share the same name.
    #[error("Duplicate animation clip: {0}")]
    DuplicateClip(String),

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// The requested joint does not exist in the hierarchy.
    #[error("Joint not found: {0}")]
    JointNotFound(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, SinewError>`.
pub type Result<T> = std::result::Result<T, SinewError>;
