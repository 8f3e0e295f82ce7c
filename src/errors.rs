//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`TalusError`] covers all failure modes including:
//! - Configuration errors that abort a batch before any mutation
//! - Per-target geometric failures recorded in an alignment result
//! - Numerical degeneracies in basis construction
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, TalusError>`.
//!
//! ```rust,ignore
//! use talus::errors::{TalusError, Result};
//!
//! fn build_frame() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Talus engine.
///
/// Configuration-level variants (`NoSelection`, `InvalidSurface`) abort a
/// batch before any scene mutation. Geometric variants are isolated per
/// target and recorded in that target's [`AlignmentResult`].
///
/// [`AlignmentResult`]: crate::snap::AlignmentResult
#[derive(Error, Debug, Clone)]
pub enum TalusError {
    // ========================================================================
    // Configuration Errors (abort before any mutation)
    // ========================================================================
    /// No target supplied to a batch operation.
    #[error("Nothing is selected, at least one target is required")]
    NoSelection,

    /// The reference surface is missing or has no renderable geometry.
    #[error("Invalid reference surface: {0}")]
    InvalidSurface(String),

    // ========================================================================
    // Per-Target Geometric Errors (batch continues)
    // ========================================================================
    /// The ray from a target did not hit the reference surface.
    #[error("Ray does not intersect the reference surface")]
    NoIntersection,

    /// A vector required by basis construction had near-zero magnitude.
    #[error("Degenerate vector while computing {0}")]
    DegenerateVector(&'static str),

    /// Both the primary and fallback frame axes were degenerate.
    #[error("Degenerate basis: no stable side axis could be chosen")]
    DegenerateBasis,

    /// A supplied node handle no longer resolves to a live node.
    #[error("Node handle does not resolve to a live scene node")]
    NodeNotFound,
}

/// Alias for `Result<T, TalusError>`.
pub type Result<T> = std::result::Result<T, TalusError>;
