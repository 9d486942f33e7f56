//! Cross-cutting error types for glscan.
//!
//! HTTP and configuration errors live in their own crates. This module only
//! covers failures that can happen while turning matched projects into a
//! report.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The report could not be serialized as CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The report could not be written to its destination.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
