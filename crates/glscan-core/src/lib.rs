//! # glscan-core
//!
//! Core types shared across all glscan crates:
//! - GitLab project entities as returned by the listing endpoint
//! - Report entries and the report builder (sort + CSV serialization)
//! - Cross-cutting error types

pub mod entities;
pub mod errors;
pub mod report;

pub use entities::{Project, ProjectId};
pub use errors::CoreError;
pub use report::{ReportBuilder, ReportEntry};
