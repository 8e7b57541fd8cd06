//! Stable DTOs and IDs used across the buildgate workspace.
//!
//! This crate is intentionally boring:
//! - data types for findings, check results and the emitted report
//! - stable string IDs and codes
//! - canonical repo-relative path handling
//! - the error taxonomy shared by every layer
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod build;
pub mod error;
pub mod explain;
pub mod ids;
pub mod path;
pub mod report;
pub mod version;

pub use build::{BuildFailure, BuildOutcome, BuildTarget, BuiltArtifact};
pub use error::Error;
pub use explain::{Explanation, lookup_explanation};
pub use path::RepoPath;
pub use report::{
    AggregateResult, CheckMode, CheckResult, Finding, Location, ReportData, ReportEnvelope,
    SCHEMA_REPORT_V1, Severity, ToolMeta, Verdict,
};
pub use version::VersionInfo;
