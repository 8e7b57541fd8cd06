//! Use case orchestration for buildgate.
//!
//! This crate provides the application layer: use cases that coordinate the domain, repo, exec
//! and render layers. The CLI crate depends on this and only handles argument parsing and IO.

#![forbid(unsafe_code)]

mod build;
mod check;
mod clean;
mod context;
mod deps;
mod explain;
mod package;
mod render;
mod report;
mod version;

#[cfg(test)]
mod test_support;

pub use build::{resolve_targets, run_build};
pub use check::{CheckRequest, CheckRun, run_checks, run_meta_check};
pub use clean::run_clean;
pub use context::{AppContext, load_config};
pub use deps::{DependencyCheckRun, run_dependency_check};
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use package::{PackageRun, run_package};
pub use render::{DiagnosticFormat, render_diagnostics, render_markdown};
pub use report::{
    ReportInput, build_report, check_exit_code, serialize_report, verdict_exit_code, write_output,
    write_report,
};
pub use version::{BuilderIdentity, UNKNOWN_REVISION, compute_version, format_version};
