//! Pure orchestration logic (no IO).
//!
//! Input: resolved configuration, tool outputs and source texts gathered elsewhere.
//! Output: scopes, findings, check results, verdicts and build plans.

#![forbid(unsafe_code)]

pub mod deps;
pub mod diagnostics;
pub mod imports;
pub mod matrix;
pub mod pipeline;
pub mod policy;
pub mod scope;
pub mod template;
pub mod tool;

mod fingerprint;

pub use fingerprint::fingerprint_for_finding;
pub use scope::SourceScope;
