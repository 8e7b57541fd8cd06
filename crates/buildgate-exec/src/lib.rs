//! Process plumbing: the only crate that spawns external programs.
//!
//! - [`ToolRunner`] runs one fully expanded [`Invocation`] and captures its output
//! - [`GitRevision`] queries git as a data source for build identity
//! - [`WorkerPool`] fans independent units out over a bounded rayon pool
//!
//! [`Invocation`]: buildgate_domain::tool::Invocation

#![forbid(unsafe_code)]

mod git;
mod pool;
mod runner;

pub use git::{GitRevision, RevisionSource, VcsRevision};
pub use pool::{CancelToken, WorkerPool};
pub use runner::{ProcessRunner, ToolRunner};
