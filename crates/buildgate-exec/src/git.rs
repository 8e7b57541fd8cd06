use crate::runner::ToolRunner;
use buildgate_domain::tool::Invocation;
use std::sync::Arc;

/// Commit identity of the working tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VcsRevision {
    pub commit: String,
    /// Uncommitted modifications are present.
    pub dirty: bool,
}

/// Where build identity comes from when it is not a plain file.
pub trait RevisionSource: Send + Sync {
    /// `None` when the root is not under version control (or git is unavailable).
    fn revision(&self) -> Option<VcsRevision>;

    /// Nearest tag, falling back to the abbreviated commit.
    fn describe(&self) -> Option<String>;
}

/// Queries git through a [`ToolRunner`].
#[derive(Clone)]
pub struct GitRevision {
    runner: Arc<dyn ToolRunner>,
}

impl GitRevision {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    fn git(&self, args: &[&str]) -> Option<String> {
        let argv = std::iter::once("git")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();
        let inv = Invocation::from_argv(argv)?;
        let out = self.runner.run(&inv);
        if !out.success() {
            tracing::debug!(
                command = %inv.display(),
                reason = %out.describe_failure(),
                stderr = %out.stderr.trim(),
                "git query failed"
            );
            return None;
        }
        Some(out.stdout)
    }
}

impl RevisionSource for GitRevision {
    fn revision(&self) -> Option<VcsRevision> {
        let commit = self.git(&["rev-parse", "--short", "HEAD"])?.trim().to_string();
        if commit.is_empty() {
            return None;
        }
        // If status itself fails we cannot prove the tree is clean.
        let dirty = self
            .git(&["status", "--porcelain"])
            .is_none_or(|s| !s.trim().is_empty());
        Some(VcsRevision { commit, dirty })
    }

    fn describe(&self) -> Option<String> {
        let tag = self.git(&["describe", "--tags", "--always"])?.trim().to_string();
        (!tag.is_empty()).then_some(tag)
    }
}
