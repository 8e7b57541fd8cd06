use crate::RepoPath;
use serde::{Deserialize, Serialize};

/// One entry of the fixed cross-compilation matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    pub id: String,
    pub os: String,
    pub arch: String,
    /// Repo-relative directory the target's binaries are written to.
    pub output_dir: RepoPath,
}

impl BuildTarget {
    /// Executable suffix, a property of the target OS (never of the host).
    pub fn exe_suffix(&self) -> &'static str {
        if self.os.eq_ignore_ascii_case("windows") {
            ".exe"
        } else {
            ""
        }
    }

    /// Executable file name for an entry point on this target.
    pub fn executable_name(&self, entry_name: &str) -> String {
        format!("{}{}", entry_name, self.exe_suffix())
    }

    /// Repo-relative artifact path for an entry point on this target.
    pub fn artifact_path(&self, entry_name: &str) -> RepoPath {
        self.output_dir.join(&self.executable_name(entry_name))
    }

    /// A selector matches a target by id or by operating system.
    pub fn matches(&self, selector: &str) -> bool {
        self.id == selector || self.os == selector
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltArtifact {
    pub entry_point: RepoPath,
    pub target_id: String,
    pub path: RepoPath,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFailure {
    pub entry_point: RepoPath,
    pub target_id: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutcome {
    pub artifacts: Vec<BuiltArtifact>,
    pub failures: Vec<BuildFailure>,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
