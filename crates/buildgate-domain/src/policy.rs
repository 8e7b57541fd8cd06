use buildgate_types::{BuildTarget, CheckMode, Error, RepoPath};
use std::collections::BTreeMap;

/// How an external tool reports its findings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// `path:line[:col]: message` lines; other lines are ignored.
    Diagnostics,
    /// Each non-empty line is an offending file path.
    FileList,
    /// Only the exit status matters; non-zero yields one finding with the output tail.
    ExitStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckKind {
    External {
        command: Vec<String>,
        format: OutputFormat,
        /// Message used for `FileList` findings.
        message: Option<String>,
    },
    /// The built-in vendored dependency reconciliation.
    Dependencies,
    /// Union of several registered checks.
    Meta { constituents: Vec<String> },
}

/// Immutable once registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckDefinition {
    pub id: String,
    pub mode: CheckMode,
    pub kind: CheckKind,
}

impl CheckDefinition {
    pub fn is_meta(&self) -> bool {
        matches!(self.kind, CheckKind::Meta { .. })
    }
}

/// Process-wide set of check definitions, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct CheckRegistry {
    defs: BTreeMap<String, CheckDefinition>,
}

impl CheckRegistry {
    pub fn new(defs: impl IntoIterator<Item = CheckDefinition>) -> Self {
        Self {
            defs: defs.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&CheckDefinition> {
        self.defs.get(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.defs.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckDefinition> {
        self.defs.values()
    }

    /// Resolve every requested id up front; the first unknown id fails the whole request.
    pub fn resolve(&self, ids: &[String]) -> Result<Vec<&CheckDefinition>, Error> {
        ids.iter()
            .map(|id| {
                self.get(id).ok_or_else(|| Error::UnknownCheck {
                    id: id.clone(),
                    available: self.ids(),
                })
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionSource {
    /// Trimmed contents of a repo-relative file.
    File(RepoPath),
    /// `git describe --tags --always`.
    VcsTag,
}

#[derive(Clone, Debug)]
pub struct ProjectPolicy {
    /// The project's own import path; imports below it are never external.
    pub import_path: Option<String>,
    /// Default scope.
    pub src_dirs: Vec<String>,
    pub source_extensions: Vec<String>,
    /// Glob patterns (repo-relative) excluded from source scanning.
    pub exclude: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct BuildPolicy {
    pub output_root: RepoPath,
    /// Explicit entry points; empty means "every source directory under `entry_root`".
    pub entry_points: Vec<RepoPath>,
    pub entry_root: RepoPath,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub targets: Vec<BuildTarget>,
}

#[derive(Clone, Debug)]
pub struct PackagePolicy {
    pub command: Vec<String>,
    pub image: String,
    pub targets: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub preset: String,
    pub project: ProjectPolicy,
    pub version: VersionSource,
    pub dependency_manifest: RepoPath,
    pub checks: CheckRegistry,
    pub default_meta: String,
    pub build: BuildPolicy,
    pub package: PackagePolicy,
    /// Worker pool size; `None` uses the available parallelism.
    pub jobs: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: &str) -> CheckDefinition {
        CheckDefinition {
            id: id.to_string(),
            mode: CheckMode::Blocking,
            kind: CheckKind::Dependencies,
        }
    }

    #[test]
    fn resolve_fails_fast_on_unknown_id() {
        let registry = CheckRegistry::new([def("deps"), def("gofmt")]);
        let err = registry
            .resolve(&["gofmt".to_string(), "nope".to_string()])
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnknownCheck {
                id: "nope".to_string(),
                available: vec!["deps".to_string(), "gofmt".to_string()],
            }
        );
    }

    #[test]
    fn resolve_keeps_request_order() {
        let registry = CheckRegistry::new([def("deps"), def("gofmt")]);
        let defs = registry
            .resolve(&["gofmt".to_string(), "deps".to_string()])
            .expect("resolve");
        let ids: Vec<&str> = defs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["gofmt", "deps"]);
    }
}
