//! Cross-compilation planning: which (entry point, target) pairs to build and where their
//! artifacts go.

use crate::template::TemplateVars;
use buildgate_types::{BuildTarget, RepoPath, VersionInfo};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildPair {
    pub entry: RepoPath,
    pub target: BuildTarget,
}

impl BuildPair {
    pub fn entry_name(&self) -> &str {
        self.entry.file_name()
    }

    pub fn artifact_path(&self) -> RepoPath {
        self.target.artifact_path(self.entry_name())
    }
}

/// Every entry point crossed with every target, entry-major.
pub fn plan_pairs(entries: &[RepoPath], targets: &[BuildTarget]) -> Vec<BuildPair> {
    entries
        .iter()
        .flat_map(|entry| {
            targets.iter().map(move |target| BuildPair {
                entry: entry.clone(),
                target: target.clone(),
            })
        })
        .collect()
}

/// Targets matching any selector (in matrix order), plus the selectors that matched nothing.
/// No selectors selects the full matrix.
pub fn select_targets(all: &[BuildTarget], selectors: &[String]) -> (Vec<BuildTarget>, Vec<String>) {
    if selectors.is_empty() {
        return (all.to_vec(), Vec::new());
    }
    let selected = all
        .iter()
        .filter(|t| selectors.iter().any(|s| t.matches(s)))
        .cloned()
        .collect();
    let unmatched = selectors
        .iter()
        .filter(|s| !all.iter().any(|t| t.matches(s)))
        .cloned()
        .collect();
    (selected, unmatched)
}

/// Artifact paths of the full matrix, in plan order.
pub fn clean_plan(entries: &[RepoPath], targets: &[BuildTarget]) -> Vec<RepoPath> {
    plan_pairs(entries, targets)
        .iter()
        .map(BuildPair::artifact_path)
        .collect()
}

/// Placeholders available to the compiler command and its environment.
pub fn build_vars(
    pair: &BuildPair,
    version: &VersionInfo,
    import_path: Option<&str>,
    root: &str,
) -> TemplateVars {
    let entry_pkg = if pair.entry.is_root() {
        ".".to_string()
    } else {
        format!("./{}", pair.entry.as_str())
    };
    TemplateVars::new()
        .scalar("output", pair.artifact_path().as_str())
        .scalar("entry", entry_pkg)
        .scalar("entry_name", pair.entry_name())
        .scalar("os", pair.target.os.as_str())
        .scalar("arch", pair.target.arch.as_str())
        .scalar("version", version.version.as_str())
        .scalar("revision", version.revision_label())
        .scalar("build_info", version.build_info.as_str())
        .scalar("dirty", version.dirty.to_string())
        .scalar("import_path", import_path.unwrap_or_default())
        .scalar("root", root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::expand_args;

    fn target(id: &str, os: &str, dir: &str) -> BuildTarget {
        BuildTarget {
            id: id.to_string(),
            os: os.to_string(),
            arch: "amd64".to_string(),
            output_dir: RepoPath::new(dir),
        }
    }

    fn matrix() -> Vec<BuildTarget> {
        vec![
            target("linux-amd64", "linux", "bin/linux"),
            target("darwin-amd64", "darwin", "bin/darwin/darwin_amd64"),
            target("windows-amd64", "windows", "bin/windows/windows_amd64"),
        ]
    }

    #[test]
    fn one_artifact_per_pair_with_target_suffix() {
        let entries = vec![RepoPath::new("cmd/gofmtproblem"), RepoPath::new("cmd/other")];
        let paths: Vec<String> = clean_plan(&entries, &matrix())
            .into_iter()
            .map(|p| p.as_str().to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "bin/linux/gofmtproblem",
                "bin/darwin/darwin_amd64/gofmtproblem",
                "bin/windows/windows_amd64/gofmtproblem.exe",
                "bin/linux/other",
                "bin/darwin/darwin_amd64/other",
                "bin/windows/windows_amd64/other.exe",
            ]
        );
    }

    #[test]
    fn selectors_match_id_or_os_and_report_unmatched() {
        let (selected, unmatched) = select_targets(
            &matrix(),
            &["darwin".to_string(), "linux-amd64".to_string(), "plan9".to_string()],
        );
        let ids: Vec<&str> = selected.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["linux-amd64", "darwin-amd64"]);
        assert_eq!(unmatched, vec!["plan9"]);

        let (all, none) = select_targets(&matrix(), &[]);
        assert_eq!(all.len(), 3);
        assert!(none.is_empty());
    }

    #[test]
    fn build_vars_carry_identity_verbatim() {
        let pair = BuildPair {
            entry: RepoPath::new("cmd/gofmtproblem"),
            target: target("linux-amd64", "linux", "bin/linux"),
        };
        let version = VersionInfo {
            version: "1.4.0".to_string(),
            revision: "abc1234".to_string(),
            dirty: true,
            build_info: "2026-01-01T00:00:00Z ci@builder".to_string(),
        };
        let vars = build_vars(&pair, &version, Some("example.com/tool"), "/src");
        let args: Vec<String> = [
            "go",
            "build",
            "-o",
            "{output}",
            "-ldflags",
            "-X main.VERSION={version} -X main.COMMIT={revision}",
            "{entry}",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(
            expand_args(&args, &vars),
            vec![
                "go",
                "build",
                "-o",
                "bin/linux/gofmtproblem",
                "-ldflags",
                "-X main.VERSION=1.4.0 -X main.COMMIT=abc1234-dirty",
                "./cmd/gofmtproblem",
            ]
        );
    }
}
