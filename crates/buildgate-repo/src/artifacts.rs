use anyhow::Context;
use buildgate_types::RepoPath;
use camino::Utf8Path;
use std::collections::BTreeSet;
use std::io::ErrorKind;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Artifacts that existed and were removed.
    pub removed: Vec<RepoPath>,
    /// Directories below the output root left empty and removed.
    pub pruned_dirs: Vec<RepoPath>,
}

/// Remove every listed artifact, then prune now-empty directories strictly below
/// `output_root`. Missing artifacts are not an error, so the operation is idempotent.
pub fn remove_artifacts(
    root: &Utf8Path,
    artifacts: &[RepoPath],
    output_root: &RepoPath,
) -> anyhow::Result<CleanReport> {
    let mut report = CleanReport::default();

    for artifact in artifacts {
        let abs = root.join(artifact.as_str());
        match std::fs::remove_file(&abs) {
            Ok(()) => {
                tracing::debug!(path = %artifact, "removed artifact");
                report.removed.push(artifact.clone());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("remove {abs}")),
        }
    }

    let mut candidates: BTreeSet<RepoPath> = BTreeSet::new();
    for artifact in artifacts {
        let mut dir = Utf8Path::new(artifact.as_str()).parent();
        while let Some(d) = dir {
            let rel = RepoPath::new(d.as_str());
            if rel.is_root() || rel == *output_root || !output_root.contains(&rel) {
                break;
            }
            candidates.insert(rel);
            dir = d.parent();
        }
    }

    // Deepest first so parents see their children already gone.
    let mut ordered: Vec<RepoPath> = candidates.into_iter().collect();
    ordered.sort_by_key(|p| std::cmp::Reverse(p.as_str().matches('/').count()));
    for dir in ordered {
        let abs = root.join(dir.as_str());
        let is_empty = match abs.read_dir_utf8() {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => false,
        };
        if is_empty {
            std::fs::remove_dir(&abs).with_context(|| format!("remove dir {abs}"))?;
            report.pruned_dirs.push(dir);
        }
    }

    Ok(report)
}

/// Create the parent directory of a repo-relative artifact path.
pub fn ensure_parent_dir(root: &Utf8Path, artifact: &RepoPath) -> anyhow::Result<()> {
    let abs = root.join(artifact.as_str());
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create dir {parent}"))?;
    }
    Ok(())
}

pub fn artifact_exists(root: &Utf8Path, artifact: &RepoPath) -> bool {
    root.join(artifact.as_str()).is_file()
}
