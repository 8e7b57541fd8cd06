use buildgate_types::{Error, RepoPath};
use camino::Utf8Path;

/// Trimmed contents of the version file. Missing or blank is `VersionUnresolvable`.
pub fn read_version_file(root: &Utf8Path, path: &RepoPath) -> Result<String, Error> {
    let abs = root.join(path.as_str());
    let text = std::fs::read_to_string(&abs)
        .map_err(|e| Error::version_unresolvable(format!("read {path}: {e}")))?;
    let version = text.trim();
    if version.is_empty() {
        return Err(Error::version_unresolvable(format!("{path} is empty")));
    }
    Ok(version.to_string())
}
