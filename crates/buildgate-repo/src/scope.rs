use buildgate_domain::SourceScope;
use buildgate_types::Error;
use camino::Utf8Path;

/// Resolve the effective scope: the override verbatim when given, else the configured default.
///
/// Every directory must exist under `root`; the default list is held to the same rule.
pub fn resolve_scope(
    root: &Utf8Path,
    default: &[String],
    override_dirs: Option<&[String]>,
) -> Result<SourceScope, Error> {
    let scope = match override_dirs {
        Some(dirs) => SourceScope::new(dirs)?,
        None => SourceScope::new(default)?,
    };

    for dir in scope.dirs() {
        let abs = root.join(dir.as_str());
        if !abs.is_dir() {
            return Err(Error::invalid_scope(format!(
                "not a directory under the project root: {dir}"
            )));
        }
    }
    tracing::debug!(scope = ?scope.to_strings(), "resolved scope");
    Ok(scope)
}
