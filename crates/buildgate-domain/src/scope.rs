use buildgate_types::{Error, Finding, RepoPath};

/// Ordered, non-empty list of repo-relative directories a run applies to.
///
/// Every directory is implicitly recursive. Existence on disk is checked by the repo layer;
/// this type only enforces the structural rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceScope {
    dirs: Vec<RepoPath>,
}

impl SourceScope {
    pub fn new<I, S>(dirs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for raw in dirs {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                return Err(Error::invalid_scope("empty directory name in scope"));
            }
            let dir = RepoPath::new(raw);
            if is_absolute(dir.as_str()) {
                return Err(Error::invalid_scope(format!(
                    "scope directory must be relative to the project root: {raw}"
                )));
            }
            if dir.as_str().split('/').any(|seg| seg == "..") {
                return Err(Error::invalid_scope(format!(
                    "scope directory escapes the project root: {raw}"
                )));
            }
            out.push(dir);
        }
        if out.is_empty() {
            return Err(Error::invalid_scope("scope override is empty"));
        }
        Ok(Self { dirs: out })
    }

    pub fn dirs(&self) -> &[RepoPath] {
        &self.dirs
    }

    pub fn contains(&self, path: &RepoPath) -> bool {
        self.dirs.iter().any(|d| d.contains(path))
    }

    /// Drop findings attributed to files outside the scope. Findings without a location are
    /// tool-level and always kept.
    pub fn retain_in_scope(&self, findings: Vec<Finding>) -> Vec<Finding> {
        findings
            .into_iter()
            .filter(|f| f.path().is_none_or(|p| self.contains(p)))
            .collect()
    }

    /// `./dir/...` package patterns, one per directory.
    pub fn package_patterns(&self) -> Vec<String> {
        self.dirs
            .iter()
            .map(|d| {
                if d.is_root() {
                    "./...".to_string()
                } else {
                    format!("./{}/...", d.as_str())
                }
            })
            .collect()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.dirs.iter().map(|d| d.as_str().to_string()).collect()
    }
}

/// Rooted paths and Windows drive prefixes (`C:` or `C:/...`).
fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    let drive = match bytes {
        [letter, b':'] => letter.is_ascii_alphabetic(),
        [letter, b':', b'/', ..] => letter.is_ascii_alphabetic(),
        _ => false,
    };
    path.starts_with('/') || drive
}
