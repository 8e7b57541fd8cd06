use anyhow::Context;
use buildgate_domain::SourceScope;
use buildgate_domain::deps::{ImportScan, ImportSite, UnparsableSource};
use buildgate_domain::imports::{is_external, scan_imports as scan_source};
use buildgate_types::{Error, RepoPath};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["vendor", "testdata", "node_modules"];

/// Which files count as project sources.
#[derive(Clone, Debug)]
pub struct SourceFilter {
    extensions: Vec<String>,
    exclude: GlobSet,
}

impl SourceFilter {
    pub fn new(extensions: &[String], exclude: &[String]) -> anyhow::Result<Self> {
        let mut b = GlobSetBuilder::new();
        for pattern in exclude {
            b.add(Glob::new(pattern).with_context(|| format!("invalid exclude glob: {pattern}"))?);
        }
        Ok(Self {
            extensions: extensions.to_vec(),
            exclude: b.build().context("compile exclude globset")?,
        })
    }

    pub fn is_source(&self, rel: &str) -> bool {
        let ext = Utf8Path::new(rel).extension().unwrap_or_default();
        self.extensions.iter().any(|e| e == ext) && !self.exclude.is_match(rel)
    }

    fn is_excluded_dir(&self, rel: &str) -> bool {
        self.exclude.is_match(rel)
    }
}

/// Source files under the scope directories, sorted and without duplicates.
///
/// `vendor/`, `testdata/`, hidden and `_`-prefixed directories are skipped.
pub fn list_source_files(
    root: &Utf8Path,
    scope: &SourceScope,
    filter: &SourceFilter,
) -> anyhow::Result<Vec<RepoPath>> {
    let mut out = Vec::new();
    for dir in scope.dirs() {
        let start = root.join(dir.as_str());
        let walker = WalkDir::new(&start)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !skip_dir(root, e, filter));
        for entry in walker {
            let entry = entry.with_context(|| format!("walk {start}"))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = relative(root, &entry) else {
                continue;
            };
            if filter.is_source(rel.as_str()) {
                out.push(rel);
            }
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

fn skip_dir(root: &Utf8Path, entry: &DirEntry, filter: &SourceFilter) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || name.starts_with('_') || SKIPPED_DIRS.contains(&name.as_ref()) {
        return true;
    }
    relative(root, entry).is_some_and(|rel| filter.is_excluded_dir(rel.as_str()))
}

fn relative(root: &Utf8Path, entry: &DirEntry) -> Option<RepoPath> {
    let abs = Utf8PathBuf::from_path_buf(entry.path().to_path_buf()).ok()?;
    let rel = abs.strip_prefix(root).unwrap_or(&abs);
    Some(RepoPath::new(rel.as_str()))
}

/// External imports of `files`, in file order. Unreadable or unparsable files are collected
/// separately and never abort the scan.
pub fn scan_imports(root: &Utf8Path, files: &[RepoPath], own_import_path: Option<&str>) -> ImportScan {
    let per_file: Vec<Result<Vec<ImportSite>, UnparsableSource>> = files
        .par_iter()
        .map(|path| scan_file(root, path, own_import_path))
        .collect();

    let mut scan = ImportScan::default();
    for r in per_file {
        match r {
            Ok(sites) => scan.sites.extend(sites),
            Err(bad) => {
                let err = Error::SourceUnparsable {
                    path: bad.path.to_string(),
                    reason: bad.reason.clone(),
                };
                tracing::warn!("skipping {err}");
                scan.unparsable.push(bad);
            }
        }
    }
    scan
}

fn scan_file(
    root: &Utf8Path,
    path: &RepoPath,
    own_import_path: Option<&str>,
) -> Result<Vec<ImportSite>, UnparsableSource> {
    let unparsable = |reason: String| UnparsableSource {
        path: path.clone(),
        reason,
    };
    let bytes = std::fs::read(root.join(path.as_str())).map_err(|e| unparsable(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|_| unparsable("not valid UTF-8".to_string()))?;
    let imports = scan_source(&text).map_err(|e| unparsable(e.to_string()))?;
    Ok(imports
        .into_iter()
        .filter(|i| is_external(&i.path, own_import_path))
        .map(|i| ImportSite {
            package: i.path,
            path: path.clone(),
            line: i.line,
        })
        .collect())
}

/// Entry points to build: the explicit list when given, else every directory directly under
/// `entry_root` holding at least one non-test source file.
pub fn discover_entry_points(
    root: &Utf8Path,
    explicit: &[RepoPath],
    entry_root: &RepoPath,
    filter: &SourceFilter,
) -> anyhow::Result<Vec<RepoPath>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }
    let base = root.join(entry_root.as_str());
    if !base.is_dir() {
        tracing::debug!(dir = %base, "no entry point directory");
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for entry in base.read_dir_utf8().with_context(|| format!("read dir {base}"))? {
        let entry = entry.with_context(|| format!("read dir {base}"))?;
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let has_source = entry
            .path()
            .read_dir_utf8()
            .with_context(|| format!("read dir {}", entry.path()))?
            .filter_map(|f| f.ok())
            .any(|f| {
                let name = f.file_name();
                !name.contains("_test.") && filter.is_source(name)
            });
        if has_source {
            out.push(entry_root.join(entry.file_name()));
        }
    }
    out.sort();
    Ok(out)
}
