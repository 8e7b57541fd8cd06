use buildgate_domain::deps::{DeclaredPackage, DependencyManifest};
use buildgate_types::{Error, RepoPath};
use camino::Utf8Path;
use serde::Deserialize;

/// The subset of `vendor/vendor.json` we rely on.
#[derive(Debug, Deserialize)]
struct VendorFile {
    package: Vec<VendorPackage>,
}

#[derive(Debug, Deserialize)]
struct VendorPackage {
    path: String,
}

pub fn read_vendor_manifest(root: &Utf8Path, path: &RepoPath) -> Result<DependencyManifest, Error> {
    let abs = root.join(path.as_str());
    let text = std::fs::read_to_string(&abs).map_err(|e| Error::DependencyManifestUnreadable {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    parse_vendor_manifest(path, &text)
}

/// Parse manifest text. Never panics on any input.
pub fn parse_vendor_manifest(path: &RepoPath, text: &str) -> Result<DependencyManifest, Error> {
    let file: VendorFile =
        serde_json::from_str(text).map_err(|e| Error::DependencyManifestUnreadable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    let packages = file
        .package
        .into_iter()
        .filter(|p| !p.path.trim().is_empty())
        .map(|p| DeclaredPackage {
            line: line_of_path(text, &p.path),
            name: p.path,
        })
        .collect();

    Ok(DependencyManifest {
        path: path.clone(),
        packages,
    })
}

/// 1-based line holding `"path": "<name>"`, if the text has one.
fn line_of_path(text: &str, name: &str) -> Option<u32> {
    let quoted = format!("\"{name}\"");
    text.lines()
        .position(|l| l.contains("\"path\"") && l.contains(&quoted))
        .map(|i| i as u32 + 1)
}
