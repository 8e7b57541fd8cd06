//! Repository adapters: resolve scopes, walk sources, read manifests and manage artifacts.
//!
//! This crate is allowed to do filesystem IO. It must not spawn external processes; anything
//! that needs a tool (git, compilers, checkers) lives in `buildgate-exec`.

#![forbid(unsafe_code)]

mod artifacts;
mod manifest;
mod module;
mod scope;
mod sources;
mod version;

pub use artifacts::{CleanReport, artifact_exists, ensure_parent_dir, remove_artifacts};
pub use manifest::{parse_vendor_manifest, read_vendor_manifest};
pub use module::{detect_import_path, parse_module_line};
pub use scope::resolve_scope;
pub use sources::{SourceFilter, discover_entry_points, list_source_files, scan_imports};
pub use version::read_version_file;

#[cfg(test)]
pub(crate) mod test_support {
    use camino::{Utf8Path, Utf8PathBuf};
    use tempfile::TempDir;

    pub fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path")
    }

    pub fn write_file(path: &Utf8Path, contents: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, contents).expect("write file");
    }
}
