use serde::{Deserialize, Serialize};

/// Build identity stamped into every artifact of one build invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    /// VCS commit identifier of the working tree.
    pub revision: String,
    /// The working tree had uncommitted modifications (or no VCS at all).
    pub dirty: bool,
    /// Free-text provenance (timestamp and builder). Never compared for equality by tooling.
    pub build_info: String,
}

impl VersionInfo {
    /// Revision as embedded into artifacts: `<rev>` or `<rev>-dirty`.
    pub fn revision_label(&self) -> String {
        if self.dirty {
            format!("{}-dirty", self.revision)
        } else {
            self.revision.clone()
        }
    }
}
