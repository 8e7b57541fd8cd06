//! Error taxonomy shared by every layer.
//!
//! Application code propagates these through `anyhow` with added context; callers that need to
//! tell them apart use `anyhow::Error::downcast_ref::<Error>()`.

use thiserror::Error as ThisError;

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum Error {
    /// Bad or empty scope override, or a scope directory that does not exist.
    #[error("invalid scope: {reason}")]
    InvalidScope { reason: String },

    /// A requested check id is not registered.
    #[error("unknown check: {id} (available: {})", available.join(", "))]
    UnknownCheck { id: String, available: Vec<String> },

    /// The build identity cannot be computed.
    #[error("version unresolvable: {reason}")]
    VersionUnresolvable { reason: String },

    /// The declared dependency set cannot be enumerated.
    #[error("dependency manifest unreadable: {path}: {reason}")]
    DependencyManifestUnreadable { path: String, reason: String },

    /// A source file's import references cannot be parsed.
    #[error("source unparsable: {path}: {reason}")]
    SourceUnparsable { path: String, reason: String },

    /// An external checker, compiler or packager failed to run or exited non-zero.
    #[error("external tool failure: {tool}: {reason}")]
    ExternalToolFailure { tool: String, reason: String },
}

impl Error {
    pub fn invalid_scope(reason: impl Into<String>) -> Self {
        Error::InvalidScope {
            reason: reason.into(),
        }
    }

    pub fn version_unresolvable(reason: impl Into<String>) -> Self {
        Error::VersionUnresolvable {
            reason: reason.into(),
        }
    }
}
