//! The `version` use case: compute the build identity once per invocation.

use crate::context::AppContext;
use anyhow::Context;
use buildgate_domain::policy::VersionSource;
use buildgate_types::{Error, VersionInfo};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Revision used when the tree is not under version control.
pub const UNKNOWN_REVISION: &str = "unknown";

/// Who built, and when. Supplied by the caller so the computation stays deterministic.
#[derive(Clone, Debug)]
pub struct BuilderIdentity {
    pub user: String,
    pub host: String,
    pub timestamp: OffsetDateTime,
}

pub fn compute_version(ctx: &AppContext, builder: &BuilderIdentity) -> anyhow::Result<VersionInfo> {
    let version = match &ctx.config.version {
        VersionSource::File(path) => buildgate_repo::read_version_file(&ctx.root, path)?,
        VersionSource::VcsTag => ctx.revisions.describe().ok_or_else(|| {
            Error::version_unresolvable("no tag or commit to describe (is this a git checkout?)")
        })?,
    };

    let (revision, dirty) = match ctx.revisions.revision() {
        Some(r) => (r.commit, r.dirty),
        None => {
            tracing::warn!("not a git checkout; revision is {UNKNOWN_REVISION} and marked dirty");
            (UNKNOWN_REVISION.to_string(), true)
        }
    };

    let timestamp = builder
        .timestamp
        .format(&Rfc3339)
        .context("format build timestamp")?;

    let info = VersionInfo {
        version,
        revision,
        dirty,
        build_info: format!("{} {}@{}", timestamp, builder.user, builder.host),
    };
    tracing::debug!(version = %info.version, revision = %info.revision_label(), "build identity");
    Ok(info)
}

/// `VERSION:`, `REVISION:` and `BUILDINFO:` lines.
pub fn format_version(info: &VersionInfo) -> Vec<String> {
    vec![
        format!("VERSION:{}", info.version),
        format!("REVISION:{}", info.revision_label()),
        format!("BUILDINFO:{}", info.build_info),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, FakeRevisions};
    use time::macros::datetime;

    fn builder() -> BuilderIdentity {
        BuilderIdentity {
            user: "ci".to_string(),
            host: "runner-1".to_string(),
            timestamp: datetime!(2026-03-01 12:00:00 UTC),
        }
    }

    #[test]
    fn version_from_file_with_clean_revision() {
        let fx = Fixture::new().file("VERSION", "0.9.1\n");
        let ctx = fx.context_with(FakeRevisions::clean("abc1234"));
        let info = compute_version(&ctx, &builder()).expect("version");
        assert_eq!(info.version, "0.9.1");
        assert_eq!(info.revision_label(), "abc1234");
        assert_eq!(info.build_info, "2026-03-01T12:00:00Z ci@runner-1");
        assert_eq!(
            format_version(&info),
            vec![
                "VERSION:0.9.1",
                "REVISION:abc1234",
                "BUILDINFO:2026-03-01T12:00:00Z ci@runner-1"
            ]
        );
    }

    #[test]
    fn no_vcs_means_unknown_and_dirty() {
        let fx = Fixture::new().file("VERSION", "0.9.1\n");
        let ctx = fx.context_with(FakeRevisions::none());
        let info = compute_version(&ctx, &builder()).expect("version");
        assert_eq!(info.revision_label(), "unknown-dirty");
    }

    #[test]
    fn missing_version_file_is_unresolvable() {
        let fx = Fixture::new();
        let ctx = fx.context_with(FakeRevisions::clean("abc1234"));
        let err = compute_version(&ctx, &builder()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::VersionUnresolvable { .. })
        ));
    }

    #[test]
    fn vcs_tag_source_uses_describe() {
        let fx = Fixture::new().config("[version]\nsource = \"vcs-tag\"\n");
        let ctx = fx.context_with(FakeRevisions::clean("abc1234").tagged("v2.0.0"));
        assert_eq!(compute_version(&ctx, &builder()).expect("version").version, "v2.0.0");

        let ctx = fx.context_with(FakeRevisions::none());
        assert!(compute_version(&ctx, &builder()).is_err());
    }
}
