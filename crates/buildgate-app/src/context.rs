//! Everything a use case needs, resolved once per invocation.

use anyhow::Context;
use buildgate_domain::policy::EffectiveConfig;
use buildgate_exec::{CancelToken, GitRevision, ProcessRunner, RevisionSource, ToolRunner, WorkerPool};
use buildgate_repo::SourceFilter;
use buildgate_settings::{BuildgateConfigV1, Overrides};
use buildgate_types::RepoPath;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;

const IMPORT_PATH_PLACEHOLDER: &str = "{import_path}";

/// Parse and resolve configuration text. Empty text means "preset defaults".
pub fn load_config(config_text: &str, overrides: Overrides) -> anyhow::Result<EffectiveConfig> {
    let cfg = if config_text.trim().is_empty() {
        BuildgateConfigV1::default()
    } else {
        buildgate_settings::parse_config_toml(config_text).context("parse config")?
    };
    let resolved = buildgate_settings::resolve_config(cfg, overrides).context("resolve config")?;
    Ok(resolved.effective)
}

#[derive(Clone)]
pub struct AppContext {
    pub root: Utf8PathBuf,
    pub config: EffectiveConfig,
    pub runner: Arc<dyn ToolRunner>,
    pub revisions: Arc<dyn RevisionSource>,
    pub cancel: CancelToken,
}

impl AppContext {
    /// An unconfigured `project.import_path` is detected from `go.mod` or `GOPATH`.
    pub fn new(
        root: &Utf8Path,
        mut config: EffectiveConfig,
        runner: Arc<dyn ToolRunner>,
        revisions: Arc<dyn RevisionSource>,
    ) -> anyhow::Result<Self> {
        if config.project.import_path.is_none() {
            config.project.import_path = buildgate_repo::detect_import_path(root, &gopaths())
                .context("detect project import path")?;
        }
        Ok(Self {
            root: root.to_path_buf(),
            config,
            runner,
            revisions,
            cancel: CancelToken::new(),
        })
    }

    /// Real processes and git, rooted at `root`.
    pub fn with_processes(root: &Utf8Path, config: EffectiveConfig) -> anyhow::Result<Self> {
        let runner: Arc<dyn ToolRunner> = Arc::new(ProcessRunner::new(root));
        let revisions = Arc::new(GitRevision::new(runner.clone()));
        Self::new(root, config, runner, revisions)
    }

    pub(crate) fn pool(&self) -> anyhow::Result<WorkerPool> {
        WorkerPool::new(self.config.jobs)
    }

    pub(crate) fn source_filter(&self) -> anyhow::Result<SourceFilter> {
        SourceFilter::new(
            &self.config.project.source_extensions,
            &self.config.project.exclude,
        )
    }

    pub(crate) fn import_path(&self) -> Option<&str> {
        self.config.project.import_path.as_deref()
    }

    /// Fails when a template needs `{import_path}` and none was configured or detected.
    pub(crate) fn require_import_path<'a>(
        &self,
        what: &str,
        templates: impl IntoIterator<Item = &'a String>,
    ) -> anyhow::Result<()> {
        if self.import_path().is_none()
            && templates.into_iter().any(|t| t.contains(IMPORT_PATH_PLACEHOLDER))
        {
            anyhow::bail!(
                "{what} uses {IMPORT_PATH_PLACEHOLDER} but the project import path is unknown; \
                 set `[project] import_path` in buildgate.toml or add a go.mod"
            );
        }
        Ok(())
    }

    /// Entry points to build, explicit or discovered.
    pub(crate) fn entry_points(&self) -> anyhow::Result<Vec<RepoPath>> {
        let filter = self.source_filter()?;
        buildgate_repo::discover_entry_points(
            &self.root,
            &self.config.build.entry_points,
            &self.config.build.entry_root,
            &filter,
        )
        .context("discover entry points")
    }
}

fn gopaths() -> Vec<Utf8PathBuf> {
    std::env::var_os("GOPATH")
        .map(|raw| {
            std::env::split_paths(&raw)
                .filter_map(|p| Utf8PathBuf::from_path_buf(p).ok())
                .filter(|p| !p.as_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}
