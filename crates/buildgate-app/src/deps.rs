//! The `dependency-check` use case.

use crate::context::AppContext;
use anyhow::Context;
use buildgate_domain::SourceScope;
use buildgate_domain::deps::{DependencyDiff, evaluate_dependencies};
use buildgate_domain::policy::CheckKind;
use buildgate_types::{CheckMode, CheckResult, ids};
use std::time::Instant;

#[derive(Clone, Debug)]
pub struct DependencyCheckRun {
    pub scope: SourceScope,
    pub diff: DependencyDiff,
    pub result: CheckResult,
}

/// Reconcile declared against imported packages. Unlike the pipeline check, an unreadable
/// manifest aborts the run.
pub fn run_dependency_check(
    ctx: &AppContext,
    scope_override: Option<Vec<String>>,
) -> anyhow::Result<DependencyCheckRun> {
    let started = Instant::now();
    let scope = buildgate_repo::resolve_scope(
        &ctx.root,
        &ctx.config.project.src_dirs,
        scope_override.as_deref(),
    )?;

    let (check_id, mode) = dependency_check_identity(ctx);
    let manifest = buildgate_repo::read_vendor_manifest(&ctx.root, &ctx.config.dependency_manifest)?;

    let filter = ctx.source_filter()?;
    let files = buildgate_repo::list_source_files(&ctx.root, &scope, &filter).context("list source files")?;
    let scan = buildgate_repo::scan_imports(&ctx.root, &files, ctx.import_path());
    tracing::info!(
        declared = manifest.packages.len(),
        files = files.len(),
        unparsable = scan.unparsable.len(),
        "reconciling dependencies"
    );

    let mut evaluation = evaluate_dependencies(&check_id, mode, &manifest, &scan);
    evaluation.result.duration_ms = started.elapsed().as_millis() as u64;
    Ok(DependencyCheckRun {
        scope,
        diff: evaluation.diff,
        result: evaluation.result,
    })
}

/// The configured dependency check, or the built-in identity if it was disabled.
fn dependency_check_identity(ctx: &AppContext) -> (String, CheckMode) {
    ctx.config
        .checks
        .iter()
        .find(|d| matches!(d.kind, CheckKind::Dependencies))
        .map(|d| (d.id.clone(), d.mode))
        .unwrap_or_else(|| (ids::CHECK_DEPS.to_string(), CheckMode::Blocking))
}
