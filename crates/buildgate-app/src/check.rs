//! The `check` and `meta-check` use cases: run registered checks over a scope and aggregate.

use crate::context::AppContext;
use anyhow::Context;
use buildgate_domain::SourceScope;
use buildgate_domain::deps::evaluate_dependencies;
use buildgate_domain::diagnostics::{ToolCheck, evaluate_tool_output};
use buildgate_domain::pipeline::{aggregate, cancelled, expand_meta, merge_meta, runtime_failure};
use buildgate_domain::policy::{CheckDefinition, CheckKind};
use buildgate_domain::template::{TemplateVars, expand_args};
use buildgate_domain::tool::Invocation;
use buildgate_types::{AggregateResult, CheckResult, RepoPath};
use std::collections::BTreeMap;
use std::time::Instant;
use time::OffsetDateTime;

#[derive(Clone, Debug, Default)]
pub struct CheckRequest {
    pub check_ids: Vec<String>,
    /// Replaces the configured default scope when present.
    pub scope_override: Option<Vec<String>>,
}

/// Outcome of one pipeline run.
#[derive(Clone, Debug)]
pub struct CheckRun {
    pub scope: SourceScope,
    pub aggregate: AggregateResult,
    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
}

/// Run every requested check. Unknown ids and a bad scope abort before anything runs; a
/// failing check never stops its siblings.
pub fn run_checks(ctx: &AppContext, request: &CheckRequest) -> anyhow::Result<CheckRun> {
    let started_at = OffsetDateTime::now_utc();
    let registry = &ctx.config.checks;

    let requested = registry.resolve(&request.check_ids)?;
    let mut plan: Vec<(String, Vec<String>)> = Vec::new();
    for def in &requested {
        let leaves = if def.is_meta() {
            expand_meta(registry, &def.id)?
        } else {
            vec![def.id.clone()]
        };
        plan.push((def.id.clone(), leaves));
    }

    let scope = buildgate_repo::resolve_scope(
        &ctx.root,
        &ctx.config.project.src_dirs,
        request.scope_override.as_deref(),
    )?;

    // Each leaf runs once even if several requested checks share it.
    let mut leaves: Vec<&CheckDefinition> = Vec::new();
    for (_, ids) in &plan {
        for id in ids {
            if !leaves.iter().any(|d| &d.id == id)
                && let Some(def) = registry.get(id)
            {
                leaves.push(def);
            }
        }
    }

    let files = if leaves.iter().any(|d| needs_files(d)) {
        let filter = ctx.source_filter()?;
        buildgate_repo::list_source_files(&ctx.root, &scope, &filter).context("list source files")?
    } else {
        Vec::new()
    };
    tracing::info!(
        checks = ?request.check_ids,
        scope = ?scope.to_strings(),
        files = files.len(),
        "running checks"
    );

    let pool = ctx.pool()?;
    let leaf_results = pool.run_units(
        &leaves,
        &ctx.cancel,
        |def| run_leaf(ctx, def, &scope, &files),
        |def| cancelled(&def.id, def.mode),
    );
    let by_id: BTreeMap<&str, &CheckResult> = leaf_results
        .iter()
        .map(|r| (r.check_id.as_str(), r))
        .collect();

    let mut results = Vec::with_capacity(plan.len());
    for (def, (_, ids)) in requested.iter().zip(&plan) {
        let result = if def.is_meta() {
            let parts: Vec<CheckResult> = ids
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).map(|r| (*r).clone()))
                .collect();
            merge_meta(&def.id, def.mode, &parts)
        } else {
            by_id
                .get(def.id.as_str())
                .map(|r| (*r).clone())
                .unwrap_or_else(|| cancelled(&def.id, def.mode))
        };
        tracing::info!("{}", buildgate_render::summary_line(&result));
        results.push(result);
    }

    Ok(CheckRun {
        scope,
        aggregate: aggregate(results),
        started_at,
        finished_at: OffsetDateTime::now_utc(),
    })
}

/// Run a meta check (`None` uses the configured default).
pub fn run_meta_check(
    ctx: &AppContext,
    meta_id: Option<&str>,
    scope_override: Option<Vec<String>>,
) -> anyhow::Result<CheckRun> {
    let id = meta_id.unwrap_or(&ctx.config.default_meta).to_string();
    if let Some(def) = ctx.config.checks.get(&id)
        && !def.is_meta()
    {
        anyhow::bail!("{id} is not a meta check");
    }
    run_checks(
        ctx,
        &CheckRequest {
            check_ids: vec![id],
            scope_override,
        },
    )
}

fn needs_files(def: &CheckDefinition) -> bool {
    match &def.kind {
        CheckKind::Dependencies => true,
        CheckKind::External { command, .. } => command.iter().any(|a| a.contains("{files}")),
        CheckKind::Meta { .. } => false,
    }
}

fn scope_vars(ctx: &AppContext, scope: &SourceScope, files: &[RepoPath]) -> TemplateVars {
    TemplateVars::new()
        .list("scope", scope.to_strings())
        .list("scope_pkgs", scope.package_patterns())
        .list("files", files.iter().map(|f| f.as_str().to_string()).collect())
        .scalar("root", ctx.root.as_str())
        .scalar("import_path", ctx.import_path().unwrap_or_default())
}

fn run_leaf(
    ctx: &AppContext,
    def: &CheckDefinition,
    scope: &SourceScope,
    files: &[RepoPath],
) -> CheckResult {
    let started = Instant::now();
    let mut result = match &def.kind {
        CheckKind::External {
            command,
            format,
            message,
        } => {
            let argv = expand_args(command, &scope_vars(ctx, scope, files));
            match Invocation::from_argv(argv) {
                Some(inv) => {
                    let output = ctx.runner.run(&inv);
                    let check = ToolCheck {
                        check_id: &def.id,
                        mode: def.mode,
                        format: *format,
                        message: message.as_deref(),
                    };
                    evaluate_tool_output(&check, &output, &ctx.root, scope)
                }
                None => runtime_failure(&def.id, def.mode, "command expanded to nothing".to_string()),
            }
        }
        CheckKind::Dependencies => {
            match buildgate_repo::read_vendor_manifest(&ctx.root, &ctx.config.dependency_manifest) {
                Ok(manifest) => {
                    let scan = buildgate_repo::scan_imports(&ctx.root, files, ctx.import_path());
                    evaluate_dependencies(&def.id, def.mode, &manifest, &scan).result
                }
                Err(e) => {
                    tracing::error!(check = %def.id, error = %e, "dependency check cannot run");
                    runtime_failure(&def.id, def.mode, e.to_string())
                }
            }
        }
        // Expanded before scheduling.
        CheckKind::Meta { .. } => runtime_failure(&def.id, def.mode, "nested meta check".to_string()),
    };
    result.duration_ms = started.elapsed().as_millis() as u64;
    result
}
