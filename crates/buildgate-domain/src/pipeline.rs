//! Verdict aggregation and meta-check expansion.

use crate::fingerprint::stamp;
use crate::policy::{CheckKind, CheckRegistry};
use buildgate_types::ids;
use buildgate_types::{AggregateResult, CheckMode, CheckResult, Error, Finding, Severity, Verdict};
use serde_json::json;

/// Overall verdict is the AND of every blocking check's verdict. A skipped blocking check is
/// not a pass.
pub fn aggregate(results: Vec<CheckResult>) -> AggregateResult {
    let verdict = Verdict::from_pass(blocking_pass(&results));
    AggregateResult { verdict, results }
}

fn blocking_pass(results: &[CheckResult]) -> bool {
    results
        .iter()
        .filter(|r| r.mode == CheckMode::Blocking)
        .all(|r| r.verdict.is_pass())
}

/// Flatten a meta check into the leaf checks it runs, in declaration order, without
/// duplicates. Nested meta checks are expanded in place.
pub fn expand_meta(registry: &CheckRegistry, meta_id: &str) -> Result<Vec<String>, Error> {
    let mut out = Vec::new();
    let mut stack = Vec::new();
    expand_into(registry, meta_id, &mut stack, &mut out)?;
    Ok(out)
}

fn expand_into(
    registry: &CheckRegistry,
    id: &str,
    stack: &mut Vec<String>,
    out: &mut Vec<String>,
) -> Result<(), Error> {
    let def = registry.get(id).ok_or_else(|| Error::UnknownCheck {
        id: id.to_string(),
        available: registry.ids(),
    })?;
    match &def.kind {
        CheckKind::Meta { constituents } => {
            // Cycles are rejected when settings resolve; skip revisits here.
            if stack.iter().any(|s| s == id) {
                return Ok(());
            }
            stack.push(id.to_string());
            for c in constituents {
                expand_into(registry, c, stack, out)?;
            }
            stack.pop();
        }
        _ => {
            if !out.iter().any(|o| o == id) {
                out.push(id.to_string());
            }
        }
    }
    Ok(())
}

/// Union of the constituents' findings, each keeping its constituent `check_id` and tagged
/// with `data.meta`. Verdict is the AND of every constituent's own verdict, observational
/// ones included: a meta check fails whenever one of its checks would fail on its own.
pub fn merge_meta(meta_id: &str, mode: CheckMode, constituents: &[CheckResult]) -> CheckResult {
    let findings = constituents
        .iter()
        .flat_map(|r| r.findings.iter().cloned())
        .map(|f| tag_meta(f, meta_id))
        .collect();

    let verdict = if constituents.iter().any(|r| r.verdict == Verdict::Skip) {
        Verdict::Skip
    } else {
        Verdict::from_pass(constituents.iter().all(|r| r.verdict.is_pass()))
    };

    CheckResult {
        check_id: meta_id.to_string(),
        mode,
        verdict,
        findings,
        exit_code: None,
        duration_ms: constituents.iter().map(|r| r.duration_ms).sum(),
    }
}

fn tag_meta(mut finding: Finding, meta_id: &str) -> Finding {
    match &mut finding.data {
        serde_json::Value::Object(map) => {
            map.insert("meta".to_string(), json!(meta_id));
        }
        serde_json::Value::Null => finding.data = json!({ "meta": meta_id }),
        other => {
            let value = other.take();
            finding.data = json!({ "meta": meta_id, "value": value });
        }
    }
    finding
}

/// Result recorded for a unit that was cancelled before or while it ran.
pub fn cancelled(check_id: &str, mode: CheckMode) -> CheckResult {
    let mut result = CheckResult::skipped(check_id, mode);
    result.findings.push(stamp(Finding {
        severity: Severity::Info,
        check_id: check_id.to_string(),
        code: ids::CODE_CANCELLED.to_string(),
        message: "cancelled before completion".to_string(),
        location: None,
        tool_severity: None,
        help: None,
        fingerprint: None,
        data: serde_json::Value::Null,
    }));
    result
}

/// A check that could not produce a result (unreadable manifest, unexpandable command).
/// Fails only that check.
pub fn runtime_failure(check_id: &str, mode: CheckMode, message: String) -> CheckResult {
    CheckResult {
        check_id: check_id.to_string(),
        mode,
        verdict: Verdict::Fail,
        findings: vec![stamp(Finding {
            severity: mode.finding_severity(),
            check_id: check_id.to_string(),
            code: ids::CODE_RUNTIME_ERROR.to_string(),
            message,
            location: None,
            tool_severity: None,
            help: None,
            fingerprint: None,
            data: serde_json::Value::Null,
        })],
        exit_code: None,
        duration_ms: 0,
    }
}
