//! Report envelope construction and persistence.

use anyhow::Context;
use buildgate_domain::SourceScope;
use buildgate_types::{
    AggregateResult, CheckMode, ReportData, ReportEnvelope, SCHEMA_REPORT_V1, ToolMeta, Verdict,
};
use camino::Utf8Path;
use time::OffsetDateTime;

/// Everything a report describes about one run.
#[derive(Clone, Copy, Debug)]
pub struct ReportInput<'a> {
    pub operation: &'a str,
    pub scope: &'a SourceScope,
    pub aggregate: &'a AggregateResult,
    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
}

pub fn build_report(input: ReportInput<'_>) -> ReportEnvelope {
    let agg = input.aggregate;
    let failed_checks = agg
        .results
        .iter()
        .filter(|r| r.mode == CheckMode::Blocking && !r.verdict.is_pass())
        .map(|r| r.check_id.clone())
        .collect();

    ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "buildgate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        operation: input.operation.to_string(),
        scope: input.scope.dirs().to_vec(),
        started_at: input.started_at,
        finished_at: input.finished_at,
        verdict: agg.verdict,
        checks: agg.results.clone(),
        data: ReportData {
            checks_run: agg.results.len() as u32,
            findings_total: agg.findings().count() as u32,
            failed_checks,
        },
    }
}

pub fn serialize_report(report: &ReportEnvelope) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_output(path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create dir {parent}"))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write {path}"))
}

pub fn write_report(path: &Utf8Path, report: &ReportEnvelope) -> anyhow::Result<()> {
    let bytes = serialize_report(report)?;
    write_output(path, &bytes)
}

/// Process exit code for a verdict: 0 on pass, 2 otherwise.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Fail | Verdict::Skip => 2,
    }
}

/// A single requested check decides the exit code by its own verdict, even when it is
/// observational. Several checks use the aggregate.
pub fn check_exit_code(agg: &AggregateResult) -> i32 {
    match agg.results.as_slice() {
        [only] => verdict_exit_code(only.verdict),
        _ => verdict_exit_code(agg.verdict),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildgate_domain::pipeline::aggregate;
    use buildgate_types::{CheckResult, Finding, Severity};
    use camino::Utf8PathBuf;
    use time::macros::datetime;

    fn result(id: &str, mode: CheckMode, findings: usize) -> CheckResult {
        let findings = (0..findings)
            .map(|i| Finding {
                severity: Severity::Warning,
                check_id: id.to_string(),
                code: "diagnostic".to_string(),
                message: format!("finding {i}"),
                location: None,
                tool_severity: None,
                help: None,
                fingerprint: None,
                data: serde_json::Value::Null,
            })
            .collect::<Vec<_>>();
        CheckResult {
            check_id: id.to_string(),
            mode,
            verdict: Verdict::from_pass(findings.is_empty()),
            findings,
            exit_code: Some(0),
            duration_ms: 3,
        }
    }

    fn report_for(agg: &AggregateResult) -> ReportEnvelope {
        let scope = SourceScope::new(["cmd", "pkg"]).expect("scope");
        build_report(ReportInput {
            operation: "check",
            scope: &scope,
            aggregate: agg,
            started_at: datetime!(2026-03-01 12:00:00 UTC),
            finished_at: datetime!(2026-03-01 12:00:05 UTC),
        })
    }

    #[test]
    fn report_summarises_run() {
        let agg = aggregate(vec![
            result("gofmt", CheckMode::Blocking, 1),
            result("golint", CheckMode::Observational, 2),
        ]);
        let report = report_for(&agg);
        assert_eq!(report.schema, SCHEMA_REPORT_V1);
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.data.checks_run, 2);
        assert_eq!(report.data.findings_total, 3);
        assert_eq!(report.data.failed_checks, vec!["gofmt".to_string()]);

        let json: serde_json::Value =
            serde_json::from_slice(&serialize_report(&report).expect("serialize")).expect("json");
        assert_eq!(json["started_at"], "2026-03-01T12:00:00Z");
        assert_eq!(json["scope"], serde_json::json!(["cmd", "pkg"]));
        assert_eq!(json["checks"][1]["check_id"], "golint");
    }

    #[test]
    fn write_report_creates_parents() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8");
        let path = root.join("artifacts/buildgate/report.json");
        let agg = aggregate(vec![result("gofmt", CheckMode::Blocking, 0)]);
        write_report(&path, &report_for(&agg)).expect("write");
        let back: ReportEnvelope =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(back.verdict, Verdict::Pass);
    }

    #[test]
    fn single_check_uses_its_own_verdict() {
        let lint_only = aggregate(vec![result("golint", CheckMode::Observational, 1)]);
        assert_eq!(lint_only.verdict, Verdict::Pass);
        assert_eq!(check_exit_code(&lint_only), 2);

        let mixed = aggregate(vec![
            result("gofmt", CheckMode::Blocking, 0),
            result("golint", CheckMode::Observational, 1),
        ]);
        assert_eq!(check_exit_code(&mixed), 0);
        assert_eq!(verdict_exit_code(Verdict::Skip), 2);
    }
}
