use buildgate_types::{AggregateResult, CheckMode, Severity, Verdict};

fn verdict_label(v: Verdict) -> &'static str {
    match v {
        Verdict::Pass => "PASS",
        Verdict::Fail => "FAIL",
        Verdict::Skip => "SKIP",
    }
}

pub fn render_markdown(operation: &str, agg: &AggregateResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Buildgate {operation} report\n\n"));
    out.push_str(&format!(
        "- Verdict: **{}**\n- Checks: {}\n- Findings: {}\n\n",
        verdict_label(agg.verdict),
        agg.results.len(),
        agg.findings().count()
    ));

    out.push_str("| Check | Mode | Verdict | Findings |\n|---|---|---|---|\n");
    for r in &agg.results {
        let mode = match r.mode {
            CheckMode::Blocking => "blocking",
            CheckMode::Observational => "observational",
        };
        out.push_str(&format!(
            "| `{}` | {} | {} | {} |\n",
            r.check_id,
            mode,
            verdict_label(r.verdict),
            r.findings.len()
        ));
    }
    out.push('\n');

    if agg.findings().next().is_none() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str("## Findings\n\n");
    for f in agg.findings() {
        let sev = match f.severity {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
        };
        match &f.location {
            Some(loc) => out.push_str(&format!(
                "- [{}] `{}` / `{}`: {} (`{}`:{})\n",
                sev,
                f.check_id,
                f.code,
                f.message,
                loc.path,
                loc.line.unwrap_or(0)
            )),
            None => out.push_str(&format!(
                "- [{}] `{}` / `{}`: {}\n",
                sev, f.check_id, f.code, f.message
            )),
        }
        if let Some(help) = &f.help {
            out.push_str(&format!("  - help: {}\n", help));
        }
    }

    out
}
