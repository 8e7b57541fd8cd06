use buildgate_types::ids;
use buildgate_types::{CheckResult, Finding, Verdict};

/// One diagnostic line per finding, in emission order. A `tool_failure` finding is followed
/// by the captured tail of the tool's output, verbatim.
pub fn render_text(results: &[CheckResult]) -> Vec<String> {
    let mut out = Vec::new();
    for r in results {
        for f in &r.findings {
            out.push(render_diagnostic(f));
            if f.code == ids::CODE_TOOL_FAILURE
                && let Some(tail) = f.data.get("output_tail").and_then(|t| t.as_array())
            {
                out.extend(tail.iter().filter_map(|l| l.as_str()).map(|l| format!("    {l}")));
            }
        }
    }
    out
}

/// `path:line: message`, `path: message`, or `check: message` without a location.
/// Dependency diffs print their `u <pkg>` / `m <pkg>` message bare.
pub fn render_diagnostic(f: &Finding) -> String {
    if f.code == ids::CODE_UNUSED_PACKAGE || f.code == ids::CODE_MISSING_PACKAGE {
        return f.message.clone();
    }
    match &f.location {
        Some(loc) => match loc.line {
            Some(line) => format!("{}:{}: {}", loc.path, line, f.message),
            None => format!("{}: {}", loc.path, f.message),
        },
        None => format!("{}: {}", f.check_id, f.message),
    }
}

/// Human summary of one check, for logs.
pub fn summary_line(r: &CheckResult) -> String {
    let verdict = match r.verdict {
        Verdict::Pass => "pass",
        Verdict::Fail => "FAIL",
        Verdict::Skip => "skipped",
    };
    let n = r.findings.len();
    format!(
        "{}: {} ({} finding{})",
        r.check_id,
        verdict,
        n,
        if n == 1 { "" } else { "s" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{finding, result};
    use buildgate_types::CheckMode;

    #[test]
    fn diagnostics_follow_location_shape() {
        assert_eq!(
            render_diagnostic(&finding("govet", "diagnostic", "unreachable code", Some(("pkg/a.go", Some(10))))),
            "pkg/a.go:10: unreachable code"
        );
        assert_eq!(
            render_diagnostic(&finding("gofmt", "file_flagged", "file is not gofmt-ed", Some(("pkg/a.go", None)))),
            "pkg/a.go: file is not gofmt-ed"
        );
        assert_eq!(
            render_diagnostic(&finding("unittest", "tool_failure", "exited with status 1", None)),
            "unittest: exited with status 1"
        );
    }

    #[test]
    fn dependency_diffs_print_tag_lines() {
        let f = finding(
            "deps",
            ids::CODE_MISSING_PACKAGE,
            "m github.com/stretchr/testify/assert",
            Some(("pkg/a_test.go", Some(5))),
        );
        assert_eq!(render_diagnostic(&f), "m github.com/stretchr/testify/assert");
    }

    #[test]
    fn tool_failure_is_followed_by_output_tail() {
        let mut f = finding("unittest", ids::CODE_TOOL_FAILURE, "exited with status 1", None);
        f.data = serde_json::json!({ "exit_code": 1, "output_tail": ["--- FAIL: TestX", "FAIL"] });
        let lines = render_text(&[result("unittest", CheckMode::Blocking, vec![f])]);
        insta::assert_snapshot!(lines.join("\n"), @r"
        unittest: exited with status 1
            --- FAIL: TestX
            FAIL
        ");
    }

    #[test]
    fn summary_counts_findings() {
        let r = result(
            "golint",
            CheckMode::Observational,
            vec![finding("golint", "diagnostic", "x", None)],
        );
        assert_eq!(summary_line(&r), "golint: FAIL (1 finding)");
    }
}
