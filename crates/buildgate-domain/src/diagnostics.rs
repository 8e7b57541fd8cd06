//! Turning external tool output into findings and a check result.

use crate::fingerprint::stamp;
use crate::policy::OutputFormat;
use crate::scope::SourceScope;
use crate::tool::ToolOutput;
use buildgate_types::ids;
use buildgate_types::{CheckMode, CheckResult, Finding, Location, RepoPath, Verdict};
use camino::Utf8Path;
use serde_json::json;

/// Number of output lines attached to a `tool_failure` finding.
pub const OUTPUT_TAIL_LINES: usize = 20;

/// Severity words some tools put at the start of a diagnostic message.
const TOOL_SEVERITY_WORDS: &[&str] = &["error", "warning", "info", "note", "fatal"];

/// Static description of an external check, borrowed from its definition.
#[derive(Clone, Copy, Debug)]
pub struct ToolCheck<'a> {
    pub check_id: &'a str,
    pub mode: CheckMode,
    pub format: OutputFormat,
    /// Message for `FileList` findings.
    pub message: Option<&'a str>,
}

/// A `path:line[:col]: message` line split into parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedDiagnostic<'a> {
    pub path: &'a str,
    pub line: u32,
    pub col: Option<u32>,
    pub message: &'a str,
}

pub fn parse_diagnostic_line(line: &str) -> Option<ParsedDiagnostic<'_>> {
    let line = line.trim_end();
    // The path is everything before the first `:<digits>:` run.
    for (idx, _) in line.match_indices(':') {
        if idx == 0 {
            continue;
        }
        let rest = &line[idx + 1..];
        let Some((line_no, after)) = leading_number(rest) else {
            continue;
        };
        let Some(after) = after.strip_prefix(':') else {
            continue;
        };
        let (col, after) = match leading_number(after) {
            Some((col, tail)) => match tail.strip_prefix(':') {
                Some(tail) => (Some(col), tail),
                None => continue,
            },
            None => (None, after),
        };
        let message = after.trim();
        if message.is_empty() {
            return None;
        }
        return Some(ParsedDiagnostic {
            path: line[..idx].trim(),
            line: line_no,
            col,
            message,
        });
    }
    None
}

fn leading_number(s: &str) -> Option<(u32, &str)> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let n = s[..end].parse().ok()?;
    Some((n, &s[end..]))
}

/// Split a leading `warning:` / `error:` style tag off a message.
pub fn split_tool_severity(message: &str) -> (Option<String>, &str) {
    if let Some((word, rest)) = message.split_once(':') {
        let lowered = word.trim().to_ascii_lowercase();
        if TOOL_SEVERITY_WORDS.contains(&lowered.as_str()) {
            return (Some(lowered), rest.trim_start());
        }
    }
    (None, message)
}

/// Parse the tool output, filter it by scope and derive the verdict.
///
/// `duration_ms` is left at zero for the caller to fill.
pub fn evaluate_tool_output(
    check: &ToolCheck<'_>,
    output: &ToolOutput,
    root: &Utf8Path,
    scope: &SourceScope,
) -> CheckResult {
    let parsed = if output.spawn_error.is_some() {
        Vec::new()
    } else {
        match check.format {
            OutputFormat::Diagnostics => parse_diagnostics(check, output, root),
            OutputFormat::FileList => parse_file_list(check, output, root),
            OutputFormat::ExitStatus => Vec::new(),
        }
    };

    let mut findings = scope.retain_in_scope(parsed.clone());
    if !output.success() && parsed.is_empty() {
        findings.push(tool_failure(check, output));
    }

    CheckResult {
        check_id: check.check_id.to_string(),
        mode: check.mode,
        verdict: Verdict::from_pass(findings.is_empty()),
        findings,
        exit_code: output.exit_code,
        duration_ms: 0,
    }
}

fn parse_diagnostics(check: &ToolCheck<'_>, output: &ToolOutput, root: &Utf8Path) -> Vec<Finding> {
    output
        .lines()
        .filter_map(parse_diagnostic_line)
        .map(|d| diagnostic_finding(check, &d, root))
        .collect()
}

fn parse_file_list(check: &ToolCheck<'_>, output: &ToolOutput, root: &Utf8Path) -> Vec<Finding> {
    let message = check
        .message
        .map(str::to_string)
        .unwrap_or_else(|| format!("flagged by {}", check.check_id));

    let mut findings: Vec<Finding> = output
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            stamp(Finding {
                severity: check.mode.finding_severity(),
                check_id: check.check_id.to_string(),
                code: ids::CODE_FILE_FLAGGED.to_string(),
                message: message.clone(),
                location: Some(Location::file(RepoPath::relative_to(root, l))),
                tool_severity: None,
                help: None,
                fingerprint: None,
                data: serde_json::Value::Null,
            })
        })
        .collect();

    // Syntax errors from list-style tools arrive on stderr in diagnostic form.
    findings.extend(
        output
            .stderr
            .lines()
            .filter_map(parse_diagnostic_line)
            .map(|d| diagnostic_finding(check, &d, root)),
    );
    findings
}

fn diagnostic_finding(check: &ToolCheck<'_>, d: &ParsedDiagnostic<'_>, root: &Utf8Path) -> Finding {
    let (tool_severity, message) = split_tool_severity(d.message);
    stamp(Finding {
        severity: check.mode.finding_severity(),
        check_id: check.check_id.to_string(),
        code: ids::CODE_DIAGNOSTIC.to_string(),
        message: message.to_string(),
        location: Some(Location {
            path: RepoPath::relative_to(root, d.path),
            line: Some(d.line),
            col: d.col,
        }),
        tool_severity,
        help: None,
        fingerprint: None,
        data: serde_json::Value::Null,
    })
}

fn tool_failure(check: &ToolCheck<'_>, output: &ToolOutput) -> Finding {
    stamp(Finding {
        severity: check.mode.finding_severity(),
        check_id: check.check_id.to_string(),
        code: ids::CODE_TOOL_FAILURE.to_string(),
        message: output.describe_failure(),
        location: None,
        tool_severity: None,
        help: Some(format!("Run `buildgate explain {}` for details.", ids::CODE_TOOL_FAILURE)),
        fingerprint: None,
        data: json!({
            "exit_code": output.exit_code,
            "output_tail": output.tail(OUTPUT_TAIL_LINES),
        }),
    })
}
