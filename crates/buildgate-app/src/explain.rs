//! The `explain` use case: look up check/code documentation.

use buildgate_types::explain::{self, Explanation};

/// Output from the explain use case.
#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(Explanation),
    /// Unknown identifier; includes available check ids and codes.
    NotFound {
        identifier: String,
        available_check_ids: &'static [&'static str],
        available_codes: &'static [&'static str],
    },
}

pub fn run_explain(identifier: &str) -> ExplainOutput {
    match explain::lookup_explanation(identifier) {
        Some(exp) => ExplainOutput::Found(exp),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_check_ids: explain::all_check_ids(),
            available_codes: explain::all_codes(),
        },
    }
}

/// Format an explanation for terminal display.
pub fn format_explanation(exp: &Explanation) -> String {
    let mut out = String::new();

    out.push_str(exp.title);
    out.push('\n');
    out.push_str(&"=".repeat(exp.title.len()));
    out.push_str("\n\n");
    out.push_str(exp.description);
    out.push_str("\n\n");
    out.push_str("Remediation\n");
    out.push_str("-----------\n");
    out.push_str(exp.remediation);
    out.push('\n');

    out
}

pub fn format_not_found(identifier: &str, check_ids: &[&str], codes: &[&str]) -> String {
    let mut out = format!("Unknown check id or code: {identifier}\n\n");
    out.push_str("Available check ids:\n");
    for id in check_ids {
        out.push_str(&format!("  - {id}\n"));
    }
    out.push_str("\nAvailable codes:\n");
    for code in codes {
        out.push_str(&format!("  - {code}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildgate_types::ids;

    #[test]
    fn explains_checks_and_codes() {
        assert!(matches!(run_explain(ids::CHECK_GOFMT), ExplainOutput::Found(_)));
        assert!(matches!(run_explain(ids::CODE_MISSING_PACKAGE), ExplainOutput::Found(_)));
    }

    #[test]
    fn every_listed_identifier_resolves() {
        for id in explain::all_check_ids().iter().chain(explain::all_codes()) {
            assert!(matches!(run_explain(id), ExplainOutput::Found(_)), "{id}");
        }
    }

    #[test]
    fn unknown_identifier_lists_alternatives() {
        let ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } = run_explain("nope")
        else {
            panic!("expected NotFound");
        };
        let text = format_not_found(&identifier, available_check_ids, available_codes);
        assert!(text.starts_with("Unknown check id or code: nope"));
        assert!(text.contains("  - gofmt\n"));
        assert!(text.contains("  - tool_failure\n"));
    }

    #[test]
    fn formatted_explanation_has_remediation() {
        let ExplainOutput::Found(exp) = run_explain(ids::CHECK_DEPS) else {
            panic!("expected Found");
        };
        let text = format_explanation(&exp);
        assert!(text.starts_with(exp.title));
        assert!(text.contains("Remediation\n-----------\n"));
    }
}
