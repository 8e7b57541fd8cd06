//! Render use cases: diagnostics for stdout and Markdown summaries.

use buildgate_types::{AggregateResult, CheckResult};

/// How findings are printed on stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiagnosticFormat {
    #[default]
    Text,
    /// GitHub Actions workflow commands.
    Github,
}

pub fn render_diagnostics(format: DiagnosticFormat, results: &[CheckResult]) -> Vec<String> {
    match format {
        DiagnosticFormat::Text => buildgate_render::render_text(results),
        DiagnosticFormat::Github => buildgate_render::render_github_annotations(results),
    }
}

pub fn render_markdown(operation: &str, agg: &AggregateResult) -> String {
    buildgate_render::render_markdown(operation, agg)
}
