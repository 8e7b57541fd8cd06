//! Rendering utilities for CI surfaces (plain diagnostics, Markdown, GitHub annotations).

#![forbid(unsafe_code)]

mod gha;
mod markdown;
mod text;

pub use gha::render_github_annotations;
pub use markdown::render_markdown;
pub use text::{render_diagnostic, render_text, summary_line};
