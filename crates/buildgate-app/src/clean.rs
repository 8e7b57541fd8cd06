//! The `clean` use case.

use crate::context::AppContext;
use buildgate_domain::matrix::clean_plan;
use buildgate_repo::CleanReport;

/// Remove every artifact the full build matrix would produce. Safe to repeat.
pub fn run_clean(ctx: &AppContext) -> anyhow::Result<CleanReport> {
    let entries = ctx.entry_points()?;
    let plan = clean_plan(&entries, &ctx.config.build.targets);
    let report = buildgate_repo::remove_artifacts(&ctx.root, &plan, &ctx.config.build.output_root)?;
    tracing::info!(
        planned = plan.len(),
        removed = report.removed.len(),
        pruned = report.pruned_dirs.len(),
        "clean finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeRunner, Fixture};

    #[test]
    fn removes_matrix_artifacts_and_is_idempotent() {
        let fx = Fixture::new()
            .file("cmd/alpha/main.go", "package main\n")
            .file("bin/linux/alpha", "bin")
            .file("bin/windows/windows_amd64/alpha.exe", "bin")
            .file("bin/linux/notes.txt", "keep me");
        let ctx = fx.context(FakeRunner::new());

        let first = run_clean(&ctx).expect("clean");
        let removed: Vec<&str> = first.removed.iter().map(|p| p.as_str()).collect();
        assert_eq!(removed, vec!["bin/linux/alpha", "bin/windows/windows_amd64/alpha.exe"]);
        assert!(!fx.root().join("bin/windows").exists());
        assert!(fx.root().join("bin/linux/notes.txt").is_file());

        let second = run_clean(&ctx).expect("clean again");
        assert!(second.removed.is_empty());
        assert!(second.pruned_dirs.is_empty());
    }

    #[test]
    fn nothing_built_is_fine() {
        let fx = Fixture::new().file("cmd/alpha/main.go", "package main\n");
        let ctx = fx.context(FakeRunner::new());
        assert_eq!(run_clean(&ctx).expect("clean"), CleanReport::default());
    }
}
