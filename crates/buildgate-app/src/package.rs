//! The `package` use case: hand built artifacts to the external packager.

use crate::build::resolve_targets;
use crate::context::AppContext;
use buildgate_domain::matrix::clean_plan;
use buildgate_domain::template::{TemplateVars, expand_args};
use buildgate_domain::tool::{Invocation, ToolOutput};
use buildgate_types::{RepoPath, VersionInfo};

#[derive(Clone, Debug)]
pub struct PackageRun {
    pub artifacts: Vec<RepoPath>,
    pub command: String,
    pub output: ToolOutput,
}

impl PackageRun {
    pub fn is_success(&self) -> bool {
        self.output.success()
    }
}

/// Package the artifacts of the selected targets (`package.targets` when none are given).
///
/// Missing artifacts are an error; a failing packager is reported through [`PackageRun`].
pub fn run_package(
    ctx: &AppContext,
    version: &VersionInfo,
    selectors: &[String],
) -> anyhow::Result<PackageRun> {
    let selectors = if selectors.is_empty() {
        ctx.config.package.targets.as_slice()
    } else {
        selectors
    };
    let targets = resolve_targets(ctx, selectors)?;
    ctx.require_import_path("package command", &ctx.config.package.command)?;
    let entries = ctx.entry_points()?;
    let artifacts = clean_plan(&entries, &targets);
    if artifacts.is_empty() {
        anyhow::bail!("nothing to package: no entry points found");
    }

    let missing: Vec<&str> = artifacts
        .iter()
        .filter(|a| !buildgate_repo::artifact_exists(&ctx.root, a))
        .map(|a| a.as_str())
        .collect();
    if !missing.is_empty() {
        anyhow::bail!(
            "artifacts not built (run `buildgate build` first): {}",
            missing.join(", ")
        );
    }

    let vars = TemplateVars::new()
        .scalar("version", version.version.as_str())
        .scalar("revision", version.revision_label())
        .scalar("image", ctx.config.package.image.as_str())
        .scalar("root", ctx.root.as_str())
        .scalar("import_path", ctx.import_path().unwrap_or_default())
        .list(
            "artifacts",
            artifacts.iter().map(|a| a.as_str().to_string()).collect(),
        );
    let inv = Invocation::from_argv(expand_args(&ctx.config.package.command, &vars))
        .ok_or_else(|| anyhow::anyhow!("package command is empty"))?;
    let command = inv.display();
    tracing::info!(command = %command, artifacts = artifacts.len(), "packaging");

    let output = ctx.runner.run(&inv);
    if !output.success() {
        tracing::error!(command = %command, "{}", output.describe_failure());
    }
    Ok(PackageRun {
        artifacts,
        command,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeRunner, Fixture, respond};

    fn version() -> VersionInfo {
        VersionInfo {
            version: "1.4.0".to_string(),
            revision: "abc1234".to_string(),
            dirty: true,
            build_info: String::new(),
        }
    }

    fn built() -> Fixture {
        Fixture::new()
            .file("cmd/alpha/main.go", "package main\n")
            .file("bin/linux/alpha", "bin")
            .config("[package]\nimage = \"acme/alpha\"\ncommand = [\"docker\", \"build\", \"-t\", \"{image}:{version}\", \"--label\", \"rev={revision}\", \".\", \"{artifacts}\"]\n")
    }

    #[test]
    fn runs_packager_with_expanded_template() {
        let fx = built();
        let runner = FakeRunner::new().on("docker", respond(0, "Successfully tagged acme/alpha:1.4.0\n"));
        let ctx = fx.context(runner.clone());
        let run = run_package(&ctx, &version(), &[]).expect("package");

        assert!(run.is_success());
        assert_eq!(run.output.stdout, "Successfully tagged acme/alpha:1.4.0\n");
        let call = &runner.calls()[0];
        assert_eq!(
            call.args,
            vec!["build", "-t", "acme/alpha:1.4.0", "--label", "rev=abc1234-dirty", ".", "bin/linux/alpha"]
        );
    }

    #[test]
    fn packager_failure_is_reported_not_raised() {
        let fx = built();
        let ctx = fx.context(FakeRunner::new().on("docker", respond(1, "no daemon\n")));
        let run = run_package(&ctx, &version(), &[]).expect("package");
        assert!(!run.is_success());
    }

    #[test]
    fn missing_artifacts_are_listed() {
        let fx = built();
        let ctx = fx.context(FakeRunner::new());
        let err = run_package(&ctx, &version(), &["windows".to_string()]).unwrap_err();
        assert!(err.to_string().contains("bin/windows/windows_amd64/alpha.exe"));
    }
}
