//! The `build` use case: cross-compile every entry point for the selected targets.

use crate::context::AppContext;
use buildgate_domain::diagnostics::OUTPUT_TAIL_LINES;
use buildgate_domain::matrix::{BuildPair, build_vars, plan_pairs, select_targets};
use buildgate_domain::template::{expand_args, expand_str};
use buildgate_domain::tool::Invocation;
use buildgate_types::{BuildFailure, BuildOutcome, BuildTarget, BuiltArtifact, Error, VersionInfo};
use std::collections::BTreeMap;

/// Targets a selector list resolves to. Selectors that match nothing are an error.
pub fn resolve_targets(ctx: &AppContext, selectors: &[String]) -> anyhow::Result<Vec<BuildTarget>> {
    let (selected, unmatched) = select_targets(&ctx.config.build.targets, selectors);
    if !unmatched.is_empty() {
        let known: Vec<&str> = ctx.config.build.targets.iter().map(|t| t.id.as_str()).collect();
        anyhow::bail!(
            "unknown build target(s): {} (known: {})",
            unmatched.join(", "),
            known.join(", ")
        );
    }
    Ok(selected)
}

/// Build every (entry point, target) pair. Every artifact carries the same `version`.
///
/// A failing pair is recorded and does not stop the others.
pub fn run_build(
    ctx: &AppContext,
    version: &VersionInfo,
    selectors: &[String],
) -> anyhow::Result<BuildOutcome> {
    let targets = resolve_targets(ctx, selectors)?;
    let build = &ctx.config.build;
    ctx.require_import_path("build command", build.command.iter().chain(build.env.values()))?;
    let entries = ctx.entry_points()?;
    if entries.is_empty() {
        anyhow::bail!(
            "no entry points found under {}",
            ctx.config.build.entry_root
        );
    }

    let pairs = plan_pairs(&entries, &targets);
    tracing::info!(
        entries = entries.len(),
        targets = targets.len(),
        version = %version.version,
        revision = %version.revision_label(),
        "building"
    );

    let pool = ctx.pool()?;
    let results = pool.run_units(
        &pairs,
        &ctx.cancel,
        |pair| build_pair(ctx, version, pair),
        |pair| Err(failure(pair, "cancelled before completion".to_string())),
    );

    let mut outcome = BuildOutcome::default();
    for result in results {
        match result {
            Ok(artifact) => outcome.artifacts.push(artifact),
            Err(fail) => {
                tracing::error!(
                    entry = %fail.entry_point,
                    target = %fail.target_id,
                    "{}",
                    fail.message
                );
                outcome.failures.push(fail);
            }
        }
    }
    Ok(outcome)
}

fn build_pair(ctx: &AppContext, version: &VersionInfo, pair: &BuildPair) -> Result<BuiltArtifact, BuildFailure> {
    let output = pair.artifact_path();
    tracing::info!(entry = %pair.entry, target = %pair.target.id, output = %output, "compiling");

    buildgate_repo::ensure_parent_dir(&ctx.root, &output).map_err(|e| failure(pair, format!("{e:#}")))?;

    let vars = build_vars(pair, version, ctx.import_path(), ctx.root.as_str());
    let env: BTreeMap<String, String> = ctx
        .config
        .build
        .env
        .iter()
        .map(|(k, v)| (k.clone(), expand_str(v, &vars)))
        .collect();
    let inv = Invocation::from_argv(expand_args(&ctx.config.build.command, &vars))
        .ok_or_else(|| failure(pair, "build command expanded to nothing".to_string()))?
        .with_env(env);
    tracing::debug!(command = %inv.display(), "compiler invocation");

    let out = ctx.runner.run(&inv);
    if !out.success() {
        let mut message = Error::ExternalToolFailure {
            tool: inv.program.clone(),
            reason: out.describe_failure(),
        }
        .to_string();
        for line in out.tail(OUTPUT_TAIL_LINES) {
            message.push('\n');
            message.push_str(&line);
        }
        return Err(failure(pair, message));
    }
    if !buildgate_repo::artifact_exists(&ctx.root, &output) {
        return Err(failure(
            pair,
            format!("compiler succeeded but {output} was not written"),
        ));
    }

    Ok(BuiltArtifact {
        entry_point: pair.entry.clone(),
        target_id: pair.target.id.clone(),
        path: output,
    })
}

fn failure(pair: &BuildPair, message: String) -> BuildFailure {
    BuildFailure {
        entry_point: pair.entry.clone(),
        target_id: pair.target.id.clone(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeRunner, Fixture, respond};
    use buildgate_domain::tool::ToolOutput;
    use buildgate_exec::ToolRunner;
    use camino::Utf8PathBuf;

    fn version() -> VersionInfo {
        VersionInfo {
            version: "1.4.0".to_string(),
            revision: "abc1234".to_string(),
            dirty: false,
            build_info: "2026-03-01T12:00:00Z ci@runner".to_string(),
        }
    }

    fn tree() -> Fixture {
        Fixture::new()
            .file("cmd/alpha/main.go", "package main\n")
            .file("cmd/beta/main.go", "package main\n")
            .file("cmd/beta/main_test.go", "package main\n")
            .file("cmd/docs/README.md", "no sources\n")
            .config("[project]\nimport_path = \"example.com/app\"\n")
    }

    /// A compiler that writes whatever follows `-o`.
    fn compiler(root: Utf8PathBuf) -> FakeRunner {
        FakeRunner::new().on("go", move |inv: &Invocation| {
            let out = inv
                .args
                .iter()
                .position(|a| a == "-o")
                .and_then(|i| inv.args.get(i + 1))
                .expect("-o argument");
            std::fs::write(root.join(out), "binary").expect("write artifact");
            ToolOutput {
                exit_code: Some(0),
                ..ToolOutput::default()
            }
        })
    }

    #[test]
    fn builds_every_entry_for_every_target() {
        let fx = tree();
        let runner = compiler(fx.root().to_path_buf());
        let ctx = fx.context(runner.clone());
        let outcome = run_build(&ctx, &version(), &[]).expect("build");

        assert!(outcome.is_success());
        let paths: Vec<&str> = outcome.artifacts.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "bin/linux/alpha",
                "bin/darwin/darwin_amd64/alpha",
                "bin/windows/windows_amd64/alpha.exe",
                "bin/linux/beta",
                "bin/darwin/darwin_amd64/beta",
                "bin/windows/windows_amd64/beta.exe",
            ]
        );
        for p in paths {
            assert!(fx.root().join(p).is_file(), "{p}");
        }
    }

    #[test]
    fn every_invocation_carries_the_same_identity() {
        let fx = tree();
        let runner = compiler(fx.root().to_path_buf());
        let ctx = fx.context(runner.clone());
        run_build(&ctx, &version(), &["windows".to_string()]).expect("build");

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        for call in &calls {
            assert_eq!(call.env["GOOS"], "windows");
            assert_eq!(call.env["GOARCH"], "amd64");
            assert_eq!(call.env["CGO_ENABLED"], "0");
            let ldflags = &call.args[call.args.iter().position(|a| a == "-ldflags").expect("ldflags") + 1];
            assert!(ldflags.contains("example.com/app/pkg/version.VERSION=1.4.0"));
            assert!(ldflags.contains("example.com/app/pkg/version.COMMIT=abc1234"));
            assert!(ldflags.contains("BUILDINFO=2026-03-01T12:00:00Z ci@runner'"));
        }
        assert!(calls.iter().any(|c| c.args.last().map(String::as_str) == Some("./cmd/alpha")));
    }

    #[test]
    fn compiler_failure_is_per_pair() {
        let fx = tree().file("cmd/gamma/main.go", "package main\n");
        let root = fx.root().to_path_buf();
        let ok = compiler(root);
        let runner = FakeRunner::new().on("go", move |inv: &Invocation| {
            let broken = inv.args.last().is_some_and(|e| e == "./cmd/beta")
                && inv.env.get("GOOS").is_some_and(|os| os == "darwin");
            if broken {
                respond(2, "cmd/beta/main.go:3:1: undefined: syscall.Foo\n")(inv)
            } else {
                ok.run(inv)
            }
        });
        let ctx = fx.context(runner);
        let outcome = run_build(&ctx, &version(), &[]).expect("build");

        assert!(!outcome.is_success());
        assert_eq!(outcome.artifacts.len(), 8);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].entry_point.as_str(), "cmd/beta");
        assert_eq!(outcome.failures[0].target_id, "darwin-amd64");
        assert!(outcome.failures[0].message.contains("exited with status 2"));
        assert!(outcome.failures[0].message.contains("undefined: syscall.Foo"));
        assert!(fx.root().join("bin/linux/beta").is_file());
        assert!(fx.root().join("bin/windows/windows_amd64/beta.exe").is_file());
        assert!(!fx.root().join("bin/darwin/darwin_amd64/beta").exists());
    }

    #[test]
    fn import_path_is_detected_from_go_mod() {
        let fx = Fixture::new()
            .file("go.mod", "module example.com/gomod\n\ngo 1.22\n")
            .file("cmd/alpha/main.go", "package main\n");
        let runner = compiler(fx.root().to_path_buf());
        let ctx = fx.context(runner.clone());
        run_build(&ctx, &version(), &["linux".to_string()]).expect("build");

        let calls = runner.calls();
        let ldflags = &calls[0].args[calls[0].args.iter().position(|a| a == "-ldflags").expect("ldflags") + 1];
        assert!(ldflags.contains("-X example.com/gomod/pkg/version.VERSION=1.4.0"));
    }

    #[test]
    fn unknown_import_path_fails_before_compiling() {
        let fx = Fixture::new().file("cmd/alpha/main.go", "package main\n");
        let runner = compiler(fx.root().to_path_buf());
        let ctx = fx.context(runner.clone());
        let err = run_build(&ctx, &version(), &["linux".to_string()]).unwrap_err();
        assert!(err.to_string().contains("project import path is unknown"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn command_without_import_path_needs_none() {
        let fx = Fixture::new()
            .file("cmd/alpha/main.go", "package main\n")
            .config("[build]\ncommand = [\"go\", \"build\", \"-o\", \"{output}\", \"{entry}\"]\n");
        let ctx = fx.context(compiler(fx.root().to_path_buf()));
        let outcome = run_build(&ctx, &version(), &["linux".to_string()]).expect("build");
        assert!(outcome.is_success());
    }

    #[test]
    fn success_without_artifact_is_a_failure() {
        let fx = tree();
        let ctx = fx.context(FakeRunner::new().on("go", respond(0, "")));
        let outcome = run_build(&ctx, &version(), &["linux-amd64".to_string()]).expect("build");
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.failures[0].message.contains("was not written"));
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let fx = tree();
        let ctx = fx.context(FakeRunner::new());
        let err = run_build(&ctx, &version(), &["plan9".to_string()]).unwrap_err();
        assert!(err.to_string().contains("unknown build target(s): plan9"));
    }

    #[test]
    fn no_entry_points_is_an_error() {
        let fx = Fixture::new().file("pkg/a/a.go", "package a\n");
        let ctx = fx.context(FakeRunner::new());
        assert!(run_build(&ctx, &version(), &[]).is_err());
    }

    #[test]
    fn cancelled_build_records_failures() {
        let fx = tree();
        let ctx = fx.context(compiler(fx.root().to_path_buf()));
        ctx.cancel.cancel();
        let outcome = run_build(&ctx, &version(), &[]).expect("build");
        assert!(outcome.artifacts.is_empty());
        assert_eq!(outcome.failures.len(), 6);
    }
}
