//! CLI entry point for buildgate.
//!
//! This module is intentionally thin: it handles argument parsing, IO, and exit codes.
//! All business logic lives in the `buildgate-app` crate.

mod logging;

use anyhow::Context;
use buildgate_app::{
    AppContext, BuilderIdentity, CheckRequest, CheckRun, DiagnosticFormat, ExplainOutput,
    ReportInput, build_report, check_exit_code, compute_version, format_version, load_config,
    render_diagnostics, render_markdown, run_build, run_checks, run_clean, run_dependency_check,
    run_explain, run_meta_check, run_package, verdict_exit_code, write_output, write_report,
};
use buildgate_settings::Overrides;
use buildgate_types::{AggregateResult, VersionInfo};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use time::OffsetDateTime;

/// Space-separated scope directories, honoured when no `--scope` flag is given.
const SCOPE_ENV: &str = "SRC_DIRS";

#[derive(Parser, Debug)]
#[command(
    name = "buildgate",
    version,
    about = "Scoped static checks, vendor reconciliation and versioned cross-compilation"
)]
struct Cli {
    /// Project root.
    #[arg(long, global = true, default_value = ".")]
    root: Utf8PathBuf,

    /// Config file, relative to the root. A missing file means preset defaults.
    #[arg(long, global = true, default_value = "buildgate.toml")]
    config: Utf8PathBuf,

    /// Override the configuration preset.
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Worker threads for checks and build pairs (default: available parallelism).
    #[arg(long, global = true)]
    jobs: Option<usize>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the version, revision and build info that builds would embed.
    Version,

    /// Remove every artifact of the build matrix.
    Clean,

    /// Cross-compile entry points for the selected targets (default: all).
    Build {
        /// Target id or operating system, e.g. `linux` or `windows-amd64`.
        selectors: Vec<String>,
    },

    /// Run one or more checks and print their diagnostics.
    Check {
        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        out: RunOutputArgs,
    },

    /// Run a meta check (default: the configured one).
    MetaCheck {
        id: Option<String>,

        #[command(flatten)]
        out: RunOutputArgs,
    },

    /// Compare vendored packages with the packages the sources import.
    DependencyCheck {
        #[command(flatten)]
        out: RunOutputArgs,
    },

    /// Hand built artifacts to the packager.
    Package {
        /// Target selectors (default: `package.targets`).
        selectors: Vec<String>,
    },

    /// Explain a check id or finding code.
    Explain { identifier: String },
}

#[derive(Args, Debug, Clone)]
struct RunOutputArgs {
    /// Source directories to check, replacing the configured default. Repeatable or
    /// comma separated.
    #[arg(long, value_delimiter = ',')]
    scope: Vec<String>,

    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,

    /// Write a JSON report.
    #[arg(long)]
    report_out: Option<Utf8PathBuf>,

    /// Write a Markdown summary.
    #[arg(long)]
    markdown_out: Option<Utf8PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FormatArg {
    Text,
    Github,
}

impl From<FormatArg> for DiagnosticFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Text => DiagnosticFormat::Text,
            FormatArg::Github => DiagnosticFormat::Github,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    logging::init_logging(logging::resolve_level(
        cli.log_level.as_deref(),
        cli.verbose,
        cli.quiet,
    ));
    tracing::debug!(?cli, "buildgate starting");

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("buildgate error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<u8> {
    if let Commands::Explain { identifier } = &cli.cmd {
        return Ok(cmd_explain(identifier));
    }

    let ctx = load_context(cli)?;
    match &cli.cmd {
        Commands::Version => cmd_version(&ctx),
        Commands::Clean => cmd_clean(&ctx),
        Commands::Build { selectors } => cmd_build(&ctx, selectors),
        Commands::Check { ids, out } => {
            let request = CheckRequest {
                check_ids: ids.clone(),
                scope_override: scope_override(&out.scope),
            };
            let run = run_checks(&ctx, &request)?;
            emit_run("check", &run, out)?;
            Ok(exit_u8(check_exit_code(&run.aggregate)))
        }
        Commands::MetaCheck { id, out } => {
            let run = run_meta_check(&ctx, id.as_deref(), scope_override(&out.scope))?;
            emit_run("meta-check", &run, out)?;
            Ok(exit_u8(check_exit_code(&run.aggregate)))
        }
        Commands::DependencyCheck { out } => cmd_dependency_check(&ctx, out),
        Commands::Package { selectors } => cmd_package(&ctx, selectors),
        Commands::Explain { .. } => Ok(0),
    }
}

fn load_context(cli: &Cli) -> anyhow::Result<AppContext> {
    let root = cli
        .root
        .canonicalize_utf8()
        .unwrap_or_else(|_| cli.root.clone());
    if !root.is_dir() {
        anyhow::bail!("project root does not exist: {root}");
    }

    // A missing config file is allowed (preset defaults apply).
    let cfg_path = root.join(&cli.config);
    let cfg_text = match std::fs::read_to_string(&cfg_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("read config {cfg_path}")),
    };
    let overrides = Overrides {
        preset: cli.preset.clone(),
        jobs: cli.jobs,
    };
    let config = load_config(&cfg_text, overrides).with_context(|| format!("config {cfg_path}"))?;
    AppContext::with_processes(&root, config)
}

fn scope_override(flags: &[String]) -> Option<Vec<String>> {
    if !flags.is_empty() {
        return Some(flags.to_vec());
    }
    let from_env: Vec<String> = std::env::var(SCOPE_ENV)
        .ok()?
        .split_whitespace()
        .map(str::to_string)
        .collect();
    (!from_env.is_empty()).then_some(from_env)
}

fn builder_identity() -> anyhow::Result<BuilderIdentity> {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string());
    // Reproducible builds pin the clock.
    let timestamp = match std::env::var("SOURCE_DATE_EPOCH") {
        Ok(epoch) => {
            let secs: i64 = epoch
                .trim()
                .parse()
                .with_context(|| format!("SOURCE_DATE_EPOCH is not an integer: {epoch}"))?;
            OffsetDateTime::from_unix_timestamp(secs).context("SOURCE_DATE_EPOCH out of range")?
        }
        Err(_) => OffsetDateTime::now_utc(),
    };
    Ok(BuilderIdentity {
        user,
        host,
        timestamp,
    })
}

fn version_info(ctx: &AppContext) -> anyhow::Result<VersionInfo> {
    compute_version(ctx, &builder_identity()?)
}

fn cmd_version(ctx: &AppContext) -> anyhow::Result<u8> {
    let info = version_info(ctx)?;
    for line in format_version(&info) {
        println!("{line}");
    }
    Ok(0)
}

fn cmd_clean(ctx: &AppContext) -> anyhow::Result<u8> {
    let report = run_clean(ctx)?;
    for path in &report.removed {
        println!("removed {path}");
    }
    Ok(0)
}

fn cmd_build(ctx: &AppContext, selectors: &[String]) -> anyhow::Result<u8> {
    let info = version_info(ctx)?;
    if selectors.is_empty() {
        for target in &ctx.config.build.targets {
            println!("building {}", target.id);
        }
    } else {
        for selector in selectors {
            println!("building {selector}");
        }
    }

    let outcome = run_build(ctx, &info, selectors)?;
    for artifact in &outcome.artifacts {
        println!("built {}", artifact.path);
    }
    for failure in &outcome.failures {
        let mut lines = failure.message.lines();
        println!(
            "failed {} ({}): {}",
            failure.entry_point,
            failure.target_id,
            lines.next().unwrap_or_default()
        );
        for line in lines {
            println!("    {line}");
        }
    }
    Ok(if outcome.is_success() { 0 } else { 2 })
}

fn cmd_dependency_check(ctx: &AppContext, out: &RunOutputArgs) -> anyhow::Result<u8> {
    let started_at = OffsetDateTime::now_utc();
    let run = run_dependency_check(ctx, scope_override(&out.scope))?;
    let verdict = run.result.verdict;
    let check_run = CheckRun {
        scope: run.scope,
        aggregate: AggregateResult {
            verdict,
            results: vec![run.result],
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
    };
    emit_run("dependency-check", &check_run, out)?;
    Ok(exit_u8(verdict_exit_code(verdict)))
}

fn cmd_package(ctx: &AppContext, selectors: &[String]) -> anyhow::Result<u8> {
    let info = version_info(ctx)?;
    let run = run_package(ctx, &info, selectors)?;
    print!("{}", run.output.stdout);
    eprint!("{}", run.output.stderr);
    if run.is_success() {
        Ok(0)
    } else {
        eprintln!("packaging failed: {}", run.output.describe_failure());
        Ok(2)
    }
}

fn cmd_explain(identifier: &str) -> u8 {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", buildgate_app::format_explanation(&exp));
            0
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                buildgate_app::format_not_found(&identifier, available_check_ids, available_codes)
            );
            1
        }
    }
}

/// Print diagnostics, then write any requested report files.
fn emit_run(operation: &str, run: &CheckRun, out: &RunOutputArgs) -> anyhow::Result<()> {
    for line in render_diagnostics(out.format.into(), &run.aggregate.results) {
        println!("{line}");
    }

    if let Some(path) = &out.report_out {
        let report = build_report(ReportInput {
            operation,
            scope: &run.scope,
            aggregate: &run.aggregate,
            started_at: run.started_at,
            finished_at: run.finished_at,
        });
        write_report(path, &report).context("write report json")?;
        tracing::info!(path = %path, "wrote report");
    }
    if let Some(path) = &out.markdown_out {
        write_markdown(path, operation, &run.aggregate)?;
    }
    Ok(())
}

fn write_markdown(path: &Utf8Path, operation: &str, agg: &AggregateResult) -> anyhow::Result<()> {
    let md = render_markdown(operation, agg);
    write_output(path, md.as_bytes()).context("write markdown")
}

fn exit_u8(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
