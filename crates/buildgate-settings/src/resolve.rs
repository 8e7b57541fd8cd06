use crate::model::{BuildgateConfigV1, CheckConfig, TargetConfig};
use crate::presets::{self, PRESET_GO};
use anyhow::Context;
use buildgate_domain::policy::{
    CheckDefinition, CheckKind, CheckRegistry, EffectiveConfig, OutputFormat, VersionSource,
};
use buildgate_types::{BuildTarget, CheckMode, RepoPath};
use globset::Glob;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub preset: Option<String>,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: BuildgateConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let preset_name = overrides
        .preset
        .clone()
        .or(cfg.preset.clone())
        .unwrap_or_else(|| PRESET_GO.to_string());

    let mut effective = presets::preset(&preset_name)
        .with_context(|| format!("unknown preset: {preset_name} (expected '{PRESET_GO}')"))?;

    // Project
    if let Some(import_path) = cfg.project.import_path.clone() {
        effective.project.import_path = Some(import_path.trim_end_matches('/').to_string());
    }
    if let Some(src_dirs) = cfg.project.src_dirs.clone() {
        if src_dirs.is_empty() {
            anyhow::bail!("project.src_dirs must not be empty");
        }
        effective.project.src_dirs = src_dirs;
    }
    if let Some(exts) = cfg.project.source_extensions.clone() {
        effective.project.source_extensions = exts
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();
    }
    validate_globs("project.exclude", &cfg.project.exclude)?;
    effective.project.exclude = cfg.project.exclude.clone();

    // Version
    effective.version = resolve_version(&cfg, &effective.version)?;

    if let Some(manifest) = cfg.dependencies.manifest.as_deref() {
        effective.dependency_manifest = RepoPath::new(manifest);
    }

    // Checks
    effective.checks = resolve_checks(&effective.checks, &cfg.checks)?;
    if let Some(default_meta) = cfg.meta.default.clone() {
        effective.default_meta = default_meta;
    }
    match effective.checks.get(&effective.default_meta) {
        Some(def) if def.is_meta() => {}
        Some(_) => anyhow::bail!("meta.default is not a meta check: {}", effective.default_meta),
        // A disabled default meta only matters when `meta-check` runs without an id.
        None => {}
    }

    // Build
    let build = &cfg.build;
    if let Some(root) = build.output_root.as_deref() {
        effective.build.output_root = RepoPath::new(root);
    }
    if let Some(root) = build.entry_root.as_deref() {
        effective.build.entry_root = RepoPath::new(root);
    }
    if let Some(entries) = build.entry_points.as_ref() {
        effective.build.entry_points = entries.iter().map(RepoPath::new).collect();
    }
    if let Some(command) = build.command.clone() {
        if command.is_empty() {
            anyhow::bail!("build.command must not be empty");
        }
        effective.build.command = command;
    }
    effective
        .build
        .env
        .extend(build.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    if !build.targets.is_empty() {
        effective.build.targets = resolve_targets(&build.targets, &effective.build.output_root)?;
    }

    // Package
    if let Some(command) = cfg.package.command.clone() {
        if command.is_empty() {
            anyhow::bail!("package.command must not be empty");
        }
        effective.package.command = command;
    }
    if let Some(image) = cfg.package.image.clone() {
        effective.package.image = image;
    }
    if let Some(targets) = cfg.package.targets.clone() {
        effective.package.targets = targets;
    }

    if let Some(jobs) = overrides.jobs.or(cfg.jobs) {
        if jobs == 0 {
            anyhow::bail!("jobs must be at least 1");
        }
        effective.jobs = Some(jobs);
    }

    Ok(ResolvedConfig { effective })
}

fn resolve_version(
    cfg: &BuildgateConfigV1,
    preset: &VersionSource,
) -> anyhow::Result<VersionSource> {
    let file = cfg.version.file.as_deref().map(RepoPath::new);
    match cfg.version.source.as_deref() {
        None => Ok(match (file, preset) {
            (Some(file), _) => VersionSource::File(file),
            (None, preset) => preset.clone(),
        }),
        Some("file") => Ok(VersionSource::File(
            file.unwrap_or_else(|| RepoPath::new("VERSION")),
        )),
        Some("vcs-tag") | Some("git-tag") => Ok(VersionSource::VcsTag),
        Some(other) => anyhow::bail!("unknown version.source: {other} (expected file|vcs-tag)"),
    }
}

fn resolve_checks(
    preset: &CheckRegistry,
    overrides: &BTreeMap<String, CheckConfig>,
) -> anyhow::Result<CheckRegistry> {
    let mut defs: BTreeMap<String, CheckDefinition> = preset
        .iter()
        .map(|d| (d.id.clone(), d.clone()))
        .collect();

    for (check_id, cc) in overrides {
        if cc.enabled == Some(false) {
            defs.remove(check_id);
            continue;
        }
        let def = match defs.get(check_id) {
            Some(existing) => merge_check(existing.clone(), cc),
            None => new_check(check_id, cc),
        }
        .with_context(|| format!("invalid config for check {check_id}"))?;
        defs.insert(check_id.clone(), def);
    }

    validate_meta_graph(&defs)?;
    Ok(CheckRegistry::new(defs.into_values()))
}

fn merge_check(mut def: CheckDefinition, cc: &CheckConfig) -> anyhow::Result<CheckDefinition> {
    if let Some(mode) = cc.mode.as_deref() {
        def.mode = parse_mode(mode)?;
    }
    if let Some(kind) = cc.kind.as_deref() {
        // Changing the kind replaces the definition outright.
        return new_check_with_kind(&def.id, kind, def.mode, cc);
    }
    match &mut def.kind {
        CheckKind::External {
            command,
            format,
            message,
        } => {
            if let Some(c) = cc.command.clone() {
                *command = non_empty_command(c)?;
            }
            if let Some(f) = cc.format.as_deref() {
                *format = parse_format(f)?;
            }
            if let Some(m) = cc.message.clone() {
                *message = Some(m);
            }
        }
        CheckKind::Meta { constituents } => {
            if let Some(c) = cc.constituents.clone() {
                *constituents = c;
            }
        }
        CheckKind::Dependencies => {}
    }
    Ok(def)
}

fn new_check(check_id: &str, cc: &CheckConfig) -> anyhow::Result<CheckDefinition> {
    let mode = match cc.mode.as_deref() {
        Some(m) => parse_mode(m)?,
        None => CheckMode::Blocking,
    };
    let kind = match cc.kind.as_deref() {
        Some(k) => k,
        None if cc.constituents.is_some() => "meta",
        None => "external",
    };
    new_check_with_kind(check_id, kind, mode, cc)
}

fn new_check_with_kind(
    check_id: &str,
    kind: &str,
    mode: CheckMode,
    cc: &CheckConfig,
) -> anyhow::Result<CheckDefinition> {
    let kind = match kind {
        "external" => {
            let command = cc
                .command
                .clone()
                .context("external checks need a command")?;
            CheckKind::External {
                command: non_empty_command(command)?,
                format: match cc.format.as_deref() {
                    Some(f) => parse_format(f)?,
                    None => OutputFormat::Diagnostics,
                },
                message: cc.message.clone(),
            }
        }
        "dependencies" => CheckKind::Dependencies,
        "meta" => CheckKind::Meta {
            constituents: cc
                .constituents
                .clone()
                .context("meta checks need constituents")?,
        },
        other => anyhow::bail!("unknown check kind: {other} (expected external|dependencies|meta)"),
    };
    Ok(CheckDefinition {
        id: check_id.to_string(),
        mode,
        kind,
    })
}

fn non_empty_command(command: Vec<String>) -> anyhow::Result<Vec<String>> {
    if command.is_empty() {
        anyhow::bail!("command must not be empty");
    }
    Ok(command)
}

/// Every constituent must exist and meta checks must not reference themselves, directly or
/// through another meta check.
fn validate_meta_graph(defs: &BTreeMap<String, CheckDefinition>) -> anyhow::Result<()> {
    for def in defs.values() {
        let CheckKind::Meta { constituents } = &def.kind else {
            continue;
        };
        if constituents.is_empty() {
            anyhow::bail!("meta check {} has no constituents", def.id);
        }
        for c in constituents {
            if !defs.contains_key(c) {
                anyhow::bail!("meta check {} references unknown check: {c}", def.id);
            }
        }
        let mut seen = BTreeSet::new();
        if reaches(defs, &def.id, &def.id, &mut seen) {
            anyhow::bail!("meta check {} is part of a cycle", def.id);
        }
    }
    Ok(())
}

fn reaches(
    defs: &BTreeMap<String, CheckDefinition>,
    from: &str,
    target: &str,
    seen: &mut BTreeSet<String>,
) -> bool {
    let Some(CheckKind::Meta { constituents }) = defs.get(from).map(|d| &d.kind) else {
        return false;
    };
    for c in constituents {
        if c == target {
            return true;
        }
        if seen.insert(c.clone()) && reaches(defs, c, target, seen) {
            return true;
        }
    }
    false
}

fn resolve_targets(
    targets: &[TargetConfig],
    output_root: &RepoPath,
) -> anyhow::Result<Vec<BuildTarget>> {
    let mut out: Vec<BuildTarget> = Vec::new();
    for t in targets {
        if t.os.trim().is_empty() || t.arch.trim().is_empty() {
            anyhow::bail!("build target needs both os and arch");
        }
        let id = t
            .id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", t.os, t.arch));
        if out.iter().any(|o| o.id == id) {
            anyhow::bail!("duplicate build target id: {id}");
        }
        let output_dir = match t.output_dir.as_deref() {
            Some(dir) => RepoPath::new(dir),
            None => output_root.join(&format!("{os}/{os}_{arch}", os = t.os, arch = t.arch)),
        };
        out.push(BuildTarget {
            id,
            os: t.os.clone(),
            arch: t.arch.clone(),
            output_dir,
        });
    }
    Ok(out)
}

fn validate_globs(field: &str, patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern).with_context(|| format!("invalid glob in {field}: {pattern}"))?;
    }
    Ok(())
}

fn parse_mode(v: &str) -> anyhow::Result<CheckMode> {
    match v {
        "blocking" | "error" => Ok(CheckMode::Blocking),
        "observational" | "warning" | "warn" => Ok(CheckMode::Observational),
        other => anyhow::bail!("unknown mode: {other} (expected blocking|observational)"),
    }
}

fn parse_format(v: &str) -> anyhow::Result<OutputFormat> {
    match v {
        "diagnostics" => Ok(OutputFormat::Diagnostics),
        "file-list" | "file_list" => Ok(OutputFormat::FileList),
        "exit-status" | "exit_status" => Ok(OutputFormat::ExitStatus),
        other => {
            anyhow::bail!("unknown format: {other} (expected diagnostics|file-list|exit-status)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;
    use buildgate_types::ids;

    fn resolve(toml: &str) -> anyhow::Result<EffectiveConfig> {
        let cfg = parse_config_toml(toml)?;
        Ok(resolve_config(cfg, Overrides::default())?.effective)
    }

    #[test]
    fn empty_config_is_the_go_preset() {
        let eff = resolve("").expect("resolve");
        assert_eq!(eff.preset, "go");
        assert_eq!(eff.project.src_dirs, vec!["cmd", "pkg"]);
        assert_eq!(eff.default_meta, ids::CHECK_STATIC);
        assert_eq!(eff.build.targets.len(), 3);
        assert!(eff.checks.get(ids::CHECK_DEPS).is_some());
        assert_eq!(
            eff.checks.get(ids::CHECK_GOLINT).map(|d| d.mode),
            Some(CheckMode::Observational)
        );
    }

    #[test]
    fn checks_can_be_overridden_added_and_disabled() {
        let eff = resolve(
            r#"
[checks.golint]
mode = "blocking"

[checks.unittest]
enabled = false

[checks.shellcheck]
command = ["shellcheck", "-f", "gcc", "{files}"]
mode = "observational"

[checks.quick]
constituents = ["gofmt", "shellcheck"]
"#,
        )
        .expect("resolve");
        assert_eq!(
            eff.checks.get("golint").map(|d| d.mode),
            Some(CheckMode::Blocking)
        );
        assert!(eff.checks.get("unittest").is_none());
        assert!(matches!(
            eff.checks.get("shellcheck").map(|d| &d.kind),
            Some(CheckKind::External {
                format: OutputFormat::Diagnostics,
                ..
            })
        ));
        assert!(eff.checks.get("quick").is_some_and(|d| d.is_meta()));
    }

    #[test]
    fn meta_with_unknown_constituent_is_rejected() {
        let err = resolve("[checks.quick]\nconstituents = [\"nope\"]\n").unwrap_err();
        assert!(format!("{err:#}").contains("unknown check: nope"));
    }

    #[test]
    fn meta_cycles_are_rejected() {
        let err = resolve(
            "[checks.a]\nconstituents = [\"b\"]\n[checks.b]\nconstituents = [\"a\"]\n",
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("cycle"));
    }

    #[test]
    fn bad_values_are_reported_with_context() {
        let err = resolve("[checks.govet]\nformat = \"xml\"\n").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("invalid config for check govet"));
        assert!(msg.contains("unknown format: xml"));

        assert!(resolve("[project]\nexclude = [\"a/[\"]\n").is_err());
        assert!(resolve("preset = \"rust\"\n").is_err());
        assert!(resolve("[version]\nsource = \"svn\"\n").is_err());
    }

    #[test]
    fn custom_targets_default_their_output_dir() {
        let eff = resolve(
            r#"
[build]
output_root = "dist"

[[build.targets]]
os = "linux"
arch = "arm64"
"#,
        )
        .expect("resolve");
        assert_eq!(eff.build.targets.len(), 1);
        assert_eq!(eff.build.targets[0].id, "linux-arm64");
        assert_eq!(eff.build.targets[0].output_dir.as_str(), "dist/linux/linux_arm64");
    }

    #[test]
    fn overrides_win_over_file() {
        let cfg = parse_config_toml("jobs = 8\n").expect("parse");
        let eff = resolve_config(
            cfg,
            Overrides {
                preset: None,
                jobs: Some(2),
            },
        )
        .expect("resolve")
        .effective;
        assert_eq!(eff.jobs, Some(2));
    }

    #[test]
    fn version_source_selection() {
        assert_eq!(
            resolve("[version]\nsource = \"vcs-tag\"\n").expect("resolve").version,
            VersionSource::VcsTag
        );
        assert_eq!(
            resolve("[version]\nfile = \"build/VERSION\"\n")
                .expect("resolve")
                .version,
            VersionSource::File(RepoPath::new("build/VERSION"))
        );
    }
}
