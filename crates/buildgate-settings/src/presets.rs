use buildgate_domain::policy::{
    BuildPolicy, CheckDefinition, CheckKind, CheckRegistry, EffectiveConfig, OutputFormat,
    PackagePolicy, ProjectPolicy, VersionSource,
};
use buildgate_types::{BuildTarget, CheckMode, RepoPath, ids};
use std::collections::BTreeMap;

pub const PRESET_GO: &str = "go";

/// Preset configurations are opinionated defaults.
///
/// Keep these small and readable. Anything project-specific goes into `buildgate.toml`.
pub fn preset(name: &str) -> Option<EffectiveConfig> {
    match name {
        PRESET_GO => Some(go_preset()),
        _ => None,
    }
}

fn go_preset() -> EffectiveConfig {
    EffectiveConfig {
        preset: PRESET_GO.to_string(),
        project: ProjectPolicy {
            import_path: None,
            src_dirs: vec!["cmd".to_string(), "pkg".to_string()],
            source_extensions: vec!["go".to_string()],
            exclude: Vec::new(),
        },
        version: VersionSource::File(RepoPath::new("VERSION")),
        dependency_manifest: RepoPath::new("vendor/vendor.json"),
        checks: CheckRegistry::new(go_checks()),
        default_meta: ids::CHECK_STATIC.to_string(),
        build: BuildPolicy {
            output_root: RepoPath::new("bin"),
            entry_points: Vec::new(),
            entry_root: RepoPath::new("cmd"),
            command: argv(&[
                "go",
                "build",
                "-installsuffix",
                "static",
                "-ldflags",
                "-X {import_path}/pkg/version.VERSION={version} \
                 -X {import_path}/pkg/version.COMMIT={revision} \
                 -X '{import_path}/pkg/version.BUILDINFO={build_info}'",
                "-o",
                "{output}",
                "{entry}",
            ]),
            env: BTreeMap::from([
                ("GOOS".to_string(), "{os}".to_string()),
                ("GOARCH".to_string(), "{arch}".to_string()),
                ("CGO_ENABLED".to_string(), "0".to_string()),
            ]),
            targets: go_targets(),
        },
        package: PackagePolicy {
            command: argv(&["docker", "build", "-t", "{image}:{version}", "."]),
            image: "app".to_string(),
            targets: vec!["linux".to_string()],
        },
        jobs: None,
    }
}

fn go_targets() -> Vec<BuildTarget> {
    [
        ("linux-amd64", "linux", "bin/linux"),
        ("darwin-amd64", "darwin", "bin/darwin/darwin_amd64"),
        ("windows-amd64", "windows", "bin/windows/windows_amd64"),
    ]
    .into_iter()
    .map(|(id, os, dir)| BuildTarget {
        id: id.to_string(),
        os: os.to_string(),
        arch: "amd64".to_string(),
        output_dir: RepoPath::new(dir),
    })
    .collect()
}

fn go_checks() -> Vec<CheckDefinition> {
    use CheckMode::{Blocking, Observational};
    use OutputFormat::{Diagnostics, ExitStatus, FileList};

    vec![
        external(
            ids::CHECK_GOFMT,
            Blocking,
            FileList,
            &["gofmt", "-l", "{scope}"],
            Some("file is not gofmt-ed"),
        ),
        external(ids::CHECK_GOVET, Blocking, Diagnostics, &["go", "vet", "{scope_pkgs}"], None),
        external(ids::CHECK_GOLINT, Observational, Diagnostics, &["golint", "{scope_pkgs}"], None),
        external(ids::CHECK_UNUSED, Observational, Diagnostics, &["unused", "{scope_pkgs}"], None),
        external(ids::CHECK_MISSPELL, Observational, Diagnostics, &["misspell", "{scope}"], None),
        external(ids::CHECK_DEADCODE, Observational, Diagnostics, &["deadcode", "{scope}"], None),
        external(ids::CHECK_UNITTEST, Blocking, ExitStatus, &["go", "test", "{scope_pkgs}"], None),
        CheckDefinition {
            id: ids::CHECK_DEPS.to_string(),
            mode: Blocking,
            kind: CheckKind::Dependencies,
        },
        CheckDefinition {
            id: ids::CHECK_STATIC.to_string(),
            mode: Blocking,
            kind: CheckKind::Meta {
                constituents: [
                    ids::CHECK_GOFMT,
                    ids::CHECK_GOVET,
                    ids::CHECK_GOLINT,
                    ids::CHECK_UNUSED,
                    ids::CHECK_MISSPELL,
                    ids::CHECK_DEADCODE,
                    ids::CHECK_DEPS,
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            },
        },
    ]
}

fn external(
    id: &str,
    mode: CheckMode,
    format: OutputFormat,
    command: &[&str],
    message: Option<&str>,
) -> CheckDefinition {
    CheckDefinition {
        id: id.to_string(),
        mode,
        kind: CheckKind::External {
            command: argv(command),
            format,
            message: message.map(str::to_string),
        },
    }
}

fn argv(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
