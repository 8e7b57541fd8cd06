//! Config parsing and preset resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{
    BuildConfig, BuildgateConfigV1, CheckConfig, DependenciesConfig, MetaConfig, PackageConfig,
    ProjectConfig, TargetConfig, VersionConfig,
};
pub use presets::{PRESET_GO, preset};
pub use resolve::{Overrides, ResolvedConfig};

/// Parse `buildgate.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<BuildgateConfigV1> {
    let cfg: BuildgateConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by every operation (preset + repo config + overrides).
pub fn resolve_config(
    cfg: BuildgateConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
