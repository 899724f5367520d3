use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fec_core::AuditConfig;
use tracing::debug;

use crate::cli::CliArgs;

/// Default config file path: ~/.config/fec-scan/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fec-scan").join("config.toml"))
}

/// Resolve the run configuration.
/// Priority: CLI flags > environment > config file > defaults.
pub fn resolve(args: &CliArgs) -> Result<AuditConfig> {
    let mut config = load_file_or_env(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    Ok(config)
}

fn load_file_or_env(explicit: Option<&Path>) -> Result<AuditConfig> {
    if let Some(path) = explicit {
        debug!(?path, "Loading config");
        return AuditConfig::from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()));
    }
    match default_config_path() {
        Some(path) if path.exists() => {
            debug!(?path, "Loading config");
            AuditConfig::from_file(&path)
                .with_context(|| format!("failed to load config: {}", path.display()))
        }
        _ => {
            debug!("Config file not found, using defaults");
            Ok(AuditConfig::from_env())
        }
    }
}

fn apply_overrides(config: &mut AuditConfig, args: &CliArgs) {
    if let Some(v) = args.round_threshold {
        config.thresholds.round_amount = v;
    }
    if let Some(v) = args.cash_tolerance {
        config.thresholds.cash_tolerance = v;
    }
}
