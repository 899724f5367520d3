use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_f64(profile: &str, key: &str) -> Option<f64> {
    profiled_env_opt(profile, key).and_then(|v| v.replace(',', ".").parse().ok())
}

fn profiled_env_u16(profile: &str, key: &str) -> Option<u16> {
    profiled_env_opt(profile, key).and_then(|v| v.parse().ok())
}

// ── Top-level config ──────────────────────────────────────────

/// Resolved settings for one audit run.
///
/// Layering, lowest to highest: built-in defaults, optional TOML file,
/// environment (`FEC_*`, optionally prefixed by the active profile), then
/// whatever the caller applies on top (CLI flags).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Active profile name (empty = default).
    #[serde(skip)]
    pub profile: String,
    pub thresholds: Thresholds,
    pub report: ReportConfig,
}

impl AuditConfig {
    /// Build config from defaults and environment variables (call
    /// `load_dotenv()` first). Profile is read from `FEC_PROFILE`.
    pub fn from_env() -> Self {
        let profile = env_or("FEC_PROFILE", "").to_uppercase();
        let mut config = Self::default();
        config.apply_env(&profile);
        config
    }

    /// Parse a TOML file, then apply environment overrides on top.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        let profile = env_or("FEC_PROFILE", "").to_uppercase();
        config.apply_env(&profile);
        Ok(config)
    }

    /// Load from `path` when given, otherwise from the environment alone.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::from_env()),
        }
    }

    fn apply_env(&mut self, profile: &str) {
        self.profile = profile.to_string();
        self.thresholds.apply_env(profile);
        self.report.apply_env(profile);
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  thresholds:  round_amount={}, cash_tolerance={}",
            self.thresholds.round_amount,
            self.thresholds.cash_tolerance
        );
        tracing::info!(
            "  report:      dir={}, column_width={}",
            self.report.output_dir.display(),
            self.report.column_width
        );
    }
}

// ── Thresholds ────────────────────────────────────────────────

/// The two user-adjustable numbers of an audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum debit for the round-amount rule.
    pub round_amount: f64,
    /// Cash register tolerance. Carried for display and logging; the
    /// negativity test itself uses a fixed 0.01 epsilon.
    pub cash_tolerance: f64,
}

pub const DEFAULT_ROUND_AMOUNT: f64 = 500.0;
pub const DEFAULT_CASH_TOLERANCE: f64 = 5.0;

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            round_amount: DEFAULT_ROUND_AMOUNT,
            cash_tolerance: DEFAULT_CASH_TOLERANCE,
        }
    }
}

impl Thresholds {
    fn apply_env(&mut self, p: &str) {
        if let Some(v) = profiled_env_f64(p, "FEC_ROUND_AMOUNT_THRESHOLD") {
            self.round_amount = v;
        }
        if let Some(v) = profiled_env_f64(p, "FEC_CASH_TOLERANCE") {
            self.cash_tolerance = v;
        }
    }
}

// ── Report ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory the generated workbook is written to.
    pub output_dir: PathBuf,
    /// Width of every detail column, in characters.
    pub column_width: u16,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            column_width: 20,
        }
    }
}

impl ReportConfig {
    fn apply_env(&mut self, p: &str) {
        if let Some(dir) = profiled_env_opt(p, "FEC_REPORT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(w) = profiled_env_u16(p, "FEC_COLUMN_WIDTH") {
            self.column_width = w;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_audit_policy() {
        let config = AuditConfig::default();
        assert_eq!(config.thresholds.round_amount, 500.0);
        assert_eq!(config.thresholds.cash_tolerance, 5.0);
        assert_eq!(config.report.column_width, 20);
        assert_eq!(config.profile_label(), "default");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AuditConfig = toml::from_str(
            r#"
[thresholds]
round_amount = 1000.0
"#,
        )
        .unwrap();
        assert_eq!(config.thresholds.round_amount, 1000.0);
        assert_eq!(config.thresholds.cash_tolerance, 5.0);
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn from_file_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fec-scan.toml");
        std::fs::write(&path, "thresholds = 12").unwrap();
        let err = AuditConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = AuditConfig::from_file(Path::new("/nonexistent/fec-scan.toml")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
