use std::path::{Path, PathBuf};

use clap::Parser;

/// Compliance audit of a French FEC ledger export.
///
/// Runs the nine control rules over the file, prints the findings and
/// writes an `.xlsx` report (audit listing or compliance certificate).
#[derive(Parser, Debug)]
#[command(name = "fec-scan", version, about = "Audit a FEC ledger export")]
pub struct CliArgs {
    /// FEC file to audit (tab-separated, Windows-1252)
    pub file: PathBuf,

    /// Client label used in the report (default: the file name)
    #[arg(long)]
    pub client: Option<String>,

    /// Minimum debit for the round-amount rule
    #[arg(long)]
    pub round_threshold: Option<f64>,

    /// Cash register tolerance
    #[arg(long)]
    pub cash_tolerance: Option<f64>,

    /// Path to config file (default: ~/.config/fec-scan/config.toml if present)
    #[arg(long, env = "FEC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Report path (default: Audit_<client>.xlsx in the report directory)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Field separator: `tab` (default) or a single ASCII character such as `|` or `;`
    #[arg(long, default_value = "tab", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Print the anomaly table and summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail on an unreadable file instead of auditing it as empty
    #[arg(long)]
    pub strict: bool,
}

impl CliArgs {
    pub fn client_label(&self) -> String {
        self.client
            .clone()
            .unwrap_or_else(|| file_label(&self.file))
    }
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(format!("expected `tab` or one ASCII character, got '{}'", raw)),
            }
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `Audit_<client>.xlsx`, or `Conformite_<client>.xlsx` for a clean file.
pub fn report_file_name(client: &str, clean: bool) -> String {
    let prefix = if clean { "Conformite" } else { "Audit" };
    format!("{}_{}.xlsx", prefix, client)
}
