use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use fec_report::AuditSummary;
use fec_rules::{AnomalyRow, AnomalyTable, RuleOutcome, RuleStatus, Severity};
use std::io::{self, Write};
use std::path::Path;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const CRITICAL: Color = Color::Red;
    const HIGH: Color = Color::DarkYellow;
    const MEDIUM: Color = Color::Cyan;
    const SUCCESS: Color = Color::Green;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;

    fn severity(severity: Severity) -> Color {
        match severity {
            Severity::Critical => Self::CRITICAL,
            Severity::High => Self::HIGH,
            Severity::Medium => Self::MEDIUM,
        }
    }
}

/// Plain-text rendering of an audit for the terminal.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the three headline figures.
    pub fn print_summary(&self, summary: &AuditSummary) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("Audit FEC : {}\n", summary.client)),
            ResetColor,
            Print(format!("  Anomalies           {}\n", summary.total_anomalies)),
            Print(format!("  Montant Risque      {}\n", summary.risk_display())),
            Print(format!("  Points de contrôle  {}\n", summary.coverage_display())),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print the anomaly listing, already ordered by severity.
    pub fn print_table(&self, table: &AnomalyTable) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::HEADER),
            Print("Tableau des anomalies (par gravité)\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!(
                "{:<9} {:<44} {:<10} {:<10} {:>12} {:>12} {:<4}\n",
                "GRAVITÉ", "TYPE", "COMPTE", "DATE", "DEBIT", "CREDIT", "JNL"
            )),
            Print(format!("{}\n", "-".repeat(107))),
            ResetColor,
        )?;

        for row in &table.rows {
            execute!(
                stdout,
                SetForegroundColor(Colors::severity(row.severity)),
                Print(format!("{:<9} ", row.severity.label())),
                ResetColor,
                Print(format_row(row)),
            )?;
        }

        stdout.flush()?;
        Ok(())
    }

    /// Clean file: nothing was flagged.
    pub fn print_clean(&self) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::SUCCESS),
            Print("\nAucune anomalie détectée. Dossier conforme.\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Rules skipped for lack of columns.
    pub fn print_skipped(&self, rules: &[RuleOutcome]) -> Result<()> {
        let mut stdout = io::stdout();
        for outcome in rules {
            if let RuleStatus::Skipped { missing } = &outcome.status {
                let names: Vec<&str> = missing.iter().map(|c| c.name()).collect();
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!(
                        "{} ({}) non évaluée, colonnes absentes : {}\n",
                        outcome.rule,
                        outcome.rule.title(),
                        names.join(", ")
                    )),
                    ResetColor,
                )?;
            }
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_report_path(&self, path: &Path) -> Result<()> {
        self.print_info(&format!("\nRapport écrit : {}", path.display()))
    }
}

fn format_row(row: &AnomalyRow) -> String {
    let entry = &row.entry;
    format!(
        "{:<44} {:<10} {:<10} {:>12.2} {:>12.2} {:<4}\n",
        truncate(&row.anomaly_type, 44),
        entry.account.as_deref().unwrap_or("-"),
        entry
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string()),
        entry.debit,
        entry.credit,
        entry.journal.as_deref().unwrap_or("-"),
    )
}

/// Shorten to `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
