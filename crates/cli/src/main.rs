mod cli;
mod config;
mod terminal;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use fec_core::load_dotenv;
use fec_ingest::FecReader;
use fec_report::{AuditSummary, ReportBuilder};
use fec_rules::{AnomalyRow, AuditEngine, RuleOutcome, RuleStatus};

use crate::cli::{report_file_name, CliArgs};
use crate::terminal::Terminal;

/// Machine-readable output of `--json`.
#[derive(Serialize)]
struct JsonOutput<'a> {
    summary: &'a AuditSummary,
    report: &'a Path,
    rules: &'a [RuleOutcome],
    anomalies: &'a [AnomalyRow],
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let terminal = Terminal::new();

    let config = config::resolve(&args).context("failed to load configuration")?;
    config.log_summary();

    let client = args.client_label();
    let reader = FecReader::new().with_delimiter(args.delimiter);
    let ledger = if args.strict {
        reader
            .read_path(&args.file)
            .with_context(|| format!("failed to read FEC file: {}", args.file.display()))?
    } else {
        reader.load_or_empty(&args.file)
    };

    let outcome = AuditEngine::new().run(&ledger, &client, &config.thresholds);
    let summary = AuditSummary::from_table(&outcome.table, &client);
    info!(%summary, "audit finished");

    let report = ReportBuilder::from_config(&config.report).build(&outcome.table, &client);
    let report_path = args.output.clone().unwrap_or_else(|| {
        config
            .report
            .output_dir
            .join(report_file_name(&client, outcome.is_clean()))
    });
    report
        .save(&report_path)
        .with_context(|| format!("failed to write report: {}", report_path.display()))?;

    if args.json {
        let output = JsonOutput {
            summary: &summary,
            report: &report_path,
            rules: &outcome.rules,
            anomalies: &outcome.table.rows,
        };
        let json = serde_json::to_string_pretty(&output).context("failed to serialize output")?;
        println!("{}", json);
        return Ok(());
    }

    terminal.print_summary(&summary)?;
    if outcome.is_clean() {
        terminal.print_clean()?;
    } else {
        terminal.print_table(&outcome.table)?;
    }
    terminal.print_skipped(&outcome.rules)?;
    for failed in outcome.failed_rules() {
        if let RuleStatus::Failed { error } = &failed.status {
            terminal.print_error(&format!("{} ({}): {}", failed.rule, failed.rule.title(), error))?;
        }
    }
    terminal.print_report_path(&report_path)?;

    Ok(())
}
