//! Turns an anomaly table into the two-sheet report document.
//!
//! The report is a plain value (sheets of cells). Serialization to `.xlsx`
//! lives in [`crate::xlsx`]; anything else that can render rows of cells
//! may consume it too.

use chrono::NaiveDate;
use fec_core::{Column, ReportConfig};
use fec_rules::{AnomalyRow, AnomalyTable};
use serde::Serialize;
use tracing::debug;

pub const SUMMARY_SHEET: &str = "SYNTHESE";
pub const DETAIL_SHEET: &str = "DETAILS_ANOMALIES";
pub const CLEAN_FILE_MESSAGE: &str = "Aucune anomalie ! Bravo.";

const SUMMARY_HEADER: [&str; 4] = [
    "Fichier",
    "Total Anomalies",
    "Montant Total Risque",
    "Nb Règles Touchées",
];

/// Ledger columns of the detail listing, in display order. Severity and
/// anomaly type come first and are always present.
const DETAIL_COLUMNS: [Column; 6] = [
    Column::Account,
    Column::Date,
    Column::Label,
    Column::Debit,
    Column::Credit,
    Column::Journal,
];

// ── Document model ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    /// Written as a spreadsheet date, not as text.
    Date(NaiveDate),
    Empty,
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    fn opt_text(s: Option<&str>) -> Self {
        s.map(Cell::text).unwrap_or(Cell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    /// Bold header row; empty means the sheet has none.
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Width applied to every used column, if set.
    pub column_width: Option<u16>,
}

impl Sheet {
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub client: String,
    pub sheets: Vec<Sheet>,
}

impl AuditReport {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// True when the detail sheet is the "no anomaly" certificate.
    pub fn is_certificate(&self) -> bool {
        self.sheet(DETAIL_SHEET)
            .map(|s| s.header.is_empty())
            .unwrap_or(false)
    }
}

// ── Builder ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ReportBuilder {
    column_width: u16,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

impl ReportBuilder {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            column_width: config.column_width,
        }
    }

    pub fn build(&self, table: &AnomalyTable, client: &str) -> AuditReport {
        let sheets = vec![summary_sheet(table, client), self.detail_sheet(table)];
        debug!(client = %client, rows = table.len(), "report built");
        AuditReport {
            client: client.to_string(),
            sheets,
        }
    }

    fn detail_sheet(&self, table: &AnomalyTable) -> Sheet {
        if table.is_empty() {
            return Sheet {
                name: DETAIL_SHEET.to_string(),
                header: Vec::new(),
                rows: vec![vec![Cell::text(CLEAN_FILE_MESSAGE)]],
                column_width: None,
            };
        }

        let columns: Vec<Column> = DETAIL_COLUMNS
            .into_iter()
            .filter(|c| table.columns.contains(*c))
            .collect();

        let mut header = vec!["Gravité".to_string(), "Type_Anomalie".to_string()];
        header.extend(columns.iter().map(|c| c.name().to_string()));

        let rows = table
            .rows
            .iter()
            .map(|row| detail_row(row, &columns))
            .collect();

        Sheet {
            name: DETAIL_SHEET.to_string(),
            header,
            rows,
            column_width: Some(self.column_width),
        }
    }
}

fn summary_sheet(table: &AnomalyTable, client: &str) -> Sheet {
    Sheet {
        name: SUMMARY_SHEET.to_string(),
        header: SUMMARY_HEADER.iter().map(|h| h.to_string()).collect(),
        rows: vec![vec![
            Cell::text(client),
            Cell::Number(table.len() as f64),
            Cell::Number(table.total_risk()),
            Cell::Number(table.distinct_types() as f64),
        ]],
        column_width: None,
    }
}

fn detail_row(row: &AnomalyRow, columns: &[Column]) -> Vec<Cell> {
    let entry = &row.entry;
    let mut cells = vec![Cell::text(row.severity.label()), Cell::text(&row.anomaly_type)];
    cells.extend(columns.iter().map(|column| match column {
        Column::Account => Cell::opt_text(entry.account.as_deref()),
        Column::Date => entry.date.map(Cell::Date).unwrap_or(Cell::Empty),
        Column::Label => Cell::text(&entry.label),
        Column::Debit => Cell::Number(entry.debit),
        Column::Credit => Cell::Number(entry.credit),
        Column::Journal => Cell::opt_text(entry.journal.as_deref()),
        Column::Piece => Cell::opt_text(entry.piece.as_deref()),
    }));
    cells
}
