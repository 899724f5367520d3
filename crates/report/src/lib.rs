//! Audit report: the summary figures, the two-sheet report document and
//! its `.xlsx` serialization.

pub mod builder;
pub mod error;
pub mod summary;
pub mod xlsx;

pub use builder::{AuditReport, Cell, ReportBuilder, Sheet, CLEAN_FILE_MESSAGE, DETAIL_SHEET, SUMMARY_SHEET};
pub use error::{ReportError, Result};
pub use summary::AuditSummary;

use fec_rules::AnomalyTable;

/// Build the report for `table` with default layout and serialize it.
pub fn build_report(table: &AnomalyTable, client: &str) -> Result<Vec<u8>> {
    ReportBuilder::default().build(table, client).to_xlsx()
}
