//! The contract every audit rule implements.

use fec_core::{Column, ColumnSet, Ledger, Thresholds};

use crate::anomaly::{AnomalyRow, RuleId};
use crate::error::Result;
use crate::severity::Severity;

/// One independent anomaly detector.
///
/// Detectors borrow the ledger read-only and return freshly allocated rows.
/// The engine checks [`Detector::required_columns`] before calling
/// [`Detector::detect`], so implementations may assume those columns exist.
pub trait Detector: Send + Sync {
    fn id(&self) -> RuleId;

    fn severity(&self) -> Severity {
        self.id().severity()
    }

    /// Columns without which the rule contributes nothing.
    fn required_columns(&self) -> &'static [Column];

    /// Columns the produced rows can be projected on.
    fn output_columns(&self, ledger: &Ledger) -> ColumnSet {
        ledger.columns().clone()
    }

    fn detect(&self, ledger: &Ledger, client: &str, thresholds: &Thresholds) -> Result<Vec<AnomalyRow>>;
}
