use fec_core::{Column, Ledger, LedgerRow, Thresholds};
use tracing::debug;

use crate::anomaly::{AnomalyRow, RuleId};
use crate::detector::Detector;
use crate::error::Result;

const CASH_PREFIX: &str = "53";

/// Rounding noise absorbed before a cash balance counts as negative.
pub const CASH_EPSILON: f64 = 0.01;

/// Rule 2: a cash register can never hold less than nothing.
///
/// Cash lines are replayed in date order (undated lines last) and every
/// line at which the running balance is below zero is flagged, provided the
/// lowest point goes past [`CASH_EPSILON`].
pub struct NegativeCash;

impl Detector for NegativeCash {
    fn id(&self) -> RuleId {
        RuleId::NegativeCash
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Account, Column::Date, Column::Debit, Column::Credit]
    }

    fn detect(&self, ledger: &Ledger, client: &str, thresholds: &Thresholds) -> Result<Vec<AnomalyRow>> {
        let mut cash: Vec<&LedgerRow> = ledger.accounts_with_prefix(CASH_PREFIX).collect();
        if cash.is_empty() {
            return Ok(Vec::new());
        }

        // Stable: same-day lines keep their ledger order.
        cash.sort_by_key(|r| (r.date.is_none(), r.date));

        let mut balance = 0.0;
        let running: Vec<f64> = cash
            .iter()
            .map(|r| {
                balance += r.movement();
                balance
            })
            .collect();

        let lowest = running.iter().copied().fold(f64::INFINITY, f64::min);
        debug!(
            lines = cash.len(),
            lowest,
            tolerance = thresholds.cash_tolerance,
            "cash register replayed"
        );
        if lowest >= -CASH_EPSILON {
            return Ok(Vec::new());
        }

        Ok(cash
            .into_iter()
            .zip(running)
            .filter(|(_, cum)| *cum < 0.0)
            .map(|(r, _)| AnomalyRow::flag(r, client, self.id(), self.id().label()))
            .collect())
    }
}
