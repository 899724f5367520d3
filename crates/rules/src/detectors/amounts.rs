use fec_core::{Column, Ledger, Thresholds};

use crate::anomaly::{AnomalyRow, RuleId};
use crate::detector::Detector;
use crate::error::Result;

const EXPENSE_CLASS: &str = "6";
const ROUND_EXEMPT_JOURNALS: &[&str] = &["AN", "OD"];

/// Rule 5: large expense debits that are an exact multiple of ten.
///
/// Only the debit side is inspected.
pub struct RoundAmounts;

impl Detector for RoundAmounts {
    fn id(&self) -> RuleId {
        RuleId::RoundAmounts
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Debit, Column::Account]
    }

    fn detect(&self, ledger: &Ledger, client: &str, thresholds: &Thresholds) -> Result<Vec<AnomalyRow>> {
        Ok(ledger
            .rows()
            .iter()
            .filter(|r| r.debit >= thresholds.round_amount && r.debit % 10.0 == 0.0)
            .filter(|r| r.account_starts_with(EXPENSE_CLASS))
            .filter(|r| !r.journal_in(ROUND_EXEMPT_JOURNALS))
            .map(|r| AnomalyRow::flag(r, client, self.id(), self.id().label()))
            .collect())
    }
}
