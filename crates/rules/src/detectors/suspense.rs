use fec_core::{Column, Ledger, LedgerRow, Thresholds};

use crate::anomaly::{format_amount, round2, AnomalyRow, RuleId};
use crate::detector::Detector;
use crate::error::Result;

const SUSPENSE_PREFIX: &str = "471";

/// Rule 1: the 471 suspense account must be balanced at closing.
///
/// When it is not, every 471 line is flagged and the anomaly type carries
/// the residual balance.
pub struct SuspenseAccount;

impl Detector for SuspenseAccount {
    fn id(&self) -> RuleId {
        RuleId::SuspenseAccount
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Account, Column::Debit, Column::Credit]
    }

    fn detect(&self, ledger: &Ledger, client: &str, _thresholds: &Thresholds) -> Result<Vec<AnomalyRow>> {
        let lines: Vec<&LedgerRow> = ledger.accounts_with_prefix(SUSPENSE_PREFIX).collect();
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let debit: f64 = lines.iter().map(|r| r.debit).sum();
        let credit: f64 = lines.iter().map(|r| r.credit).sum();
        let balance = round2(debit - credit);
        if balance == 0.0 {
            return Ok(Vec::new());
        }

        let anomaly_type = format!("{} ({}€)", self.id().label(), format_amount(balance));
        Ok(lines
            .into_iter()
            .map(|r| AnomalyRow::flag(r, client, self.id(), anomaly_type.clone()))
            .collect())
    }
}
