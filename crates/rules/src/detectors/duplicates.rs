use std::collections::HashMap;

use chrono::NaiveDate;
use fec_core::{Column, Ledger, LedgerRow, Thresholds};

use crate::anomaly::{AnomalyRow, RuleId};
use crate::detector::Detector;
use crate::error::Result;

/// Journals where identical lines are routine (bank, treasury, cash, opening).
const EXCLUDED_JOURNALS: &[&str] = &["BQ", "TR", "CA", "AN", "RAN"];

type DuplicateKey<'a> = (Option<NaiveDate>, u64, u64, Option<&'a str>, &'a str);

fn amount_bits(value: f64) -> u64 {
    // -0.0 and 0.0 must land in the same group.
    if value == 0.0 { 0 } else { value.to_bits() }
}

fn duplicate_key(row: &LedgerRow) -> DuplicateKey<'_> {
    (
        row.date,
        amount_bits(row.debit),
        amount_bits(row.credit),
        row.account.as_deref(),
        row.label.as_str(),
    )
}

/// Rule 3: the same (date, debit, credit, account, label) posted twice.
///
/// Every member of a repeated group is flagged, in ledger order. All-zero
/// lines are ignored.
pub struct Duplicates;

impl Detector for Duplicates {
    fn id(&self) -> RuleId {
        RuleId::Duplicates
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Date, Column::Debit, Column::Credit, Column::Account, Column::Label]
    }

    fn detect(&self, ledger: &Ledger, client: &str, _thresholds: &Thresholds) -> Result<Vec<AnomalyRow>> {
        let audited: Vec<&LedgerRow> = ledger
            .rows()
            .iter()
            .filter(|r| !r.journal_in(EXCLUDED_JOURNALS))
            .collect();

        let mut counts: HashMap<DuplicateKey<'_>, usize> = HashMap::new();
        for &row in &audited {
            *counts.entry(duplicate_key(row)).or_default() += 1;
        }

        Ok(audited
            .into_iter()
            .filter(|r| counts.get(&duplicate_key(*r)).copied().unwrap_or(0) >= 2)
            .filter(|r| r.debit > 0.0 || r.credit > 0.0)
            .map(|r| AnomalyRow::flag(r, client, self.id(), self.id().label()))
            .collect())
    }
}
