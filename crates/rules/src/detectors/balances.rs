use std::collections::BTreeMap;

use fec_core::{Column, ColumnSet, Ledger, LedgerRow, Thresholds};

use crate::anomaly::{format_amount, round2, AnomalyRow, RuleId};
use crate::detector::Detector;
use crate::error::Result;

/// Journal code of the per-account rows these rules synthesize.
const SYNTHETIC_JOURNAL: &str = "N/A";

/// Balances under one euro either way are tolerated.
const BALANCE_TOLERANCE: f64 = 1.0;

const REQUIRED: &[Column] = &[Column::Account, Column::Debit, Column::Credit];

#[derive(Debug, Clone, Copy, Default)]
struct AccountTotals {
    debit: f64,
    credit: f64,
}

impl AccountTotals {
    fn balance(&self) -> f64 {
        self.debit - self.credit
    }
}

/// Sum debit and credit per account for accounts under `prefix`, ordered by
/// account code.
fn totals_by_account<'a>(ledger: &'a Ledger, prefix: &'a str) -> BTreeMap<&'a str, AccountTotals> {
    let mut totals: BTreeMap<&str, AccountTotals> = BTreeMap::new();
    for row in ledger.accounts_with_prefix(prefix) {
        if let Some(account) = row.account.as_deref() {
            let t = totals.entry(account).or_default();
            t.debit += row.debit;
            t.credit += row.credit;
        }
    }
    totals
}

/// Columns carried by a synthesized per-account row.
fn synthetic_columns() -> ColumnSet {
    [
        Column::Account,
        Column::Date,
        Column::Debit,
        Column::Credit,
        Column::Label,
        Column::Journal,
    ]
    .into_iter()
    .collect()
}

fn account_row(account: &str, totals: AccountTotals, label: String) -> LedgerRow {
    LedgerRow {
        account: Some(account.to_string()),
        date: None,
        debit: totals.debit,
        credit: totals.credit,
        label,
        journal: Some(SYNTHETIC_JOURNAL.to_string()),
        piece: None,
    }
}

/// Rule 7: a supplier account (401) should not end in debit.
///
/// Emits one row per offending account rather than per ledger line.
pub struct DebtorSuppliers;

impl Detector for DebtorSuppliers {
    fn id(&self) -> RuleId {
        RuleId::DebtorSuppliers
    }

    fn required_columns(&self) -> &'static [Column] {
        REQUIRED
    }

    fn output_columns(&self, _ledger: &Ledger) -> ColumnSet {
        synthetic_columns()
    }

    fn detect(&self, ledger: &Ledger, client: &str, _thresholds: &Thresholds) -> Result<Vec<AnomalyRow>> {
        Ok(totals_by_account(ledger, "401")
            .into_iter()
            .filter(|(_, t)| t.balance() > BALANCE_TOLERANCE)
            .map(|(account, t)| {
                let label = format!("SOLDE DÉBITEUR DE {} €", format_amount(round2(t.balance())));
                AnomalyRow::synthesized(account_row(account, t, label), client, self.id(), self.id().label())
            })
            .collect())
    }
}

/// Rule 8: a customer account (411) should not end in credit.
///
/// Emits one row per offending account rather than per ledger line.
pub struct CreditorCustomers;

impl Detector for CreditorCustomers {
    fn id(&self) -> RuleId {
        RuleId::CreditorCustomers
    }

    fn required_columns(&self) -> &'static [Column] {
        REQUIRED
    }

    fn output_columns(&self, _ledger: &Ledger) -> ColumnSet {
        synthetic_columns()
    }

    fn detect(&self, ledger: &Ledger, client: &str, _thresholds: &Thresholds) -> Result<Vec<AnomalyRow>> {
        Ok(totals_by_account(ledger, "411")
            .into_iter()
            .filter(|(_, t)| t.balance() < -BALANCE_TOLERANCE)
            .map(|(account, t)| {
                let label = format!("SOLDE CRÉDITEUR DE {} €", format_amount(round2(t.balance())));
                AnomalyRow::synthesized(account_row(account, t, label), client, self.id(), self.id().label())
            })
            .collect())
    }
}
