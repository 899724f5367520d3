use std::collections::HashMap;

use chrono::{Datelike, Weekday};
use fec_core::{Column, Ledger, Thresholds};

use crate::anomaly::{AnomalyRow, RuleId};
use crate::detector::Detector;
use crate::error::Result;

// ── Sunday postings ─────────────────────────────────────────────────

const SUNDAY_EXEMPT_JOURNALS: &[&str] = &["OD", "AN", "RAN"];
const SUNDAY_ACCOUNT_CLASSES: &[&str] = &["6", "2"];

/// Rule 4: expense (class 6) or fixed-asset (class 2) lines dated on a Sunday.
pub struct SundayPostings;

impl Detector for SundayPostings {
    fn id(&self) -> RuleId {
        RuleId::SundayPostings
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Date, Column::Journal, Column::Account]
    }

    fn detect(&self, ledger: &Ledger, client: &str, _thresholds: &Thresholds) -> Result<Vec<AnomalyRow>> {
        Ok(ledger
            .rows()
            .iter()
            .filter(|r| r.date.is_some_and(|d| d.weekday() == Weekday::Sun))
            .filter(|r| SUNDAY_ACCOUNT_CLASSES.iter().any(|c| r.account_starts_with(c)))
            .filter(|r| !r.journal_in(SUNDAY_EXEMPT_JOURNALS))
            .map(|r| AnomalyRow::flag(r, client, self.id(), self.id().label()))
            .collect())
    }
}

// ── Out-of-period dates ─────────────────────────────────────────────

const OPENING_JOURNALS: &[&str] = &["AN", "RAN"];

/// Most frequent year among dated rows; ties go to the earliest year.
pub(crate) fn mode_year(ledger: &Ledger) -> Option<i32> {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for date in ledger.rows().iter().filter_map(|r| r.date) {
        *counts.entry(date.year()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(ya, ca), (yb, cb)| ca.cmp(cb).then(yb.cmp(ya)))
        .map(|(year, _)| year)
}

/// Rule 9: lines outside the fiscal year, taken as the ledger's mode year.
///
/// Opening journals legitimately carry the previous year. An undated line
/// has no year and is reported as well.
pub struct OutOfPeriod;

impl Detector for OutOfPeriod {
    fn id(&self) -> RuleId {
        RuleId::OutOfPeriod
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Date]
    }

    fn detect(&self, ledger: &Ledger, client: &str, _thresholds: &Thresholds) -> Result<Vec<AnomalyRow>> {
        let Some(fiscal_year) = mode_year(ledger) else {
            return Ok(Vec::new());
        };

        let anomaly_type = format!("{} ({})", self.id().label(), fiscal_year);
        Ok(ledger
            .rows()
            .iter()
            .filter(|r| r.date.map(|d| d.year()) != Some(fiscal_year))
            .filter(|r| !r.journal_in(OPENING_JOURNALS))
            .map(|r| AnomalyRow::flag(r, client, self.id(), anomaly_type.clone()))
            .collect())
    }
}
