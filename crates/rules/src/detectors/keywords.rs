use fec_core::{Column, Ledger, Thresholds};

use crate::anomaly::{AnomalyRow, RuleId};
use crate::detector::Detector;
use crate::error::Result;

/// Label fragments pointing at non-deductible fines and penalties.
pub const FORBIDDEN_KEYWORDS: &[&str] = &["AMENDE", "PENALITE", "MAJORATION", "PV ", "RADAR", "FISC"];

/// Rule 6: case-insensitive keyword match on the entry label.
pub struct ForbiddenKeywords;

impl Detector for ForbiddenKeywords {
    fn id(&self) -> RuleId {
        RuleId::ForbiddenKeywords
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Label]
    }

    fn detect(&self, ledger: &Ledger, client: &str, _thresholds: &Thresholds) -> Result<Vec<AnomalyRow>> {
        Ok(ledger
            .rows()
            .iter()
            .filter(|r| {
                let label = r.label.to_uppercase();
                FORBIDDEN_KEYWORDS.iter().any(|k| label.contains(k))
            })
            .map(|r| AnomalyRow::flag(r, client, self.id(), self.id().label()))
            .collect())
    }
}
