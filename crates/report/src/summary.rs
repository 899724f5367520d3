//! Headline figures shown after an audit.

use std::fmt;

use fec_rules::{round2, AnomalyTable, RULE_COUNT};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditSummary {
    pub client: String,
    pub total_anomalies: usize,
    /// `sum(debit) - sum(credit)` over the flagged rows, to the cent.
    pub total_risk: f64,
    /// Distinct anomaly types (the SYNTHESE "Nb Règles Touchées" figure).
    pub distinct_types: usize,
    pub rules_touched: usize,
    pub rules_total: usize,
}

impl AuditSummary {
    pub fn from_table(table: &AnomalyTable, client: &str) -> Self {
        Self {
            client: client.to_string(),
            total_anomalies: table.len(),
            total_risk: round2(table.total_risk()),
            distinct_types: table.distinct_types(),
            rules_touched: table.rules_touched().len(),
            rules_total: RULE_COUNT,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.total_anomalies == 0
    }

    pub fn risk_display(&self) -> String {
        format!("{:.2} €", self.total_risk)
    }

    pub fn coverage_display(&self) -> String {
        format!("{} / {}", self.rules_touched, self.rules_total)
    }
}

impl fmt::Display for AuditSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} anomalies, risque {}, règles {}",
            self.client,
            self.total_anomalies,
            self.risk_display(),
            self.coverage_display()
        )
    }
}
