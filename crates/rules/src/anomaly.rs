//! Anomaly rows, the rule catalogue and the aggregated anomaly table.

use std::collections::BTreeSet;
use std::fmt;

use fec_core::{ColumnSet, LedgerRow};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

// ── Rule catalogue ──────────────────────────────────────────────────

/// The nine fixed audit rules, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    SuspenseAccount,
    NegativeCash,
    Duplicates,
    SundayPostings,
    RoundAmounts,
    ForbiddenKeywords,
    DebtorSuppliers,
    CreditorCustomers,
    OutOfPeriod,
}

/// Denominator of the "rules touched" display.
pub const RULE_COUNT: usize = 9;

impl RuleId {
    pub const ALL: [RuleId; RULE_COUNT] = [
        RuleId::SuspenseAccount,
        RuleId::NegativeCash,
        RuleId::Duplicates,
        RuleId::SundayPostings,
        RuleId::RoundAmounts,
        RuleId::ForbiddenKeywords,
        RuleId::DebtorSuppliers,
        RuleId::CreditorCustomers,
        RuleId::OutOfPeriod,
    ];

    /// 1-based position in the rule battery.
    pub fn number(&self) -> u8 {
        match self {
            RuleId::SuspenseAccount => 1,
            RuleId::NegativeCash => 2,
            RuleId::Duplicates => 3,
            RuleId::SundayPostings => 4,
            RuleId::RoundAmounts => 5,
            RuleId::ForbiddenKeywords => 6,
            RuleId::DebtorSuppliers => 7,
            RuleId::CreditorCustomers => 8,
            RuleId::OutOfPeriod => 9,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RuleId::SuspenseAccount | RuleId::NegativeCash => Severity::Critical,
            RuleId::Duplicates | RuleId::ForbiddenKeywords | RuleId::OutOfPeriod => Severity::High,
            RuleId::SundayPostings
            | RuleId::RoundAmounts
            | RuleId::DebtorSuppliers
            | RuleId::CreditorCustomers => Severity::Medium,
        }
    }

    /// Short title shown in reports.
    pub fn title(&self) -> &'static str {
        match self {
            RuleId::SuspenseAccount => "Compte 471 non soldé",
            RuleId::NegativeCash => "Caisse Négative",
            RuleId::Duplicates => "Doublon Suspect",
            RuleId::SundayPostings => "Écriture Dimanche",
            RuleId::RoundAmounts => "Montant Rond Suspect",
            RuleId::ForbiddenKeywords => "Amende/Pénalité détectée",
            RuleId::DebtorSuppliers => "Fournisseur Débiteur (Anormal)",
            RuleId::CreditorCustomers => "Client Créditeur (Anormal)",
            RuleId::OutOfPeriod => "Date Hors Exercice",
        }
    }

    /// Numbered title, the base of every `anomaly_type` string.
    pub fn label(&self) -> String {
        format!("{}. {}", self.number(), self.title())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.number())
    }
}

// ── Amount helpers ──────────────────────────────────────────────────

/// Round to cents.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render an amount with at least one decimal: `100.0`, `12.34`, `-5.5`.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

// ── Anomaly row ─────────────────────────────────────────────────────

/// A flagged ledger entry (or, for grouped rules, a synthesized one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRow {
    #[serde(flatten)]
    pub entry: LedgerRow,
    pub client: String,
    pub anomaly_type: String,
    pub severity: Severity,
    pub rule: RuleId,
}

impl AnomalyRow {
    /// Flag a copy of `entry` for `rule`.
    pub fn flag(entry: &LedgerRow, client: &str, rule: RuleId, anomaly_type: impl Into<String>) -> Self {
        Self::synthesized(entry.clone(), client, rule, anomaly_type)
    }

    /// Wrap an entry built by the detector itself.
    pub fn synthesized(
        entry: LedgerRow,
        client: &str,
        rule: RuleId,
        anomaly_type: impl Into<String>,
    ) -> Self {
        Self {
            entry,
            client: client.to_string(),
            anomaly_type: anomaly_type.into(),
            severity: rule.severity(),
            rule,
        }
    }
}

// ── Anomaly table ───────────────────────────────────────────────────

/// Aggregated output of one audit pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyTable {
    pub rows: Vec<AnomalyRow>,
    /// Ledger columns available for projection in the detail listing.
    pub columns: ColumnSet,
}

impl AnomalyTable {
    pub fn new(rows: Vec<AnomalyRow>, columns: ColumnSet) -> Self {
        Self { rows, columns }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `sum(debit) - sum(credit)` over every row, 0 when empty.
    pub fn total_risk(&self) -> f64 {
        let debit: f64 = self.rows.iter().map(|r| r.entry.debit).sum();
        let credit: f64 = self.rows.iter().map(|r| r.entry.credit).sum();
        debit - credit
    }

    /// Number of distinct `anomaly_type` values.
    pub fn distinct_types(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.anomaly_type.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Rules that produced at least one row.
    pub fn rules_touched(&self) -> BTreeSet<RuleId> {
        self.rows.iter().map(|r| r.rule).collect()
    }

    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &AnomalyRow> {
        self.rows.iter().filter(move |r| r.severity == severity)
    }
}
