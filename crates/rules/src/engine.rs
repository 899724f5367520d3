//! Audit engine: runs the rule battery and aggregates its output.
//!
//! Detectors run one after another against the same borrowed ledger. Each
//! one is isolated: a missing column skips it, and an error or panic is
//! recorded without stopping the others. The concatenated rows are then
//! stable-sorted by severity.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use fec_core::{Column, ColumnSet, Ledger, Thresholds};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::anomaly::{AnomalyRow, AnomalyTable, RuleId};
use crate::detector::Detector;
use crate::detectors;
use crate::error::RuleError;

// ── Run log ─────────────────────────────────────────────────────────

/// What happened to one rule during a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RuleStatus {
    /// Rule ran; `rows` may be zero.
    Evaluated { rows: usize },
    /// A required column was absent from the ledger.
    Skipped { missing: Vec<Column> },
    /// Rule errored or panicked; it contributed nothing.
    Failed { error: String },
}

/// Per-rule entry of the run log.
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcome {
    pub rule: RuleId,
    pub status: RuleStatus,
    pub duration: Duration,
}

impl RuleOutcome {
    pub fn rows(&self) -> usize {
        match self.status {
            RuleStatus::Evaluated { rows } => rows,
            _ => 0,
        }
    }
}

/// Result of one audit pass.
#[derive(Debug, Clone, Serialize)]
pub struct AuditOutcome {
    /// Sorted anomaly table.
    pub table: AnomalyTable,
    /// One entry per detector, in execution order.
    pub rules: Vec<RuleOutcome>,
}

impl AuditOutcome {
    /// True when nothing was flagged: the "clean file" state.
    pub fn is_clean(&self) -> bool {
        self.table.is_empty()
    }

    pub fn failed_rules(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.rules
            .iter()
            .filter(|o| matches!(o.status, RuleStatus::Failed { .. }))
    }
}

// ── Aggregation ─────────────────────────────────────────────────────

/// Concatenate detector outputs in the order given, then stable-sort by
/// severity (CRITICAL, HIGH, MEDIUM).
pub fn aggregate(results: Vec<Vec<AnomalyRow>>) -> Vec<AnomalyRow> {
    let mut rows: Vec<AnomalyRow> = results.into_iter().flatten().collect();
    rows.sort_by_key(|r| r.severity.rank());
    rows
}

// ── Engine ──────────────────────────────────────────────────────────

/// Runs a fixed list of detectors over a ledger.
pub struct AuditEngine {
    detectors: Vec<Box<dyn Detector>>,
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditEngine {
    /// Engine with the standard nine-rule battery.
    pub fn new() -> Self {
        Self {
            detectors: detectors::standard(),
        }
    }

    /// Engine with a custom detector list, run in the order given.
    pub fn with_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Audit `ledger` on behalf of `client`.
    pub fn run(&self, ledger: &Ledger, client: &str, thresholds: &Thresholds) -> AuditOutcome {
        let start = Instant::now();
        info!(client = %client, rows = ledger.len(), "audit started");

        let mut results = Vec::with_capacity(self.detectors.len());
        let mut outcomes = Vec::with_capacity(self.detectors.len());
        let mut columns = ColumnSet::empty();

        for detector in &self.detectors {
            let rule_start = Instant::now();
            let status = match evaluate_isolated(detector.as_ref(), ledger, client, thresholds) {
                Evaluation::Skipped(missing) => {
                    debug!(rule = %detector.id(), ?missing, "rule skipped, missing columns");
                    RuleStatus::Skipped { missing }
                }
                Evaluation::Failed(err) => {
                    warn!(rule = %detector.id(), error = %err, "rule failed, continuing");
                    RuleStatus::Failed { error: err.to_string() }
                }
                Evaluation::Rows(rows) => {
                    debug!(rule = %detector.id(), rows = rows.len(), "rule evaluated");
                    if !rows.is_empty() {
                        columns = columns.union(&detector.output_columns(ledger));
                    }
                    let count = rows.len();
                    results.push(rows);
                    RuleStatus::Evaluated { rows: count }
                }
            };
            outcomes.push(RuleOutcome {
                rule: detector.id(),
                status,
                duration: rule_start.elapsed(),
            });
        }

        let rows = aggregate(results);
        info!(
            client = %client,
            anomalies = rows.len(),
            "audit complete in {:.1}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        AuditOutcome {
            table: AnomalyTable::new(rows, columns),
            rules: outcomes,
        }
    }
}

enum Evaluation {
    Rows(Vec<AnomalyRow>),
    Skipped(Vec<Column>),
    Failed(RuleError),
}

/// Column guard, then the detector call behind a panic boundary.
fn evaluate_isolated(
    detector: &dyn Detector,
    ledger: &Ledger,
    client: &str,
    thresholds: &Thresholds,
) -> Evaluation {
    let missing = ledger.columns().missing(detector.required_columns());
    if !missing.is_empty() {
        return Evaluation::Skipped(missing);
    }

    match panic::catch_unwind(AssertUnwindSafe(|| detector.detect(ledger, client, thresholds))) {
        Ok(Ok(rows)) => Evaluation::Rows(rows),
        Ok(Err(err)) => Evaluation::Failed(err),
        Err(payload) => Evaluation::Failed(RuleError::Panicked {
            rule: detector.id(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::severity::Severity;
    use fec_core::LedgerRow;

    /// Emits one row per ledger row, or fails/panics on demand.
    struct Fixed {
        rule: RuleId,
        mode: Mode,
    }

    enum Mode {
        Rows,
        Fail,
        Panic,
    }

    impl Detector for Fixed {
        fn id(&self) -> RuleId {
            self.rule
        }

        fn required_columns(&self) -> &'static [Column] {
            &[Column::Account]
        }

        fn detect(&self, ledger: &Ledger, client: &str, _t: &Thresholds) -> Result<Vec<AnomalyRow>> {
            match self.mode {
                Mode::Rows => Ok(ledger
                    .rows()
                    .iter()
                    .map(|r| AnomalyRow::flag(r, client, self.rule, self.rule.label()))
                    .collect()),
                Mode::Fail => Err(RuleError::Evaluation {
                    rule: self.rule,
                    message: "boom".into(),
                }),
                Mode::Panic => panic!("detector exploded"),
            }
        }
    }

    fn fixed(rule: RuleId, mode: Mode) -> Box<dyn Detector> {
        Box::new(Fixed { rule, mode })
    }

    fn ledger(accounts: &[&str]) -> Ledger {
        Ledger::new(
            accounts
                .iter()
                .map(|a| LedgerRow {
                    account: Some(a.to_string()),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn aggregate_sorts_stably_by_severity() {
        let mk = |rule: RuleId, label: &str| {
            AnomalyRow::synthesized(LedgerRow::default(), "c", rule, label)
        };
        let rows = aggregate(vec![
            vec![mk(RuleId::SundayPostings, "m1")],
            vec![mk(RuleId::Duplicates, "h1"), mk(RuleId::Duplicates, "h2")],
            vec![mk(RuleId::SuspenseAccount, "c1")],
            vec![mk(RuleId::RoundAmounts, "m2")],
            vec![],
            vec![mk(RuleId::OutOfPeriod, "h3")],
        ]);
        let labels: Vec<&str> = rows.iter().map(|r| r.anomaly_type.as_str()).collect();
        assert_eq!(labels, vec!["c1", "h1", "h2", "h3", "m1", "m2"]);
        assert!(rows.windows(2).all(|w| w[0].severity.rank() <= w[1].severity.rank()));
    }

    #[test]
    fn aggregate_of_nothing_is_empty() {
        assert!(aggregate(vec![vec![]; 9]).is_empty());
    }

    #[test]
    fn failing_rule_does_not_stop_others() {
        let engine = AuditEngine::with_detectors(vec![
            fixed(RuleId::SuspenseAccount, Mode::Fail),
            fixed(RuleId::NegativeCash, Mode::Panic),
            fixed(RuleId::Duplicates, Mode::Rows),
        ]);
        let outcome = engine.run(&ledger(&["601"]), "c", &Thresholds::default());

        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.table.rows[0].severity, Severity::High);
        assert_eq!(outcome.failed_rules().count(), 2);
        match &outcome.rules[1].status {
            RuleStatus::Failed { error } => assert!(error.contains("detector exploded")),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn missing_column_skips_rule() {
        let engine = AuditEngine::with_detectors(vec![fixed(RuleId::Duplicates, Mode::Rows)]);
        let ledger = Ledger::with_columns(
            vec![LedgerRow::default()],
            [Column::Debit].into_iter().collect(),
        );
        let outcome = engine.run(&ledger, "c", &Thresholds::default());
        assert!(outcome.is_clean());
        assert_eq!(
            outcome.rules[0].status,
            RuleStatus::Skipped {
                missing: vec![Column::Account]
            }
        );
    }

    #[test]
    fn standard_engine_has_nine_rules_in_order() {
        let engine = AuditEngine::new();
        assert_eq!(engine.detector_count(), 9);
        let outcome = engine.run(&Ledger::new(vec![]), "c", &Thresholds::default());
        let order: Vec<RuleId> = outcome.rules.iter().map(|o| o.rule).collect();
        assert_eq!(order, RuleId::ALL.to_vec());
        assert!(outcome.is_clean());
    }

    #[test]
    fn table_columns_follow_contributing_rules() {
        let engine = AuditEngine::with_detectors(vec![fixed(RuleId::Duplicates, Mode::Rows)]);
        let cols: ColumnSet = [Column::Account, Column::Debit].into_iter().collect();
        let outcome = engine.run(
            &Ledger::with_columns(
                vec![LedgerRow {
                    account: Some("601".into()),
                    ..Default::default()
                }],
                cols.clone(),
            ),
            "c",
            &Thresholds::default(),
        );
        assert_eq!(outcome.table.columns, cols);
    }
}
