//! End-to-end audit scenarios run through the standard engine.

use chrono::NaiveDate;
use fec_core::{Column, Ledger, LedgerRow, Thresholds};
use fec_rules::{detectors, AuditEngine, RuleId, RuleStatus, Severity};

fn date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn entry(account: &str, day: &str, debit: f64, credit: f64, label: &str, journal: &str) -> LedgerRow {
    LedgerRow {
        account: Some(account.to_string()),
        date: date(day),
        debit,
        credit,
        label: label.to_string(),
        journal: Some(journal.to_string()),
        piece: None,
    }
}

fn audit(rows: Vec<LedgerRow>) -> fec_rules::AuditOutcome {
    AuditEngine::new().run(&Ledger::new(rows), "client.txt", &Thresholds::default())
}

#[test]
fn lone_suspense_line_is_the_only_anomaly() {
    let outcome = audit(vec![entry("471000", "2024-01-05", 100.0, 0.0, "", "OD")]);

    assert_eq!(outcome.table.len(), 1);
    let row = &outcome.table.rows[0];
    assert_eq!(row.rule, RuleId::SuspenseAccount);
    assert_eq!(row.severity, Severity::Critical);
    assert!(row.anomaly_type.contains("100.0"));

    let contributing: Vec<RuleId> = outcome
        .rules
        .iter()
        .filter(|o| o.rows() > 0)
        .map(|o| o.rule)
        .collect();
    assert_eq!(contributing, vec![RuleId::SuspenseAccount]);
}

#[test]
fn identical_purchases_flagged_as_duplicates_only() {
    let purchase = entry("601000", "2024-03-01", 200.0, 0.0, "ACHAT", "OD");
    let outcome = audit(vec![purchase.clone(), purchase]);

    assert_eq!(outcome.table.len(), 2);
    assert!(outcome.table.rows.iter().all(|r| r.rule == RuleId::Duplicates));
    assert!(outcome.table.rows.iter().all(|r| r.severity == Severity::High));
}

#[test]
fn fine_in_label_is_flagged_whatever_the_account() {
    let outcome = audit(vec![
        entry("512000", "2024-04-10", 0.0, 135.0, "AMENDE DE RETARD", "BQ"),
        entry("512000", "2024-04-11", 10.0, 0.0, "DIVERS", "BQ"),
    ]);

    let fines: Vec<_> = outcome
        .table
        .rows
        .iter()
        .filter(|r| r.rule == RuleId::ForbiddenKeywords)
        .collect();
    assert_eq!(fines.len(), 1);
    assert_eq!(fines[0].severity, Severity::High);
    assert_eq!(fines[0].entry.label, "AMENDE DE RETARD");
}

#[test]
fn empty_ledger_is_a_clean_file() {
    let outcome = AuditEngine::new().run(&Ledger::empty(), "vide.txt", &Thresholds::default());
    assert!(outcome.is_clean());
    assert!(outcome
        .rules
        .iter()
        .all(|o| matches!(o.status, RuleStatus::Skipped { .. })));
}

#[test]
fn aggregated_length_is_sum_of_detector_outputs() {
    let rows = vec![
        entry("471000", "2024-01-05", 100.0, 0.0, "ATTENTE", "OD"),
        entry("530000", "2024-01-02", 0.0, 40.0, "RETRAIT", "CA"),
        entry("601000", "2024-03-03", 1000.0, 0.0, "PENALITE", "HA"),
        entry("601000", "2024-03-03", 1000.0, 0.0, "PENALITE", "HA"),
        entry("401000", "2024-02-01", 80.0, 0.0, "REGLEMENT", "BQ"),
        entry("411000", "2024-02-01", 0.0, 80.0, "REGLEMENT", "BQ"),
        entry("601000", "2023-06-30", 15.0, 0.0, "ACHAT", "HA"),
    ];
    let ledger = Ledger::new(rows);
    let thresholds = Thresholds::default();

    let expected: usize = detectors::standard()
        .iter()
        .map(|d| d.detect(&ledger, "c", &thresholds).unwrap().len())
        .sum();
    let outcome = AuditEngine::new().run(&ledger, "c", &thresholds);

    assert!(expected > 0);
    assert_eq!(outcome.table.len(), expected);
    assert_eq!(
        outcome.rules.iter().map(|o| o.rows()).sum::<usize>(),
        expected
    );
    assert!(outcome
        .table
        .rows
        .windows(2)
        .all(|w| w[0].severity.rank() <= w[1].severity.rank()));

    // Within a severity group, rule order is preserved.
    let high: Vec<u8> = outcome
        .table
        .by_severity(Severity::High)
        .map(|r| r.rule.number())
        .collect();
    assert!(high.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn ledger_without_journal_column_still_audits() {
    let rows = vec![
        LedgerRow {
            account: Some("601000".into()),
            date: date("2024-03-03"),
            debit: 600.0,
            label: "ACHAT".into(),
            ..Default::default()
        },
        LedgerRow {
            account: Some("601000".into()),
            date: date("2024-03-03"),
            debit: 600.0,
            label: "ACHAT".into(),
            ..Default::default()
        },
    ];
    let columns = [
        Column::Account,
        Column::Date,
        Column::Debit,
        Column::Credit,
        Column::Label,
    ]
    .into_iter()
    .collect();
    let outcome = AuditEngine::new().run(
        &Ledger::with_columns(rows, columns),
        "c",
        &Thresholds::default(),
    );

    let sunday = outcome
        .rules
        .iter()
        .find(|o| o.rule == RuleId::SundayPostings)
        .unwrap();
    assert_eq!(
        sunday.status,
        RuleStatus::Skipped {
            missing: vec![Column::Journal]
        }
    );
    // Duplicates (2) + round amounts (2).
    assert_eq!(outcome.table.len(), 4);
    assert!(!outcome.table.columns.contains(Column::Journal));
}
