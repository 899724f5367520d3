//! FEC compliance rule engine.
//!
//! This crate provides:
//! - The three-level severity model and the nine-rule catalogue
//! - The `Detector` contract and the built-in detectors
//! - The audit engine that isolates, runs and aggregates them

pub mod anomaly;
pub mod detector;
pub mod detectors;
pub mod engine;
pub mod error;
pub mod severity;

pub use anomaly::{format_amount, round2, AnomalyRow, AnomalyTable, RuleId, RULE_COUNT};
pub use detector::Detector;
pub use engine::{aggregate, AuditEngine, AuditOutcome, RuleOutcome, RuleStatus};
pub use error::RuleError;
pub use severity::Severity;
