//! Errors raised while evaluating a detector.

use crate::anomaly::RuleId;

/// A detector could not complete. The engine records it and moves on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    /// The detector returned an error of its own.
    #[error("rule {rule} failed: {message}")]
    Evaluation { rule: RuleId, message: String },

    /// The detector panicked; the payload message is kept.
    #[error("rule {rule} panicked: {message}")]
    Panicked { rule: RuleId, message: String },
}

/// Result alias for rule evaluation.
pub type Result<T> = std::result::Result<T, RuleError>;
