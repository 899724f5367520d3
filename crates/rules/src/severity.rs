//! Three-level severity model shared by every detector.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How serious an anomaly is. Declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Fiscally blocking or materially impossible.
    Critical,
    /// High tax risk.
    High,
    /// To be checked, may be a data-entry mistake.
    Medium,
}

impl Severity {
    /// Sort rank: lower comes first in the anomaly table.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
        }
    }

    /// Label printed in reports and on the terminal.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITIQUE",
            Severity::High => "HAUTE",
            Severity::Medium => "MOYENNE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_follows_declaration_order() {
        let mut all = vec![Severity::Medium, Severity::Critical, Severity::High];
        all.sort();
        assert_eq!(all, vec![Severity::Critical, Severity::High, Severity::Medium]);
        assert!(all.windows(2).all(|w| w[0].rank() < w[1].rank()));
    }

    #[test]
    fn labels_are_french() {
        assert_eq!(Severity::Critical.to_string(), "CRITIQUE");
        assert_eq!(Severity::High.label(), "HAUTE");
        assert_eq!(Severity::Medium.label(), "MOYENNE");
    }

    #[test]
    fn serializes_as_uppercase_english() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"HIGH\"");
    }
}
