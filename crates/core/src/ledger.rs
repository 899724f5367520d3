use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical ledger columns a normalized FEC file can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    Account,
    Date,
    Debit,
    Credit,
    Label,
    Journal,
    Piece,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Account,
        Column::Date,
        Column::Debit,
        Column::Credit,
        Column::Label,
        Column::Journal,
        Column::Piece,
    ];

    /// Canonical (post-normalization) column name.
    pub fn name(&self) -> &'static str {
        match self {
            Column::Account => "Compte",
            Column::Date => "Date",
            Column::Debit => "Debit",
            Column::Credit => "Credit",
            Column::Label => "Libelle",
            Column::Journal => "Journal",
            Column::Piece => "Piece",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of columns present in a ledger or anomaly table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet(BTreeSet<Column>);

impl ColumnSet {
    pub fn all() -> Self {
        Self(Column::ALL.into_iter().collect())
    }

    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, column: Column) {
        self.0.insert(column);
    }

    pub fn contains(&self, column: Column) -> bool {
        self.0.contains(&column)
    }

    /// Columns from `required` that are not in this set, in the order given.
    pub fn missing(&self, required: &[Column]) -> Vec<Column> {
        required
            .iter()
            .copied()
            .filter(|c| !self.contains(*c))
            .collect()
    }

    pub fn union(&self, other: &ColumnSet) -> ColumnSet {
        ColumnSet(self.0.union(&other.0).copied().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One normalized accounting entry.
///
/// Amounts are never null: the normalizer coerces blanks and garbage to `0.0`.
/// Dates that could not be parsed are `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerRow {
    pub account: Option<String>,
    pub date: Option<NaiveDate>,
    pub debit: f64,
    pub credit: f64,
    pub label: String,
    pub journal: Option<String>,
    pub piece: Option<String>,
}

impl LedgerRow {
    /// True when the account code starts with `prefix`. Rows without an
    /// account never match.
    pub fn account_starts_with(&self, prefix: &str) -> bool {
        self.account
            .as_deref()
            .is_some_and(|a| a.starts_with(prefix))
    }

    /// True when the journal code is one of `codes`. Rows without a journal
    /// never match.
    pub fn journal_in(&self, codes: &[&str]) -> bool {
        self.journal
            .as_deref()
            .is_some_and(|j| codes.contains(&j))
    }

    /// Signed movement of the entry (`debit - credit`).
    pub fn movement(&self) -> f64 {
        self.debit - self.credit
    }
}

/// An immutable, fully loaded ledger plus the columns its source provided.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    rows: Vec<LedgerRow>,
    columns: ColumnSet,
}

impl Ledger {
    /// Ledger whose source provided every canonical column.
    pub fn new(rows: Vec<LedgerRow>) -> Self {
        Self {
            rows,
            columns: ColumnSet::all(),
        }
    }

    pub fn with_columns(rows: Vec<LedgerRow>, columns: ColumnSet) -> Self {
        Self { rows, columns }
    }

    /// What a failed ingestion surfaces as: no rows, no columns.
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            columns: ColumnSet::empty(),
        }
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose account starts with `prefix`, in ledger order.
    pub fn accounts_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a LedgerRow> + 'a {
        self.rows.iter().filter(move |r| r.account_starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(account: Option<&str>, journal: Option<&str>) -> LedgerRow {
        LedgerRow {
            account: account.map(String::from),
            journal: journal.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn prefix_match_ignores_missing_account() {
        assert!(row(Some("471000"), None).account_starts_with("471"));
        assert!(!row(Some("4710"), None).account_starts_with("4711"));
        assert!(!row(None, None).account_starts_with(""));
    }

    #[test]
    fn journal_in_ignores_missing_journal() {
        assert!(row(None, Some("BQ")).journal_in(&["BQ", "TR"]));
        assert!(!row(None, Some("OD")).journal_in(&["BQ", "TR"]));
        assert!(!row(None, None).journal_in(&["BQ"]));
    }

    #[test]
    fn missing_columns_keep_requested_order() {
        let cols: ColumnSet = [Column::Account, Column::Debit].into_iter().collect();
        assert_eq!(
            cols.missing(&[Column::Date, Column::Account, Column::Label]),
            vec![Column::Date, Column::Label]
        );
        assert!(ColumnSet::all().missing(&Column::ALL).is_empty());
    }

    #[test]
    fn empty_ledger_has_no_columns() {
        let ledger = Ledger::empty();
        assert!(ledger.is_empty());
        assert!(!ledger.has_column(Column::Account));
        assert!(Ledger::new(vec![]).has_column(Column::Account));
    }

    #[test]
    fn prefix_iterator_preserves_order() {
        let ledger = Ledger::new(vec![
            row(Some("401A"), None),
            row(Some("411B"), None),
            row(Some("401C"), None),
        ]);
        let accounts: Vec<_> = ledger
            .accounts_with_prefix("401")
            .filter_map(|r| r.account.as_deref())
            .collect();
        assert_eq!(accounts, vec!["401A", "401C"]);
    }
}
