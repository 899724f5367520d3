//! Field-level normalization of raw FEC values.
//!
//! Every function here is total: a value that cannot be understood becomes
//! the neutral value (0.0, `None`) instead of an error, so one bad cell never
//! rejects a whole file.

use chrono::{Datelike, NaiveDate};

use fec_core::Column;

/// Map a FEC header to the canonical column it feeds, if any.
///
/// Both the regulatory names (`CompteNum`, `EcritureDate`, ...) and the
/// canonical display names are accepted, case-insensitively.
pub fn column_for_header(header: &str) -> Option<Column> {
    let h = header.trim().trim_start_matches('\u{feff}').to_ascii_lowercase();
    let column = match h.as_str() {
        "comptenum" | "compte" => Column::Account,
        "ecrituredate" | "date" => Column::Date,
        "debit" => Column::Debit,
        "credit" => Column::Credit,
        "ecriturelib" | "libelle" => Column::Label,
        "journalcode" | "journal" => Column::Journal,
        "ecriturepiece" | "pieceref" | "piece" => Column::Piece,
        _ => return None,
    };
    Some(column)
}

/// Parse a French-formatted amount: `"1 234,56"` → `1234.56`.
///
/// Spaces (including non-breaking ones) are dropped and the decimal comma
/// becomes a point. Anything unparseable is 0.0.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}' | '\t'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

const DAY_FIRST_FORMATS: [&str; 7] = [
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
];

/// `%Y` also accepts one or two digits; anything below this year is a
/// two-digit year that belongs to the `%y` formats.
const MIN_FULL_YEAR: i32 = 1000;

/// Parse a posting date, day-first. Any time part after a space or `T` is
/// ignored. Unparseable input is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw
        .trim()
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or("");
    if day.is_empty() {
        return None;
    }
    if day.len() == 8 && day.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(day, "%Y%m%d").ok();
    }
    DAY_FIRST_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
        .find(|d| d.year() >= MIN_FULL_YEAR)
}

/// Trimmed text, or `None` when blank.
pub fn clean_text(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn amounts_in_french_notation() {
        assert_eq!(parse_amount("1 234,56"), 1234.56);
        assert_eq!(parse_amount("1\u{a0}000,00"), 1000.0);
        assert_eq!(parse_amount("42"), 42.0);
        assert_eq!(parse_amount("0,5"), 0.5);
        assert_eq!(parse_amount("  "), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
        assert_eq!(parse_amount("1.234,56"), 0.0);
    }

    #[test]
    fn dates_are_day_first() {
        assert_eq!(parse_date("20240315"), ymd(2024, 3, 15));
        assert_eq!(parse_date("03/04/2024"), ymd(2024, 4, 3));
        assert_eq!(parse_date("2024-04-03"), ymd(2024, 4, 3));
        assert_eq!(parse_date("03.04.2024"), ymd(2024, 4, 3));
        assert_eq!(parse_date("03/04/2024 00:00:00"), ymd(2024, 4, 3));
        assert_eq!(parse_date("2024-04-03T10:00:00"), ymd(2024, 4, 3));
    }

    #[test]
    fn two_digit_years_land_in_this_century() {
        assert_eq!(parse_date("03/04/24"), ymd(2024, 4, 3));
        assert_eq!(parse_date("03-04-24"), ymd(2024, 4, 3));
        assert_eq!(parse_date("31.12.23 08:15"), ymd(2023, 12, 31));
        assert_eq!(parse_date("0024-04-03"), None);
    }

    #[test]
    fn bad_dates_are_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date("hier"), None);
        assert_eq!(parse_date("20241340"), None);
    }

    #[test]
    fn headers_map_to_columns() {
        assert_eq!(column_for_header("CompteNum"), Some(Column::Account));
        assert_eq!(column_for_header("\u{feff}JournalCode"), Some(Column::Journal));
        assert_eq!(column_for_header(" EcritureLib "), Some(Column::Label));
        assert_eq!(column_for_header("PieceRef"), Some(Column::Piece));
        assert_eq!(column_for_header("Libelle"), Some(Column::Label));
        assert_eq!(column_for_header("CompAuxNum"), None);
        assert_eq!(column_for_header("Montantdevise"), None);
    }

    #[test]
    fn blank_text_is_none() {
        assert_eq!(clean_text("  "), None);
        assert_eq!(clean_text(" 601000 "), Some("601000".to_string()));
    }
}
