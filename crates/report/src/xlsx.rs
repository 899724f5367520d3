//! `.xlsx` serialization of an [`AuditReport`].

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use tracing::info;

use crate::builder::{AuditReport, Cell, Sheet};
use crate::error::Result;

impl AuditReport {
    /// Serialize to an in-memory workbook, one worksheet per sheet.
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let formats = Formats {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format(DATE_FORMAT),
        };

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            write_sheet(worksheet, sheet, &formats)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// Serialize and write to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_xlsx()?;
        std::fs::write(path, &bytes)?;
        info!("Wrote {} bytes of report to {}", bytes.len(), path.display());
        Ok(())
    }
}

const DATE_FORMAT: &str = "yyyy-mm-dd";

struct Formats {
    header: Format,
    date: Format,
}

/// Spreadsheet serial date, when the calendar allows one (years 1900-9999).
fn excel_date(date: NaiveDate) -> Option<ExcelDateTime> {
    let year = u16::try_from(date.year()).ok()?;
    ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8).ok()
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet, formats: &Formats) -> Result<()> {
    worksheet.set_name(&sheet.name)?;

    let mut row: u32 = 0;
    if !sheet.header.is_empty() {
        for (col, title) in sheet.header.iter().enumerate() {
            worksheet.write_string_with_format(row, col as u16, title, &formats.header)?;
        }
        row += 1;
    }

    for cells in &sheet.rows {
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row, col, *n)?;
                }
                Cell::Date(d) => match excel_date(*d) {
                    Some(date) => {
                        worksheet.write_datetime_with_format(row, col, &date, &formats.date)?;
                    }
                    None => {
                        worksheet.write_string(row, col, d.format("%Y-%m-%d").to_string())?;
                    }
                },
                Cell::Empty => {}
            }
        }
        row += 1;
    }

    if let Some(width) = sheet.column_width {
        for col in 0..sheet.width() {
            worksheet.set_column_width(col as u16, width)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ReportBuilder;
    use fec_rules::AnomalyTable;

    #[test]
    fn empty_report_serializes() {
        let report = ReportBuilder::default().build(&AnomalyTable::default(), "vide.txt");
        let bytes = report.to_xlsx().unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Conformite_vide.xlsx");
        let report = ReportBuilder::default().build(&AnomalyTable::default(), "vide.txt");
        report.save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn dates_inside_the_excel_calendar_become_serial_dates() {
        assert!(excel_date(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()).is_some());
        assert!(excel_date(NaiveDate::from_ymd_opt(24, 3, 3).unwrap()).is_none());
    }
}
