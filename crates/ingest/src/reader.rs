//! FEC file reader.
//!
//! FEC exports are tab-separated and, more often than not, Windows-1252
//! encoded. A UTF-8 BOM switches decoding to UTF-8. Quotes carry no meaning
//! in the format and are kept as literal characters.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use encoding_rs::WINDOWS_1252;
use tracing::{debug, info, warn};

use fec_core::{Column, ColumnSet, Ledger, LedgerRow};

use crate::error::{IngestError, Result};
use crate::normalize::{clean_text, column_for_header, parse_amount, parse_date};

/// Reads FEC files into a [`Ledger`].
#[derive(Debug, Clone)]
pub struct FecReader {
    delimiter: u8,
}

impl Default for FecReader {
    fn default() -> Self {
        Self { delimiter: b'\t' }
    }
}

impl FecReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another field separator (some tools export `|` or `;`).
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Lenient entry point: any failure is logged and yields an empty
    /// ledger, which audits as a clean file.
    pub fn load_or_empty(&self, path: &Path) -> Ledger {
        match self.read_path(path) {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable FEC file, auditing an empty ledger");
                Ledger::empty()
            }
        }
    }

    pub fn read_path(&self, path: &Path) -> Result<Ledger> {
        let bytes = std::fs::read(path)?;
        let ledger = self.read_bytes(&bytes)?;
        info!("Imported {} ledger rows from {}", ledger.len(), path.display());
        Ok(ledger)
    }

    /// Decode and parse raw file content.
    ///
    /// Fails only on structural problems: no header line, or a header with
    /// no recognisable FEC column.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Ledger> {
        // BOM sniffing happens inside `decode`; without one, Windows-1252.
        let (text, encoding, lossy) = WINDOWS_1252.decode(bytes);
        if lossy {
            warn!(encoding = encoding.name(), "malformed byte sequences replaced while decoding");
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(IngestError::Empty);
        }
        let mapping = HeaderMap::from_headers(&headers);
        if mapping.columns.is_empty() {
            let first = headers.get(0).unwrap_or("").chars().take(80).collect();
            return Err(IngestError::UnknownLayout(first));
        }
        debug!(columns = ?mapping.columns, "header mapped");

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            rows.push(mapping.row(&record));
        }

        Ok(Ledger::with_columns(rows, mapping.columns))
    }
}

/// Field index of each canonical column present in the header.
struct HeaderMap {
    indices: [Option<usize>; Column::ALL.len()],
    columns: ColumnSet,
}

impl HeaderMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut indices = [None; Column::ALL.len()];
        let mut columns = ColumnSet::empty();
        for (i, header) in headers.iter().enumerate() {
            if let Some(column) = column_for_header(header) {
                let slot = &mut indices[slot_of(column)];
                // First occurrence wins (EcriturePiece over PieceRef).
                if slot.is_none() {
                    *slot = Some(i);
                    columns.insert(column);
                }
            }
        }
        Self { indices, columns }
    }

    fn field<'r>(&self, record: &'r StringRecord, column: Column) -> &'r str {
        self.indices[slot_of(column)]
            .and_then(|i| record.get(i))
            .unwrap_or("")
    }

    fn row(&self, record: &StringRecord) -> LedgerRow {
        LedgerRow {
            account: clean_text(self.field(record, Column::Account)),
            date: parse_date(self.field(record, Column::Date)),
            debit: parse_amount(self.field(record, Column::Debit)),
            credit: parse_amount(self.field(record, Column::Credit)),
            label: self.field(record, Column::Label).trim().to_string(),
            journal: clean_text(self.field(record, Column::Journal)),
            piece: clean_text(self.field(record, Column::Piece)),
        }
    }
}

fn slot_of(column: Column) -> usize {
    Column::ALL
        .iter()
        .position(|c| *c == column)
        .unwrap_or_default()
}
