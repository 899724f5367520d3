//! FEC file ingestion: decode, parse and normalize a tab-separated
//! *Fichier des Écritures Comptables* into a [`fec_core::Ledger`].

pub mod error;
pub mod normalize;
pub mod reader;

pub use error::{IngestError, Result};
pub use reader::FecReader;
