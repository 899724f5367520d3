use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("file has no header line")]
    Empty,

    #[error("no FEC column recognised in header: {0}")]
    UnknownLayout(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
