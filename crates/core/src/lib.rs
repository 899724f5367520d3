pub mod config;
pub mod error;
pub mod ledger;

pub use config::{load_dotenv, AuditConfig, ReportConfig, Thresholds};
pub use error::*;
pub use ledger::*;
