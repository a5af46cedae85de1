pub mod checker;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod scanner;

pub use checker::{RangeChecker, Verdict, VulnerabilityChecker};
pub use config::Config;
pub use error::ScanError;
pub use model::{Finding, ScanSummary};
pub use scanner::{ScanOptions, Scanner};
