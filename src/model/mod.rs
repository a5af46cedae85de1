//! Core data types for scan findings and results.
//!
//! - [`Finding`] - One located Log4j manifest and its verdict
//! - [`ScanSummary`] - Totals for a completed scan
//!
//! # Example
//!
//! ```
//! use log4scan::checker::Verdict;
//! use log4scan::model::Finding;
//!
//! let manifest = "Log4jReleaseVersion: 2.14.1\n";
//! let finding = Finding::new("/srv/app.war", manifest, "2.14.1", Verdict::Vulnerable);
//! assert!(finding.vulnerable());
//! ```

mod finding;

pub use finding::*;
