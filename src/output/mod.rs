mod json;
mod table;
mod text;

pub use json::JsonSink;
pub use table::TableSink;
pub use text::TextSink;

use std::io::Write;

use crate::error::Result;
use crate::model::{Finding, ScanSummary};

/// Output format for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One human-readable line per finding
    Text,
    /// One JSON object per line
    Json,
    /// Table rendered once the scan completes
    Table,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Table => "table",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            _ => Err(format!(
                "Unknown format: {}. Use 'text', 'json', or 'table'",
                s
            )),
        }
    }
}

/// Receives findings while a scan runs.
pub trait FindingSink {
    /// Called once per finding, in discovery order.
    fn report(&mut self, finding: &Finding) -> Result<()>;

    /// Called once after the last finding. `summary.found_any()` tells
    /// whether anything was reported at all.
    fn finish(&mut self, _summary: &ScanSummary) -> Result<()> {
        Ok(())
    }
}

impl FindingSink for Vec<Finding> {
    fn report(&mut self, finding: &Finding) -> Result<()> {
        self.push(finding.clone());
        Ok(())
    }
}

impl<S: FindingSink + ?Sized> FindingSink for Box<S> {
    fn report(&mut self, finding: &Finding) -> Result<()> {
        (**self).report(finding)
    }

    fn finish(&mut self, summary: &ScanSummary) -> Result<()> {
        (**self).finish(summary)
    }
}

/// Builds the sink for `format`, writing to `out`.
pub fn sink_for<W: Write + 'static>(format: OutputFormat, out: W) -> Box<dyn FindingSink> {
    match format {
        OutputFormat::Text => Box::new(TextSink::new(out)),
        OutputFormat::Json => Box::new(JsonSink::new(out)),
        OutputFormat::Table => Box::new(TableSink::new(out)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("table").unwrap(), OutputFormat::Table);
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_format_round_trips_name() {
        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Table] {
            assert_eq!(OutputFormat::from_str(format.as_str()).unwrap(), format);
        }
    }
}
