use std::io::Write;

use super::FindingSink;
use crate::error::{Result, ScanError};
use crate::model::{Finding, ScanSummary};

/// Writes each finding as a single-line JSON object.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FindingSink for JsonSink<W> {
    fn report(&mut self, finding: &Finding) -> Result<()> {
        serde_json::to_writer(&mut self.out, finding)
            .map_err(|err| ScanError::Output(err.into()))?;
        writeln!(self.out).map_err(ScanError::Output)
    }

    fn finish(&mut self, _summary: &ScanSummary) -> Result<()> {
        self.out.flush().map_err(ScanError::Output)
    }
}
