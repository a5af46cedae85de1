use std::io::Write;

use super::FindingSink;
use crate::checker::Verdict;
use crate::error::{Result, ScanError};
use crate::model::{Finding, ScanSummary};

/// Writes one line per finding as it arrives.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Vulnerable => "vulnerable",
        Verdict::NotVulnerable => "not-vulnerable",
        Verdict::Undetermined => "not-vulnerable (version undetermined)",
    }
}

impl<W: Write> FindingSink for TextSink<W> {
    fn report(&mut self, finding: &Finding) -> Result<()> {
        writeln!(
            self.out,
            "File: {}    contains version: {}  which is {}",
            finding.file().display(),
            finding.release_version(),
            verdict_label(finding.verdict())
        )
        .map_err(ScanError::Output)
    }

    fn finish(&mut self, summary: &ScanSummary) -> Result<()> {
        if !summary.found_any() {
            writeln!(self.out, "Did not find any Log4j instances.").map_err(ScanError::Output)?;
        }
        self.out.flush().map_err(ScanError::Output)
    }
}
