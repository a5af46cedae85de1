use std::io::Write;

use tabled::{settings::Style, Table, Tabled};

use super::FindingSink;
use crate::checker::Verdict;
use crate::error::{Result, ScanError};
use crate::model::{Finding, ScanSummary};

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "File")]
    file: String,
}

/// Collects findings and renders them as one table when the scan ends.
pub struct TableSink<W: Write> {
    out: W,
    findings: Vec<Finding>,
}

impl<W: Write> TableSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            findings: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_report(&mut self, summary: &ScanSummary) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "Scan of {} completed at: {}",
            summary.root.display(),
            summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.out)?;

        if !summary.found_any() {
            writeln!(self.out, "Did not find any Log4j instances.")?;
        } else {
            writeln!(self.out, "Found {} Log4j instances:", summary.findings)?;
            writeln!(self.out)?;

            let mut findings = std::mem::take(&mut self.findings);
            findings.sort_by_key(|finding| verdict_rank(finding.verdict()));
            let rows: Vec<FindingRow> = findings.iter().map(to_row).collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            writeln!(self.out, "{}", table)?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "Summary:")?;
        writeln!(self.out, "  Entries scanned: {}", summary.entries_seen)?;
        writeln!(self.out, "  Archives inspected: {}", summary.candidates)?;
        if summary.undetermined > 0 {
            writeln!(
                self.out,
                "  Log4j instances: {} ({} with unknown version)",
                summary.findings, summary.undetermined
            )?;
        } else {
            writeln!(self.out, "  Log4j instances: {}", summary.findings)?;
        }
        writeln!(self.out, "  Vulnerable: {}", summary.vulnerable)?;
        self.out.flush()
    }
}

impl<W: Write> FindingSink for TableSink<W> {
    fn report(&mut self, finding: &Finding) -> Result<()> {
        self.findings.push(finding.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &ScanSummary) -> Result<()> {
        self.write_report(summary).map_err(ScanError::Output)
    }
}

fn format_verdict(verdict: Verdict) -> String {
    match verdict {
        Verdict::Vulnerable => "\x1b[31mVULNERABLE\x1b[0m".to_string(),
        Verdict::Undetermined => "\x1b[33mUNKNOWN\x1b[0m".to_string(),
        Verdict::NotVulnerable => "ok".to_string(),
    }
}

fn to_row(finding: &Finding) -> FindingRow {
    let version = if finding.release_version().is_empty() {
        "-".to_string()
    } else {
        finding.release_version().to_string()
    };

    FindingRow {
        status: format_verdict(finding.verdict()),
        version,
        file: finding.file().display().to_string(),
    }
}

/// Vulnerable first, then undetermined, then clean.
fn verdict_rank(verdict: Verdict) -> u8 {
    match verdict {
        Verdict::Vulnerable => 0,
        Verdict::Undetermined => 1,
        Verdict::NotVulnerable => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_vulnerable_first() {
        let mut sink = TableSink::new(Vec::new());
        sink.report(&Finding::new("/srv/clean.jar", "", "2.17.1", Verdict::NotVulnerable))
            .unwrap();
        sink.report(&Finding::new("/srv/app.war", "", "2.14.1", Verdict::Vulnerable))
            .unwrap();

        let mut summary = ScanSummary::new("/srv");
        summary.findings = 2;
        summary.vulnerable = 1;
        sink.finish(&summary).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.contains("Found 2 Log4j instances"));
        let vulnerable = out.find("/srv/app.war").unwrap();
        let clean = out.find("/srv/clean.jar").unwrap();
        assert!(vulnerable < clean);
        assert!(out.contains("Vulnerable: 1"));
    }

    #[test]
    fn test_table_empty_scan() {
        let mut sink = TableSink::new(Vec::new());
        sink.finish(&ScanSummary::new("/srv")).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.contains("Did not find any Log4j instances."));
        assert!(out.contains("Log4j instances: 0"));
    }
}
