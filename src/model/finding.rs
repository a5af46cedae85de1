use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::checker::Verdict;

/// A Log4j manifest located during a scan.
///
/// `file` is always the top-level archive handed to the inspector, never the
/// name of a nested jar inside it. `vulnerable` is derived from `verdict` and
/// cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    file: PathBuf,
    manifest: String,
    release_version: String,
    vulnerable: bool,
    verdict: Verdict,
}

impl Finding {
    pub fn new(
        file: impl Into<PathBuf>,
        manifest: impl Into<String>,
        release_version: impl Into<String>,
        verdict: Verdict,
    ) -> Self {
        Self {
            file: file.into(),
            manifest: manifest.into(),
            release_version: release_version.into(),
            vulnerable: verdict.is_vulnerable(),
            verdict,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    /// Declared release version, empty if the manifest had none.
    pub fn release_version(&self) -> &str {
        &self.release_version
    }

    pub fn vulnerable(&self) -> bool {
        self.vulnerable
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }
}

/// Totals for one completed scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Filesystem entries visited by the walker.
    pub entries_seen: u64,
    /// Archive paths handed to the inspector.
    pub candidates: u64,
    pub findings: usize,
    pub vulnerable: usize,
    pub undetermined: usize,
}

impl ScanSummary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            root: root.into(),
            started_at: now,
            finished_at: now,
            entries_seen: 0,
            candidates: 0,
            findings: 0,
            vulnerable: 0,
            undetermined: 0,
        }
    }

    pub fn record(&mut self, finding: &Finding) {
        self.findings += 1;
        match finding.verdict() {
            Verdict::Vulnerable => self.vulnerable += 1,
            Verdict::Undetermined => self.undetermined += 1,
            Verdict::NotVulnerable => {}
        }
    }

    /// False when the whole scan located no Log4j manifest at all.
    pub fn found_any(&self) -> bool {
        self.findings > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vulnerable_follows_verdict() {
        for verdict in [
            Verdict::Vulnerable,
            Verdict::NotVulnerable,
            Verdict::Undetermined,
        ] {
            let finding = Finding::new("/a.war", "", "2.14.1", verdict);
            assert_eq!(finding.vulnerable(), verdict.is_vulnerable());
            assert_eq!(finding.verdict(), verdict);
        }

        let finding = Finding::new("/a.war", "", "", Verdict::Undetermined);
        assert!(!finding.vulnerable());
        assert_eq!(finding.release_version(), "");
    }

    #[test]
    fn test_finding_json_shape() {
        let finding = Finding::new(
            "/srv/app.war",
            "Manifest-Version: 1.0",
            "2.14.1",
            Verdict::Vulnerable,
        );
        let json = serde_json::to_value(&finding).unwrap();

        assert_eq!(json["file"], "/srv/app.war");
        assert_eq!(json["manifest"], "Manifest-Version: 1.0");
        assert_eq!(json["release_version"], "2.14.1");
        assert_eq!(json["vulnerable"], true);
        assert_eq!(json["verdict"], "vulnerable");
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = ScanSummary::new("/");
        assert!(!summary.found_any());

        summary.record(&Finding::new("/a.jar", "", "2.14.1", Verdict::Vulnerable));
        summary.record(&Finding::new("/b.jar", "", "2.17.1", Verdict::NotVulnerable));
        summary.record(&Finding::new("/c.jar", "", "", Verdict::Undetermined));

        assert!(summary.found_any());
        assert_eq!(summary.findings, 3);
        assert_eq!(summary.vulnerable, 1);
        assert_eq!(summary.undetermined, 1);
    }
}
