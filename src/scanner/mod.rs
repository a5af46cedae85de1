//! Filesystem scan for Log4j inside jar/war/ear archives.
//!
//! The scan is a producer/consumer pipeline:
//!
//! | Stage | Runs on | Does |
//! |-------|---------|------|
//! | [`CandidateWalker`] | blocking task | walks the tree, sends archive paths |
//! | bounded channel | | carries [`WalkEvent`]s, ends with `Done` |
//! | [`Scanner::run`] loop | caller's task | takes one path at a time |
//! | [`ArchiveInspector`] | blocking task | recursive archive inspection |
//! | [`FindingSink`] | caller's task | receives findings in discovery order |
//!
//! Only one archive is inspected at a time, which bounds open file handles
//! and the memory held by nested archives read into buffers.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use log4scan::checker::default_checker;
//! use log4scan::model::Finding;
//! use log4scan::scanner::{ScanOptions, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scanner = Scanner::new(ScanOptions::new("/opt"), Arc::new(default_checker()?));
//!     let mut findings: Vec<Finding> = Vec::new();
//!     let summary = scanner.run(&mut findings).await?;
//!
//!     if !summary.found_any() {
//!         println!("Did not find any Log4j instances.");
//!     }
//!     Ok(())
//! }
//! ```

mod archive;
mod filter;
mod manifest;
mod walker;

pub use archive::ArchiveInspector;
pub use filter::{basename, is_archive_name, is_target_library, MANIFEST_PATH};
pub use manifest::extract_release_version;
pub use walker::{is_excluded, spawn_walker, CandidateWalker, Throttle, WalkEvent, WalkStats};

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::info;

use crate::checker::VulnerabilityChecker;
use crate::error::{Result, ScanError};
use crate::model::ScanSummary;
use crate::output::FindingSink;

/// Capacity of the candidate channel between walker and inspector.
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

/// Inputs for one scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub throttle: Throttle,
    pub queue_depth: usize,
    /// Glob patterns for directories the walker must not enter.
    pub exclude: Vec<String>,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            throttle: Throttle::default(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            exclude: Vec::new(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.throttle.batch_size = batch_size;
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.throttle.batch_size == 0 {
            return Err(ScanError::InvalidOptions("batch size must be positive"));
        }
        if self.queue_depth == 0 {
            return Err(ScanError::InvalidOptions("queue depth must be positive"));
        }
        Ok(())
    }
}

/// Runs one complete scan of a directory tree.
pub struct Scanner {
    options: ScanOptions,
    checker: Arc<dyn VulnerabilityChecker>,
    stats: Arc<WalkStats>,
}

impl Scanner {
    pub fn new(options: ScanOptions, checker: Arc<dyn VulnerabilityChecker>) -> Self {
        Self {
            options,
            checker,
            stats: Arc::new(WalkStats::default()),
        }
    }

    /// Live walk counters, for progress display while [`run`](Self::run) is
    /// in flight. They restart from zero at the beginning of every run, so
    /// the handle can be taken once and kept across runs.
    pub fn stats(&self) -> Arc<WalkStats> {
        Arc::clone(&self.stats)
    }

    /// Walks the tree and inspects every candidate archive, handing findings
    /// to `sink` as they are found and calling [`FindingSink::finish`] once
    /// at the end.
    ///
    /// # Errors
    ///
    /// Fails if the options are invalid, the root does not exist, or the
    /// sink cannot write. Unreadable directories and broken archives are
    /// skipped, never reported as errors.
    ///
    /// Runs of one `Scanner` must not overlap; they share the counters.
    pub async fn run<S: FindingSink + ?Sized>(&self, sink: &mut S) -> Result<ScanSummary> {
        self.options.validate()?;

        let root = self.options.root.clone();
        if tokio::fs::symlink_metadata(&root).await.is_err() {
            return Err(ScanError::RootNotFound(root));
        }

        info!(root = %root.display(), checker = self.checker.name(), "starting scan");
        self.stats.reset();
        let mut summary = ScanSummary::new(&root);

        let (tx, mut rx) = mpsc::channel(self.options.queue_depth);
        let walker = CandidateWalker::new(
            &root,
            self.options.exclude.clone(),
            self.options.throttle,
            self.stats(),
        );
        let producer = spawn_walker(walker, tx);

        while let Some(event) = rx.recv().await {
            let path = match event {
                WalkEvent::Candidate(path) => path,
                WalkEvent::Done => break,
            };

            let checker = Arc::clone(&self.checker);
            let findings = tokio::task::spawn_blocking(move || {
                ArchiveInspector::new(checker.as_ref()).inspect_collect(&path)
            })
            .await?;

            for finding in &findings {
                summary.record(finding);
                sink.report(finding)?;
            }
        }
        producer.await?;

        summary.entries_seen = self.stats.entries_seen();
        summary.candidates = self.stats.candidates();
        summary.finished_at = Utc::now();

        info!(
            entries = summary.entries_seen,
            archives = summary.candidates,
            findings = summary.findings,
            vulnerable = summary.vulnerable,
            "scan complete"
        );

        sink.finish(&summary)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::default_checker;
    use crate::model::Finding;

    #[test]
    fn test_options_defaults() {
        let options = ScanOptions::new("/");
        assert_eq!(options.throttle.batch_size, 20_000);
        assert_eq!(options.queue_depth, DEFAULT_QUEUE_DEPTH);
        assert!(options.exclude.is_empty());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_reject_zero_batch() {
        let options = ScanOptions::new("/").with_batch_size(0);
        assert!(matches!(options.validate(), Err(ScanError::InvalidOptions(_))));
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = Scanner::new(
            ScanOptions::new(dir.path().join("nope")),
            Arc::new(default_checker().unwrap()),
        );

        let mut findings: Vec<Finding> = Vec::new();
        let result = scanner.run(&mut findings).await;
        assert!(matches!(result, Err(ScanError::RootNotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_tree_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = Scanner::new(
            ScanOptions::new(dir.path()),
            Arc::new(default_checker().unwrap()),
        );

        let mut findings: Vec<Finding> = Vec::new();
        let summary = scanner.run(&mut findings).await.unwrap();

        assert!(findings.is_empty());
        assert!(!summary.found_any());
        assert_eq!(summary.candidates, 0);
        assert_eq!(scanner.stats().entries_seen(), 1);
    }

    #[tokio::test]
    async fn test_counters_restart_on_each_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jar"), b"").unwrap();
        let scanner = Scanner::new(
            ScanOptions::new(dir.path()),
            Arc::new(default_checker().unwrap()),
        );
        let stats = scanner.stats();

        let mut findings: Vec<Finding> = Vec::new();
        let first = scanner.run(&mut findings).await.unwrap();
        let second = scanner.run(&mut findings).await.unwrap();

        assert_eq!(first.entries_seen, 2);
        assert_eq!(first.candidates, 1);
        assert_eq!(second.entries_seen, first.entries_seen);
        assert_eq!(second.candidates, first.candidates);
        assert_eq!(stats.candidates(), 1);
    }
}
