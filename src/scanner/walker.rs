//! Filesystem traversal producing candidate archive paths.
//!
//! [`CandidateWalker`] is a lazy, single-pass iterator over every `.jar`,
//! `.war` and `.ear` below a root. Unreadable directories are skipped
//! without surfacing an error. Every visited entry bumps a shared counter,
//! and each time the counter reaches a multiple of the batch size the
//! walker pauses briefly to ease pressure on the filesystem.
//!
//! [`spawn_walker`] drives the iterator on a blocking task and feeds a
//! bounded channel, finishing with a single [`WalkEvent::Done`].

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use walkdir::WalkDir;

use super::filter::is_archive_name;

/// Counters shared between the walker and whoever reports progress.
#[derive(Debug, Default)]
pub struct WalkStats {
    entries_seen: AtomicU64,
    candidates: AtomicU64,
}

impl WalkStats {
    pub fn entries_seen(&self) -> u64 {
        self.entries_seen.load(Ordering::Relaxed)
    }

    pub fn candidates(&self) -> u64 {
        self.candidates.load(Ordering::Relaxed)
    }

    pub(super) fn reset(&self) {
        self.entries_seen.store(0, Ordering::Relaxed);
        self.candidates.store(0, Ordering::Relaxed);
    }
}

/// Item sent from the walker to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    Candidate(PathBuf),
    /// The tree is exhausted. Always the last event.
    Done,
}

/// Throttling parameters for a walk.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    /// Pause after every `batch_size` entries. Zero disables throttling.
    pub batch_size: u64,
    pub pause: Duration,
}

impl Throttle {
    pub const DEFAULT_BATCH_SIZE: u64 = 20_000;
    pub const DEFAULT_PAUSE: Duration = Duration::from_millis(50);

    fn should_pause(&self, seen: u64) -> bool {
        self.batch_size > 0 && seen % self.batch_size == 0
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
            pause: Self::DEFAULT_PAUSE,
        }
    }
}

/// Lazy iterator over candidate archive paths below a root.
pub struct CandidateWalker {
    entries: Box<dyn Iterator<Item = walkdir::Result<walkdir::DirEntry>> + Send>,
    stats: Arc<WalkStats>,
    throttle: Throttle,
}

impl CandidateWalker {
    /// Walks `root` without following symlinks. Directories matching one of
    /// the `exclude` patterns are not descended into.
    pub fn new(
        root: &Path,
        exclude: Vec<String>,
        throttle: Throttle,
        stats: Arc<WalkStats>,
    ) -> Self {
        let entries = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| {
                !(entry.file_type().is_dir() && is_excluded(entry.path(), &exclude))
            });

        Self {
            entries: Box::new(entries),
            stats,
            throttle,
        }
    }
}

impl Iterator for CandidateWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        for entry in self.entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable path");
                    continue;
                }
            };

            let seen = self.stats.entries_seen.fetch_add(1, Ordering::Relaxed) + 1;
            if self.throttle.should_pause(seen) {
                std::thread::sleep(self.throttle.pause);
            }

            if entry.file_type().is_dir() {
                continue;
            }

            if is_archive_name(&entry.file_name().to_string_lossy()) {
                self.stats.candidates.fetch_add(1, Ordering::Relaxed);
                return Some(entry.into_path());
            }
        }
        None
    }
}

/// Runs `walker` on a blocking task, sending each candidate into `tx` and a
/// final [`WalkEvent::Done`]. Stops early only if the receiver is dropped.
pub fn spawn_walker(walker: CandidateWalker, tx: mpsc::Sender<WalkEvent>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        for path in walker {
            if tx.blocking_send(WalkEvent::Candidate(path)).is_err() {
                debug!("candidate receiver closed, stopping walk");
                return;
            }
        }
        let _ = tx.blocking_send(WalkEvent::Done);
    })
}

/// True if `path` matches one of the exclude `patterns`.
///
/// Patterns are matched per path component. A pattern starting with `/`
/// must match the leading components of `path`. Any other pattern may match
/// a run of consecutive components anywhere in it. Inside a component, `*`
/// matches any characters except `/`, so `*/node_modules` matches
/// `/home/me/node_modules` but `node_modules` does not match
/// `/home/node_modules_old`.
pub fn is_excluded(path: &Path, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let components: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();

    patterns
        .iter()
        .any(|pattern| pattern_matches(pattern, &components))
}

fn pattern_matches(pattern: &str, components: &[String]) -> bool {
    let anchored = pattern.starts_with('/');
    let parts: Vec<&str> = pattern.split('/').filter(|part| !part.is_empty()).collect();

    if parts.is_empty() || parts.len() > components.len() {
        return false;
    }

    let window_matches = |window: &[String]| {
        parts
            .iter()
            .zip(window)
            .all(|(part, name)| component_matches(part, name))
    };

    if anchored {
        window_matches(&components[..parts.len()])
    } else {
        components.windows(parts.len()).any(window_matches)
    }
}

/// `*` wildcard match of a single path component.
fn component_matches(pattern: &str, name: &str) -> bool {
    let mut pieces = pattern.split('*');
    let first = pieces.next().unwrap_or_default();

    let Some(mut remaining) = name.strip_prefix(first) else {
        return false;
    };
    let pieces: Vec<&str> = pieces.collect();
    let Some((last, middle)) = pieces.split_last() else {
        // no `*` in the pattern
        return remaining.is_empty();
    };

    for piece in middle {
        match remaining.find(piece) {
            Some(pos) => remaining = &remaining[pos + piece.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}
