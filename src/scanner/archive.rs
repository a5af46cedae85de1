//! Recursive inspection of jar/war/ear containers.
//!
//! A container whose basename looks like the Log4j library is searched for
//! its manifest. Any other container is a holder: every entry that is itself
//! a jar/war/ear is read into memory, reopened as a container and inspected
//! the same way. Nesting depth is not limited.
//!
//! Failures never escape [`ArchiveInspector::inspect`]. An unreadable
//! container, a corrupt entry or a truncated nested archive ends that
//! subtree and is logged at `debug`.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;

use super::filter::{basename, is_archive_name, is_target_library, MANIFEST_PATH};
use super::manifest::extract_release_version;
use crate::checker::{Verdict, VulnerabilityChecker};
use crate::error::{Result, ScanError};
use crate::model::Finding;

/// Locates Log4j manifests inside one top-level archive and classifies them.
pub struct ArchiveInspector<'a> {
    checker: &'a dyn VulnerabilityChecker,
}

impl<'a> ArchiveInspector<'a> {
    pub fn new(checker: &'a dyn VulnerabilityChecker) -> Self {
        Self { checker }
    }

    /// Inspects the archive at `path`, calling `emit` once per manifest found,
    /// in discovery order. Returns the number of findings emitted.
    pub fn inspect(&self, path: &Path, emit: &mut dyn FnMut(Finding)) -> usize {
        let mut archive = match open_archive(path) {
            Ok(archive) => archive,
            Err(err) => {
                debug!(error = %err, "skipping unreadable archive");
                return 0;
            }
        };

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.inspect_container(&mut archive, &name, path, 0, emit)
    }

    /// Convenience wrapper collecting the findings of one archive.
    pub fn inspect_collect(&self, path: &Path) -> Vec<Finding> {
        let mut findings = Vec::new();
        self.inspect(path, &mut |finding| findings.push(finding));
        findings
    }

    fn inspect_container<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        name: &str,
        origin: &Path,
        depth: usize,
        emit: &mut dyn FnMut(Finding),
    ) -> usize {
        if is_target_library(basename(name)) {
            return match read_manifest(archive, name) {
                Ok(manifest) => {
                    emit(self.finding(origin, manifest));
                    1
                }
                Err(err) => {
                    debug!(
                        origin = %origin.display(),
                        error = %err,
                        "no readable manifest in library jar"
                    );
                    0
                }
            };
        }

        let mut found = 0;
        for index in 0..archive.len() {
            let (entry_name, bytes) = match read_nested_entry(archive, index) {
                Ok(Some(nested)) => nested,
                Ok(None) => continue,
                Err(err) => {
                    debug!(origin = %origin.display(), error = %err, "skipping archive entry");
                    continue;
                }
            };

            let nested = ZipArchive::new(Cursor::new(bytes));
            match nested {
                Ok(mut nested) => {
                    found +=
                        self.inspect_container(&mut nested, &entry_name, origin, depth + 1, emit);
                }
                Err(source) => {
                    let err = ScanError::Archive {
                        entry: entry_name,
                        source,
                    };
                    debug!(
                        origin = %origin.display(),
                        depth,
                        error = %err,
                        "nested entry is not an archive"
                    );
                }
            }
        }
        found
    }

    fn finding(&self, origin: &Path, manifest: String) -> Finding {
        let release_version = extract_release_version(&manifest).unwrap_or_default();

        let verdict = match self.checker.evaluate(&release_version) {
            Ok(true) => Verdict::Vulnerable,
            Ok(false) => Verdict::NotVulnerable,
            Err(err) => {
                warn!(
                    file = %origin.display(),
                    error = %err,
                    "unable to classify release version, reporting as not vulnerable"
                );
                Verdict::Undetermined
            }
        };

        Finding::new(origin, manifest, release_version, verdict)
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ZipArchive::new(BufReader::new(file)).map_err(|source| ScanError::Archive {
        entry: path.display().to_string(),
        source,
    })
}

fn read_manifest<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let entry_error = |source| ScanError::Archive {
        entry: format!("{name}!/{MANIFEST_PATH}"),
        source,
    };

    let mut entry = archive.by_name(MANIFEST_PATH).map_err(entry_error)?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|err| entry_error(err.into()))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads entry `index` fully into memory if it is a nested jar/war/ear.
/// Returns `Ok(None)` for directories and every other kind of entry.
fn read_nested_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
) -> Result<Option<(String, Vec<u8>)>> {
    let mut entry = archive.by_index(index).map_err(|source| ScanError::Archive {
        entry: format!("#{index}"),
        source,
    })?;

    if entry.is_dir() || !is_archive_name(basename(entry.name())) {
        return Ok(None);
    }

    let name = entry.name().to_string();
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|err| ScanError::Archive {
            entry: name.clone(),
            source: err.into(),
        })?;

    Ok(Some((name, bytes)))
}
