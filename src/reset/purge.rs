//! Recursive, best-effort deletion of a directory's contents.
//!
//! The root itself is never removed. Traversal is depth-first with children
//! removed before their parent, symlinks are never followed, and any entry
//! whose canonical path resolves outside the root is skipped — this is the
//! guard against symlink and traversal escapes. Per-entry failures are
//! collected into the [`PurgeReport`] and logged as warnings rather than
//! aborting the sweep.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Per-entry results of one purge sweep.
#[derive(Debug, Default)]
pub struct PurgeReport {
    /// Entries successfully removed.
    pub removed: Vec<PathBuf>,
    /// Entries that could not be removed, with the error text.
    pub failed: Vec<(PathBuf, String)>,
    /// Entries skipped by the containment check.
    pub skipped: Vec<PathBuf>,
}

impl PurgeReport {
    /// True when nothing failed (skipped entries are not failures).
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delete everything inside `root`, leaving `root` itself intact.
pub fn purge_contents(root: &Path) -> PurgeReport {
    let mut report = PurgeReport::default();

    let root = match root.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            warn!(path = %root.display(), error = %e, "purge root could not be resolved");
            report.failed.push((root.to_path_buf(), e.to_string()));
            return report;
        }
    };
    if !root.is_dir() {
        warn!(path = %root.display(), "purge root is not a directory");
        report.failed.push((root, "not a directory".to_string()));
        return report;
    }

    purge_dir(&root, &root, &mut report);
    debug!(
        removed = report.removed.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "purge sweep finished"
    );
    report
}

fn purge_dir(dir: &Path, root: &Path, report: &mut PurgeReport) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to list directory");
            report.failed.push((dir.to_path_buf(), e.to_string()));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report.failed.push((dir.to_path_buf(), e.to_string()));
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                report.failed.push((path, e.to_string()));
                continue;
            }
        };

        if file_type.is_symlink() {
            // Never traverse a link. A link whose target resolves outside the
            // root is left entirely alone; an in-root or dangling link is
            // removed as a plain entry, which deletes the link and not its
            // target.
            if let Ok(resolved) = path.canonicalize() {
                if !resolved.starts_with(root) {
                    warn!(path = %path.display(), target = %resolved.display(), "skipping link outside purge root");
                    report.skipped.push(path);
                    continue;
                }
            }
            remove_file_entry(&path, report);
        } else if file_type.is_dir() {
            match path.canonicalize() {
                Ok(resolved) if resolved.starts_with(root) => {
                    purge_dir(&path, root, report);
                    match fs::remove_dir(&path) {
                        Ok(()) => report.removed.push(path),
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "failed to remove directory");
                            report.failed.push((path, e.to_string()));
                        }
                    }
                }
                Ok(resolved) => {
                    warn!(path = %path.display(), target = %resolved.display(), "skipping directory outside purge root");
                    report.skipped.push(path);
                }
                Err(e) => {
                    report.failed.push((path, e.to_string()));
                }
            }
        } else {
            remove_file_entry(&path, report);
        }
    }
}

fn remove_file_entry(path: &Path, report: &mut PurgeReport) {
    match fs::remove_file(path) {
        Ok(()) => report.removed.push(path.to_path_buf()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove file");
            report.failed.push((path.to_path_buf(), e.to_string()));
        }
    }
}
