//! The sync core: list, diff, and the download-then-archive loop

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::logger::Logger;
use crate::session::{DirEntry, TransferSession};

/// Errors the core can surface. All are terminal for the current run; the
/// caller decides how to report them.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to list {dir}: {source}")]
    List { dir: String, source: io::Error },

    #[error("failed to download {name}: {source}")]
    Download { name: String, source: io::Error },

    #[error("failed to archive {name}: {source}")]
    Archive { name: String, source: io::Error },
}

/// Where to read from, where to archive to, where downloads land
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub read_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub download_dir: PathBuf,
}

/// Totals for one run
#[derive(Debug, Default, Clone)]
pub struct SyncStats {
    pub files_synced: u64,
    pub bytes_synced: u64,
}

impl SyncStats {
    fn add_file(&mut self, bytes: u64) {
        self.files_synced += 1;
        self.bytes_synced += bytes;
    }
}

/// List `dir` through the session, keeping only non-directory entries.
///
/// The filter builds a fresh vector; the listing is never shrunk in place.
/// Listing order is preserved as the server returned it.
pub fn list_files<S: TransferSession>(
    session: &S,
    dir: &Path,
    logger: &dyn Logger,
) -> Result<Vec<DirEntry>, SyncError> {
    let listing = session.list_dir(dir).map_err(|source| SyncError::List {
        dir: dir.display().to_string(),
        source,
    })?;

    let mut files = Vec::with_capacity(listing.len());
    for entry in listing {
        if entry.is_directory {
            logger.skip_dir(&entry.name);
            continue;
        }
        files.push(entry);
    }
    Ok(files)
}

/// Names present in `pending` but absent from `archived`, in pending order.
/// Comparison is exact string equality.
pub fn diff_names(pending: &[DirEntry], archived: &[DirEntry]) -> Vec<String> {
    let archived: HashSet<&str> = archived.iter().map(|e| e.name.as_str()).collect();
    pending
        .iter()
        .filter(|e| !archived.contains(e.name.as_str()))
        .map(|e| e.name.clone())
        .collect()
}

/// Stream one remote file into a local create/truncate target. Both handles
/// are scoped to this call, so they are released on every exit path before
/// the next name is attempted.
fn download<S: TransferSession>(session: &S, remote: &Path, local: &Path) -> io::Result<u64> {
    let mut reader = session.open_read(remote)?;
    let mut writer = session.create_write(local)?;
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}

/// Download then archive each name, strictly in order.
///
/// The first failure aborts the remaining names and is returned to the
/// caller. Files already fully processed stay archived; the failed name and
/// everything after it stay in the read directory for the next run.
pub fn process<S: TransferSession>(
    session: &S,
    names: &[String],
    opts: &SyncOptions,
    logger: &dyn Logger,
) -> Result<SyncStats, SyncError> {
    let mut stats = SyncStats::default();
    for name in names {
        let remote_src = opts.read_dir.join(name);
        let local_dst = opts.download_dir.join(name);

        let bytes = download(session, &remote_src, &local_dst)
            .map_err(|source| SyncError::Download {
                name: name.clone(),
                source,
            })?;
        logger.download_done(name, bytes);

        // Only a fully downloaded file is moved out of the read directory;
        // an interruption before this point leaves it pending, and the
        // create/truncate download overwrites any partial local copy on the
        // next run.
        let remote_dst = opts.archive_dir.join(name);
        session
            .rename(&remote_src, &remote_dst)
            .map_err(|source| SyncError::Archive {
                name: name.clone(),
                source,
            })?;
        logger.archived(name);

        stats.add_file(bytes);
    }
    Ok(stats)
}

/// One full pass: list the read directory, list the archive directory, diff
/// by name, process the new names. The archive listing is taken from the
/// remote, so clearing the local download directory never causes
/// re-processing.
pub fn run<S: TransferSession>(
    session: &S,
    opts: &SyncOptions,
    logger: &dyn Logger,
) -> Result<SyncStats, SyncError> {
    logger.trace("listing read directory");
    let pending = list_files(session, &opts.read_dir, logger)?;

    logger.trace("listing archive directory");
    let archived = list_files(session, &opts.archive_dir, logger)?;

    let names = diff_names(&pending, &archived);
    logger.new_files(names.len());

    process(session, &names, opts, logger)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            size: 0,
            is_directory: false,
        }
    }

    #[test]
    fn diff_skips_archived_names() {
        let pending = [file("a.csv"), file("b.csv"), file("c.csv")];
        let archived = [file("a.csv")];
        assert_eq!(diff_names(&pending, &archived), ["b.csv", "c.csv"]);
    }

    #[test]
    fn diff_of_empty_pending_is_empty() {
        let archived = [file("x.csv")];
        assert!(diff_names(&[], &archived).is_empty());
    }

    #[test]
    fn diff_with_empty_archive_keeps_everything() {
        let pending = [file("b.csv"), file("a.csv")];
        assert_eq!(diff_names(&pending, &[]), ["b.csv", "a.csv"]);
    }

    #[test]
    fn diff_preserves_pending_order() {
        let pending = [file("z.csv"), file("m.csv"), file("a.csv")];
        let archived = [file("m.csv")];
        assert_eq!(diff_names(&pending, &archived), ["z.csv", "a.csv"]);
    }

    #[test]
    fn diff_is_idempotent() {
        let pending = [file("a.csv"), file("b.csv")];
        let archived = [file("b.csv")];
        let first = diff_names(&pending, &archived);
        let second = diff_names(&pending, &archived);
        assert_eq!(first, second);
    }

    #[test]
    fn diff_after_processing_everything_is_empty() {
        let pending = [file("a.csv"), file("b.csv")];
        let archived = [file("a.csv"), file("b.csv")];
        assert!(diff_names(&pending, &archived).is_empty());
    }

    #[test]
    fn name_comparison_is_exact() {
        let pending = [file("A.csv"), file("a.csv ")];
        let archived = [file("a.csv")];
        assert_eq!(diff_names(&pending, &archived), ["A.csv", "a.csv "]);
    }
}
