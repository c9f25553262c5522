//! Transfer-session seam and the local-filesystem provider

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

/// One entry from a directory listing
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
}

/// Capability set the sync core consumes.
///
/// `list_dir`, `open_read` and `rename` address the remote side of the
/// session; `create_write` addresses the local download side. Any provider
/// of these four operations can drive a run - the SFTP session in
/// production, [`LocalSession`] in tests or for plain directory trees.
pub trait TransferSession {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;
    fn create_write(&self, path: &Path) -> io::Result<Box<dyn Write>>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Session backed entirely by the local filesystem
pub struct LocalSession;

impl TransferSession for LocalSession {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
                is_directory: meta.is_dir(),
            });
        }
        Ok(entries)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(path)?))
    }

    fn create_write(&self, path: &Path) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(File::create(path)?))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        // SFTP rename fails when the target already exists; keep the same
        // contract here so both providers behave alike.
        if to.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        fs::rename(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_dir_marks_directories() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.csv"), b"a").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();

        let entries = LocalSession.list_dir(tmp.path()).unwrap();
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert_eq!(entry.is_directory, entry.name == "sub");
        }
    }

    #[test]
    fn rename_refuses_existing_target() {
        let tmp = tempfile::tempdir().unwrap();
        let from = tmp.path().join("a.csv");
        let to = tmp.path().join("b.csv");
        fs::write(&from, b"a").unwrap();
        fs::write(&to, b"b").unwrap();

        let err = LocalSession.rename(&from, &to).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        // Neither side was touched
        assert_eq!(fs::read(&from).unwrap(), b"a");
        assert_eq!(fs::read(&to).unwrap(), b"b");
    }

    #[test]
    fn rename_moves_when_target_is_free() {
        let tmp = tempfile::tempdir().unwrap();
        let from = tmp.path().join("a.csv");
        let to = tmp.path().join("moved.csv");
        fs::write(&from, b"payload").unwrap();

        LocalSession.rename(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"payload");
    }
}
