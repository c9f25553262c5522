//! SFTP-backed transfer session (ssh2 / libssh2)

use std::fs::File;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::Path;

use anyhow::{Context, Result};
use ssh2::Session;

use crate::config::ConnectSpec;
use crate::session::{DirEntry, TransferSession};

/// One authenticated SFTP session, held open across a whole run and dropped
/// once at the end.
pub struct SftpSession {
    sftp: ssh2::Sftp,
    // The SSH session owns the transport and must outlive the SFTP channel.
    _session: Session,
}

impl SftpSession {
    /// TCP connect, SSH handshake, password auth, SFTP subsystem.
    pub fn connect(spec: &ConnectSpec) -> Result<Self> {
        let addr = format!("{}:{}", spec.host, spec.port);
        let tcp =
            TcpStream::connect(&addr).with_context(|| format!("failed to connect to {addr}"))?;
        let mut session = Session::new().context("failed to create SSH session")?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .with_context(|| format!("SSH handshake with {addr} failed"))?;
        session
            .userauth_password(&spec.user, &spec.password)
            .with_context(|| format!("password authentication for {} failed", spec.user))?;
        let sftp = session.sftp().context("failed to start SFTP subsystem")?;
        Ok(Self {
            sftp,
            _session: session,
        })
    }
}

fn sftp_err(err: ssh2::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

impl TransferSession for SftpSession {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let listing = self.sftp.readdir(dir).map_err(sftp_err)?;
        let mut entries = Vec::with_capacity(listing.len());
        for (path, stat) in listing {
            let Some(name) = path.file_name() else {
                continue;
            };
            entries.push(DirEntry {
                name: name.to_string_lossy().into_owned(),
                size: stat.size.unwrap_or(0),
                is_directory: stat.is_dir(),
            });
        }
        Ok(entries)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let file = self.sftp.open(path).map_err(sftp_err)?;
        Ok(Box::new(file))
    }

    fn create_write(&self, path: &Path) -> io::Result<Box<dyn Write>> {
        // Downloads land on the local filesystem. Create/truncate so a
        // partial file from an interrupted run is overwritten on retry.
        Ok(Box::new(File::create(path)?))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        // No overwrite flags: an existing target is a failure, surfaced to
        // the caller as an archive error.
        self.sftp.rename(from, to, None).map_err(sftp_err)
    }
}
