use anyhow::Result;
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Run-event sink. Default methods are no-ops so implementations only pick
/// up the events they care about.
pub trait Logger: Send + Sync {
    fn run_start(&self, _read_dir: &Path, _archive_dir: &Path) {}
    fn skip_dir(&self, _name: &str) {}
    fn new_files(&self, _count: usize) {}
    fn download_done(&self, _name: &str, _bytes: u64) {}
    fn archived(&self, _name: &str) {}
    fn error(&self, _msg: &str) {}
    fn done(&self, _files: u64, _bytes: u64, _seconds: f64) {}
    /// Stage tracing, emitted only when verbose is on
    fn trace(&self, _msg: &str) {}
}

pub struct NoopLogger;
impl Logger for NoopLogger {}

/// Appends timestamped lines to a log file. Verbosity is fixed at
/// construction; nothing reaches for global state.
pub struct TextLogger {
    file: Mutex<File>,
    verbose: bool,
}

impl TextLogger {
    pub fn new<P: AsRef<Path>>(path: P, verbose: bool) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(f),
            verbose,
        })
    }

    fn line(&self, s: &str) {
        if let Ok(mut f) = self.file.lock() {
            let _ = writeln!(f, "[{}] {}", Utc::now().to_rfc3339(), s);
        }
    }
}

impl Logger for TextLogger {
    fn run_start(&self, read_dir: &Path, archive_dir: &Path) {
        self.line(&format!(
            "START read={} archive={}",
            read_dir.display(),
            archive_dir.display()
        ));
    }
    fn skip_dir(&self, name: &str) {
        if self.verbose {
            self.line(&format!("SKIP dir={name}"));
        }
    }
    fn new_files(&self, count: usize) {
        self.line(&format!("DIFF new={count}"));
    }
    fn download_done(&self, name: &str, bytes: u64) {
        self.line(&format!("DOWNLOAD name={name} bytes={bytes}"));
    }
    fn archived(&self, name: &str) {
        self.line(&format!("ARCHIVE name={name}"));
    }
    fn error(&self, msg: &str) {
        self.line(&format!("ERROR {msg}"));
    }
    fn done(&self, files: u64, bytes: u64, seconds: f64) {
        self.line(&format!("DONE files={files} bytes={bytes} seconds={seconds:.3}"));
    }
    fn trace(&self, msg: &str) {
        if self.verbose {
            self.line(&format!("TRACE {msg}"));
        }
    }
}
