//! Dropsync library
//!
//! One-shot synchronization of a remote SFTP "read" directory into a local
//! download directory. The remote archive directory is the processed-files
//! ledger: a file is moved there only after its local copy is complete, so
//! every run picks up exactly the names not yet archived.

pub mod config;
pub mod logger;
pub mod session;
pub mod sftp;
pub mod sync;
