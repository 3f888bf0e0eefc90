//! Driven port for loading and persisting the social store.
//!
//! Implementations perform blocking I/O; async callers run them on
//! `tokio::task::spawn_blocking`.

use crate::domain::StoreSnapshot;

use super::define_port_error;

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RecordStoreError {
        /// The data directory could not be opened or created.
        Unavailable { message: String } => "record store unavailable: {message}",
        /// A record could not be read or decoded.
        Corrupt { path: String, message: String } => "corrupt record at {path}: {message}",
        /// A record could not be written.
        Write { path: String, message: String } => "failed to write {path}: {message}",
    }
}

/// Outcome of a flush. Individual write failures are logged by the adapter
/// and counted here; they do not abort the flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub written: usize,
    pub failed: usize,
}

#[cfg_attr(test, mockall::automock)]
pub trait RecordStore: Send + Sync {
    /// Load every account found on disk.
    ///
    /// Unreadable per-user records are skipped with a log entry; only a
    /// missing or unusable root fails the load.
    fn load(&self) -> Result<StoreSnapshot, RecordStoreError>;

    /// Persist every account in `snapshot` plus the identity index.
    fn save(&self, snapshot: &StoreSnapshot) -> Result<FlushReport, RecordStoreError>;
}

/// Record store that keeps nothing. Used when persistence is not wanted,
/// such as handler tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRecordStore;

impl RecordStore for NoOpRecordStore {
    fn load(&self) -> Result<StoreSnapshot, RecordStoreError> {
        Ok(StoreSnapshot::default())
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<FlushReport, RecordStoreError> {
        Ok(FlushReport {
            written: snapshot.len(),
            failed: 0,
        })
    }
}
