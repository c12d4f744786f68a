//! Persistence collaborator: store / store-many / retrieve, keyed by IP.

mod memory;
mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

use std::net::IpAddr;
use thiserror::Error;

use crate::GeoRecord;

/// Error types for repository operations.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A record with this IP is already stored.
    #[error("record for {0} already exists")]
    AlreadyExists(IpAddr),

    #[error("no record for {0}")]
    NotFound(IpAddr),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("repository lock poisoned")]
    Poisoned,
}

/// Record store. One record per IP: storing an IP twice fails with [`RepositoryError::AlreadyExists`].
pub trait Repository {
    fn store(&self, record: &GeoRecord) -> Result<(), RepositoryError>;

    /// Store a batch under the same uniqueness rule. Whether records before a conflict are kept
    /// is up to the implementation.
    fn store_many(&self, records: &[GeoRecord]) -> Result<(), RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] when nothing is stored for `ip`.
    fn retrieve(&self, ip: IpAddr) -> Result<GeoRecord, RepositoryError>;
}
