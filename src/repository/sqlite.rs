//! SQLite-backed repository: schema, WAL tuning, unique inserts keyed by IP.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, Statement};
use std::net::IpAddr;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{Repository, RepositoryError};
use crate::GeoRecord;

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Use after PRAGMA journal_mode = WAL.
const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        "#;

/// Schema for the locations table. `ip_address` holds the canonical textual address.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS locations (
    ip_address TEXT PRIMARY KEY,
    country_code TEXT NOT NULL,
    country TEXT NOT NULL,
    city TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    mystery_value INTEGER NOT NULL
);
"#;

/// Plain INSERT: the primary key enforces one record per IP.
const INSERT_LOCATION_SQL: &str = "INSERT INTO locations \
    (ip_address, country_code, country, city, latitude, longitude, mystery_value) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

const SELECT_LOCATION_SQL: &str = "SELECT country_code, country, city, latitude, longitude, mystery_value \
    FROM locations WHERE ip_address = ?1";

/// [`Repository`] over one SQLite connection (serialized through a mutex).
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open or create the database at `path`, enable WAL, and ensure the schema.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("open database {}", path.display()))?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .context("enable WAL")?;
        conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
        conn.execute_batch(SCHEMA).context("create schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database with the same schema (no WAL pragmas needed).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        conn.execute_batch(SCHEMA).context("create schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize, RepositoryError> {
        let n: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))?;
        Ok(n.max(0) as usize)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn.lock().map_err(|_| RepositoryError::Poisoned)
    }
}

/// Execute one insert, mapping a primary-key violation to [`RepositoryError::AlreadyExists`].
fn execute_insert(stmt: &mut Statement<'_>, record: &GeoRecord) -> Result<(), RepositoryError> {
    let ip = record.ip();
    stmt.execute((
        ip.to_string(),
        record.country_code(),
        record.country(),
        record.city(),
        record.latitude(),
        record.longitude(),
        record.mystery_value(),
    ))
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            RepositoryError::AlreadyExists(ip)
        }
        other => RepositoryError::Sql(other),
    })?;
    Ok(())
}

fn record_from_row(ip: IpAddr, row: &Row<'_>) -> rusqlite::Result<GeoRecord> {
    Ok(GeoRecord::new(
        ip,
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

impl Repository for SqliteRepository {
    fn store(&self, record: &GeoRecord) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(INSERT_LOCATION_SQL)?;
        execute_insert(&mut stmt, record)
    }

    /// One transaction: a conflict anywhere rolls back the whole batch.
    fn store_many(&self, records: &[GeoRecord]) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_LOCATION_SQL)?;
            for record in records {
                execute_insert(&mut stmt, record)?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn retrieve(&self, ip: IpAddr) -> Result<GeoRecord, RepositoryError> {
        let ip = ip.to_canonical();
        let conn = self.lock()?;
        conn.query_row(SELECT_LOCATION_SQL, [ip.to_string()], |row| {
            record_from_row(ip, row)
        })
        .optional()?
        .ok_or(RepositoryError::NotFound(ip))
    }
}
