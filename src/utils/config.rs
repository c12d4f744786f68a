//! Application configuration constants.
//! Grammar, tuning and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived paths: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    db_filename: String,
    config_filename: String,
    db_env_key: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache paths from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                db_filename: format!(".{pkg}"),
                config_filename: format!(".{pkg}.toml"),
                db_env_key: format!("{}_DB", pkg.to_uppercase()),
            }
        })
    }

    /// Default SQLite filename, created next to the imported CSV.
    pub fn db_filename(&self) -> &str {
        &self.db_filename
    }

    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable that overrides the default db path (e.g. `GEOINGEST_DB`).
    pub fn db_env_key(&self) -> &str {
        &self.db_env_key
    }
}

// ---- Row grammar ----

/// Row grammar: one fixed schema, one delimiter, one escape sentinel.
pub struct RowGrammar;

impl RowGrammar {
    /// Field separator.
    pub const DELIMITER: char = ',';
    /// Stand-in for delimiters found inside quoted spans. Restored to
    /// [`Self::DELIMITER`] in country/city, so a literal `-` there comes back as `,`.
    pub const SENTINEL: char = '-';
    /// `ip,country_code,country,city,latitude,longitude,mystery_value`
    pub const FIELD_COUNT: usize = 7;
    /// Characters that can open and close a quoted span.
    pub const QUOTES: [char; 2] = ['"', '\''];
}

// ---- Pipeline ----

/// Capacity of the parsed-record channel between parse workers and the aggregator.
/// Workers block on send only when the aggregator falls this far behind.
pub const RESULT_CHANNEL_CAP: usize = 50_000;

/// Thread limits used to derive a default chunk size.
/// Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Smallest chunk handed to a worker when the chunk size is derived.
    pub min_chunk: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 1,
            min_chunk: Self::MIN_CHUNK,
        }
    }
}

impl WorkerThreadLimits {
    pub const MIN_CHUNK: usize = 1_000;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }
}

// ---- Row source ----

/// File size above which the row source memory-maps the CSV instead of buffered reads (bytes). 100 MB.
pub const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Buffer size for reading CSVs below the mmap threshold (bytes). 1 MB.
pub const READ_BUFFER_SIZE: usize = 1024 * 1024;

// ---- Database ----

/// Batch size for store_many calls (balance transaction size vs round-trips).
pub const STORE_BATCH_SIZE: usize = 1000;
