//! CLI command handlers: import (default store, --dry-run parse only), check, lookup.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::check::check_file;
use crate::engine::arg_parser::{Cli, Commands, ParseArgs};
use crate::engine::progress::setup_progress;
use crate::utils::config::PackagePaths;
use crate::utils::geoingest_toml::{apply_file_to_opts, load_geoingest_toml};
use crate::utils::setup_logging;
use crate::{IngestOpts, Ingestor, Opts, RepositoryError, SqliteRepository, StoreParams};

/// Build Opts: `.geoingest.toml` in `config_dir` first, then CLI flags on top.
fn setup_opts(cli: &Cli, config_dir: Option<&Path>, parse: Option<&ParseArgs>) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = config_dir.and_then(load_geoingest_toml) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(db) = &cli.db {
        opts.db_path = Some(db.clone());
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    if let Some(parse) = parse {
        if parse.workers.is_some() {
            opts.workers = parse.workers;
        }
        if let Some(v) = parse.ordered {
            opts.ordered = v;
        }
    }
    setup_logging(opts.verbose);
    opts
}

/// Directory holding `file` (`.` for a bare filename).
fn parent_dir(file: &Path) -> &Path {
    match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// DB path: explicit (flag or file) → `GEOINGEST_DB` (process env or `.env`) → `<dir>/.geoingest`.
pub fn resolve_db_path(opts: &Opts, dir: &Path) -> PathBuf {
    if let Some(p) = &opts.db_path {
        return p.clone();
    }
    let paths = PackagePaths::get();
    let _ = dotenvy::dotenv();
    match std::env::var(paths.db_env_key()) {
        Ok(s) if !s.trim().is_empty() => PathBuf::from(s.trim()),
        _ => dir.join(paths.db_filename()),
    }
}

/// Process exit status for a failed command: 2 when a lookup found no record, 1 otherwise.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RepositoryError>() {
        Some(RepositoryError::NotFound(_)) => 2,
        _ => 1,
    }
}

/// Run the parsed command.
pub fn handle_run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Import {
            file,
            parse,
            dry_run,
            continue_on_error,
        } => {
            let mut opts = setup_opts(cli, Some(parent_dir(file)), Some(parse));
            opts.dry_run = *dry_run;
            if let Some(v) = continue_on_error {
                opts.continue_on_error = *v;
            }
            handle_import(file, &opts)
        }
        Commands::Check { file, parse } => {
            let opts = setup_opts(cli, Some(parent_dir(file)), Some(parse));
            check_file(file, &IngestOpts::from(&opts))?;
            Ok(())
        }
        Commands::Lookup { ip } => {
            let opts = setup_opts(cli, None, None);
            handle_lookup(*ip, &opts)
        }
    }
}

fn handle_import(file: &Path, opts: &Opts) -> Result<()> {
    if opts.dry_run {
        warn!("RUNNING IN DRY-RUN MODE. NOTHING WILL BE WRITTEN TO THE DATABASE.");
        check_file(file, &IngestOpts::from(opts))?;
        return Ok(());
    }

    let db_path = resolve_db_path(opts, parent_dir(file));
    debug!("Database: {}", db_path.display());
    let ingestor = Ingestor::new(SqliteRepository::open(&db_path)?);

    let (records, stats) = ingestor.parse_file(file, &IngestOpts::from(opts))?;
    info!("Parsed {}", stats);

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        cancel_requested_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let (_bar, on_batch) = setup_progress(opts.verbose, records.len());
    let store_stats = ingestor.store_records(
        &records,
        &StoreParams {
            policy: opts.store_policy(),
            on_batch_progress: on_batch,
            cancel_check: Some(cancel_requested),
        },
    )?;

    info!(
        "Stored {} records into {}",
        store_stats.stored,
        db_path.display()
    );
    if store_stats.failed > 0 {
        warn!("{} records were rejected by the database", store_stats.failed);
    }
    Ok(())
}

fn handle_lookup(ip: IpAddr, opts: &Opts) -> Result<()> {
    let db_path = resolve_db_path(opts, Path::new("."));
    if !db_path.exists() {
        return Err(anyhow::anyhow!("database {} not found", db_path.display()));
    }
    let ingestor = Ingestor::new(SqliteRepository::open(&db_path)?);
    let record = ingestor.retrieve(ip)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&record).context("encode record")?
    );
    Ok(())
}
