use colored::{ColoredString, Colorize};
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Colored tag per level; info carries none.
fn level_tag(level: Level) -> Option<ColoredString> {
    match level {
        Level::Error => Some("ERROR".red().bold()),
        Level::Warn => Some("WARN".yellow()),
        Level::Info => None,
        Level::Debug => Some("DEBUG".dimmed()),
        Level::Trace => Some("TRACE".dimmed()),
    }
}

/// Init the global logger: dependencies at warn, this crate at info (debug when `verbose`).
/// Warnings, errors and verbose lines name their module. Later calls are ignored.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(move |buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            let show_target = verbose || record.level() <= Level::Warn;
            match (level_tag(record.level()), show_target) {
                (Some(tag), true) => writeln!(
                    buf,
                    "[{} {} {}] {}",
                    name,
                    tag,
                    record.target().white(),
                    record.args()
                ),
                (Some(tag), false) => writeln!(buf, "[{} {}] {}", name, tag, record.args()),
                (None, _) => writeln!(buf, "[{}] {}", name, record.args()),
            }
        })
        .try_init();
}
