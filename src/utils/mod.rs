pub mod config;
pub mod geoingest_toml;
pub mod logger;

pub use config::*;
pub use logger::setup_logging;
