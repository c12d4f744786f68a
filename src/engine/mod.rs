//! Engine module: CLI parsing, command handlers, progress

pub mod arg_parser;
pub mod handlers;
pub mod progress;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands, ParseArgs};
pub use handlers::{exit_status, handle_run, resolve_db_path};
