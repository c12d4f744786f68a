//! Row grammar: quote-aware splitting, validation, and the per-row error vocabulary.

pub mod error;
pub mod escape;
pub mod parser;

pub use error::{ParseErrorKind, RowError};
pub use escape::{escape_quoted_delimiters, unescape_field};
pub use parser::{ParseOutcome, parse_mystery_value, parse_row, split_columns};
