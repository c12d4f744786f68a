//! Per-row parse failures.
//!
//! These never abort a run; a failed row is dropped and shows up only in
//! [`PipelineStats::discarded`](crate::PipelineStats::discarded).

use std::num::ParseFloatError;
use thiserror::Error;

/// Why a row failed to decode. Closed set; [`ParseErrorKind::as_str`] is the wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParseErrorKind {
    EmptyIpAddress,
    InvalidIpAddress,
    InvalidData,
    EmptyLatitude,
    EmptyLongitude,
    InvalidLatitude,
    InvalidLongitude,
    InvalidMysteryValue,
}

impl ParseErrorKind {
    /// Every kind, in the order the parser checks for them.
    pub const ALL: [ParseErrorKind; 8] = [
        ParseErrorKind::EmptyIpAddress,
        ParseErrorKind::InvalidIpAddress,
        ParseErrorKind::InvalidData,
        ParseErrorKind::EmptyLatitude,
        ParseErrorKind::EmptyLongitude,
        ParseErrorKind::InvalidLatitude,
        ParseErrorKind::InvalidLongitude,
        ParseErrorKind::InvalidMysteryValue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorKind::EmptyIpAddress => "empty_ip_address",
            ParseErrorKind::InvalidIpAddress => "invalid_ip_address",
            ParseErrorKind::InvalidData => "invalid_data",
            ParseErrorKind::EmptyLatitude => "empty_latitude",
            ParseErrorKind::EmptyLongitude => "empty_longitude",
            ParseErrorKind::InvalidLatitude => "invalid_latitude",
            ParseErrorKind::InvalidLongitude => "invalid_longitude",
            ParseErrorKind::InvalidMysteryValue => "invalid_mystery_value",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified row failure with the offending detail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("empty_ip_address")]
    EmptyIpAddress,

    #[error("invalid_ip_address: {0:?}")]
    InvalidIpAddress(String),

    /// Column count is not 7 after the quoted-delimiter repair.
    #[error("invalid_data: expected 7 columns, found {0}")]
    InvalidData(usize),

    #[error("empty_latitude")]
    EmptyLatitude,

    #[error("empty_longitude")]
    EmptyLongitude,

    #[error("invalid_latitude: {value:?}: {source}")]
    InvalidLatitude {
        value: String,
        source: ParseFloatError,
    },

    #[error("invalid_longitude: {value:?}: {source}")]
    InvalidLongitude {
        value: String,
        source: ParseFloatError,
    },

    #[error("invalid_mystery_value: {0:?}")]
    InvalidMysteryValue(String),
}

impl RowError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            RowError::EmptyIpAddress => ParseErrorKind::EmptyIpAddress,
            RowError::InvalidIpAddress(_) => ParseErrorKind::InvalidIpAddress,
            RowError::InvalidData(_) => ParseErrorKind::InvalidData,
            RowError::EmptyLatitude => ParseErrorKind::EmptyLatitude,
            RowError::EmptyLongitude => ParseErrorKind::EmptyLongitude,
            RowError::InvalidLatitude { .. } => ParseErrorKind::InvalidLatitude,
            RowError::InvalidLongitude { .. } => ParseErrorKind::InvalidLongitude,
            RowError::InvalidMysteryValue(_) => ParseErrorKind::InvalidMysteryValue,
        }
    }
}
