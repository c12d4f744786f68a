//! Row parser: one raw line → [`GeoRecord`] or the first [`RowError`] hit.
//!
//! Check order is fixed; for a malformed row the error that fires first is the one reported:
//! 1. split on the delimiter (repairing quoted delimiters when there are too many fields)
//! 2. empty ip → invalid ip → column count
//! 3. empty latitude → empty longitude
//! 4. latitude → longitude → mystery value
//! 5. country/city unescaped, country code taken verbatim

use std::net::IpAddr;

use super::error::RowError;
use super::escape::{escape_quoted_delimiters, unescape_field};
use crate::GeoRecord;
use crate::utils::config::RowGrammar;

/// Tagged result of parsing one row.
pub type ParseOutcome = Result<GeoRecord, RowError>;

/// Split a row into fields. The first split trims every field. If it yields more than
/// [`RowGrammar::FIELD_COUNT`] fields, the line is re-split after [`escape_quoted_delimiters`],
/// and those fields keep their surrounding whitespace (so ` 1.5` then fails as a latitude).
pub fn split_columns(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let columns: Vec<String> = split_fields(trimmed).map(|f| f.trim().to_string()).collect();
    if columns.len() > RowGrammar::FIELD_COUNT {
        return split_fields(&escape_quoted_delimiters(trimmed))
            .map(str::to_string)
            .collect();
    }
    columns
}

fn split_fields(line: &str) -> std::str::Split<'_, char> {
    line.split(RowGrammar::DELIMITER)
}

/// Parse one data row. Pure: the same line always gives the same outcome.
pub fn parse_row(line: &str) -> ParseOutcome {
    let columns = split_columns(line);

    let ip_text = columns[0].as_str();
    if ip_text.is_empty() {
        return Err(RowError::EmptyIpAddress);
    }
    let ip: IpAddr = ip_text
        .parse()
        .map_err(|_| RowError::InvalidIpAddress(ip_text.to_string()))?;

    if columns.len() != RowGrammar::FIELD_COUNT {
        return Err(RowError::InvalidData(columns.len()));
    }

    if columns[4].is_empty() {
        return Err(RowError::EmptyLatitude);
    }
    if columns[5].is_empty() {
        return Err(RowError::EmptyLongitude);
    }

    let latitude: f64 = columns[4]
        .parse()
        .map_err(|source| RowError::InvalidLatitude {
            value: columns[4].clone(),
            source,
        })?;
    let longitude: f64 = columns[5]
        .parse()
        .map_err(|source| RowError::InvalidLongitude {
            value: columns[5].clone(),
            source,
        })?;
    let mystery_value = parse_mystery_value(&columns[6])
        .ok_or_else(|| RowError::InvalidMysteryValue(columns[6].clone()))?;

    let mut columns = columns.into_iter();
    // ip already consumed above
    columns.next();
    let country_code = columns.next().unwrap_or_default();
    let country = unescape_field(&columns.next().unwrap_or_default());
    let city = unescape_field(&columns.next().unwrap_or_default());

    Ok(GeoRecord::new(
        ip,
        country_code,
        country,
        city,
        latitude,
        longitude,
        mystery_value,
    ))
}

/// Parse a signed 64-bit integer, detecting the base from its prefix:
/// `0x`/`0X` hex, `0o`/`0O` or a bare leading `0` octal, `0b`/`0B` binary, decimal otherwise.
/// An optional `+`/`-` comes first. Returns None on bad digits or overflow.
pub fn parse_mystery_value(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = split_radix_prefix(unsigned)?;
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = if digits.is_empty() {
        0
    } else {
        u64::from_str_radix(digits, radix).ok()?
    };
    let value = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };
    i64::try_from(value).ok()
}

/// (radix, digits after the prefix). Only a lone `0` may leave an empty digit string.
fn split_radix_prefix(text: &str) -> Option<(u32, &str)> {
    let bytes = text.as_bytes();
    match bytes {
        [] => None,
        [b'0', p, _, ..] if p.eq_ignore_ascii_case(&b'x') => Some((16, &text[2..])),
        [b'0', p, _, ..] if p.eq_ignore_ascii_case(&b'o') => Some((8, &text[2..])),
        [b'0', p, _, ..] if p.eq_ignore_ascii_case(&b'b') => Some((2, &text[2..])),
        [b'0', ..] => Some((8, &text[1..])),
        _ => Some((10, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_repairs_quoted_delimiters_only_when_needed() {
        let cols = split_columns(r#"1.2.3.4,GA,"Virgin Islands, British",City,1,2,3"#);
        assert_eq!(cols.len(), 7);
        assert_eq!(cols[2], r#""Virgin Islands- British""#);

        // Seven fields already: no repair, so the quoted field keeps its quotes and no sentinel.
        let cols = split_columns(r#"1.2.3.4,GA,"Nepal",City,1,2,3"#);
        assert_eq!(cols[2], r#""Nepal""#);
    }

    #[test]
    fn split_trims_line_and_fields() {
        let cols = split_columns("  1.2.3.4 , SI ,Nepal, Town ,1,2,3  ");
        assert_eq!(cols, ["1.2.3.4", "SI", "Nepal", "Town", "1", "2", "3"]);
    }

    #[test]
    fn repaired_split_keeps_field_whitespace() {
        let cols = split_columns(r#"1.2.3.4, GA, "A, B", City, 1.5, 2.5, 3"#);
        assert_eq!(cols, ["1.2.3.4", " GA", r#" "A- B""#, " City", " 1.5", " 2.5", " 3"]);
    }

    #[test]
    fn mystery_value_bases() {
        assert_eq!(parse_mystery_value("7823011346"), Some(7823011346));
        assert_eq!(parse_mystery_value("0x1F"), Some(31));
        assert_eq!(parse_mystery_value("0X1f"), Some(31));
        assert_eq!(parse_mystery_value("0o17"), Some(15));
        assert_eq!(parse_mystery_value("017"), Some(15));
        assert_eq!(parse_mystery_value("0b101"), Some(5));
        assert_eq!(parse_mystery_value("0"), Some(0));
        assert_eq!(parse_mystery_value("-42"), Some(-42));
        assert_eq!(parse_mystery_value("+42"), Some(42));
        assert_eq!(parse_mystery_value("-0x10"), Some(-16));
    }

    #[test]
    fn mystery_value_limits() {
        assert_eq!(parse_mystery_value("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_mystery_value("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_mystery_value("9223372036854775808"), None);
        assert_eq!(parse_mystery_value("99999999999999999999999"), None);
    }

    #[test]
    fn mystery_value_rejects_garbage() {
        for bad in ["", "-", "+", "0x", "08", "0b2", "12a", "1.5", "--1", "+-1", " 1", "1_000"] {
            assert_eq!(parse_mystery_value(bad), None, "{bad:?}");
        }
    }
}
