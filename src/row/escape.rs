//! Quote-aware delimiter repair.

use crate::utils::config::RowGrammar;

/// Replace every delimiter inside a `"..."` or `'...'` span with [`RowGrammar::SENTINEL`].
///
/// Single pass. A span opens on either quote character and closes only on the same one;
/// the other quote character inside it is literal. Quotes stay in the output. A quote with no
/// closing partner later in the line is copied as a literal and scanning goes on after it, so
/// a stray apostrophe does not hide the spans that follow.
///
/// Idempotent: once no delimiter remains inside a span, a second pass changes nothing.
pub fn escape_quoted_delimiters(line: &str) -> String {
    // Quotes are ASCII, so the byte after one is a char boundary.
    let closes_later = |quote: char, at: usize| line[at + 1..].contains(quote);

    let mut out = String::with_capacity(line.len());
    let mut open: Option<char> = None;
    for (i, c) in line.char_indices() {
        match open {
            None => {
                if RowGrammar::QUOTES.contains(&c) && closes_later(c, i) {
                    open = Some(c);
                }
                out.push(c);
            }
            Some(quote) if c == quote => {
                open = None;
                out.push(c);
            }
            Some(_) if c == RowGrammar::DELIMITER => out.push(RowGrammar::SENTINEL),
            Some(_) => out.push(c),
        }
    }
    out
}

/// Undo a field's quoting: drop quote characters and turn sentinels back into delimiters.
///
/// A sentinel that was already in the data is indistinguishable from an escaped delimiter
/// and is restored too (`Guinea-Bissau` becomes `Guinea,Bissau`).
pub fn unescape_field(field: &str) -> String {
    field
        .chars()
        .filter(|c| !RowGrammar::QUOTES.contains(c))
        .map(|c| {
            if c == RowGrammar::SENTINEL {
                RowGrammar::DELIMITER
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_double_and_single_quoted_spans() {
        let line = r#"152.159.31.208,GA,"Virgin Islands, British",'Lake, Wavatown',12.96,-56.65,1878158074"#;
        assert_eq!(
            escape_quoted_delimiters(line),
            r#"152.159.31.208,GA,"Virgin Islands- British",'Lake- Wavatown',12.96,-56.65,1878158074"#
        );
    }

    #[test]
    fn leaves_unquoted_fields_alone() {
        let line = r#"152.159.31.208,GA,"Virgin Islands, British",Lake Wavatown,12.96,-56.65,1"#;
        assert_eq!(
            escape_quoted_delimiters(line),
            r#"152.159.31.208,GA,"Virgin Islands- British",Lake Wavatown,12.96,-56.65,1"#
        );
    }

    #[test]
    fn other_quote_inside_span_is_literal() {
        assert_eq!(
            escape_quoted_delimiters(r#"a,"Cote d'Ivoire, North",b"#),
            r#"a,"Cote d'Ivoire- North",b"#
        );
    }

    #[test]
    fn unterminated_quote_is_not_a_span() {
        let line = r#"a,"open, never closed,b"#;
        assert_eq!(escape_quoted_delimiters(line), line);
    }

    #[test]
    fn unterminated_quote_after_closed_span() {
        assert_eq!(
            escape_quoted_delimiters(r#"'x,y',"tail,z"#),
            r#"'x-y',"tail,z"#
        );
    }

    #[test]
    fn stray_quote_does_not_hide_later_spans() {
        assert_eq!(
            escape_quoted_delimiters(r#"1.2.3.4,CI,Cote d'Ivoire,"Abidjan, North",5.3,-4.0,1"#),
            r#"1.2.3.4,CI,Cote d'Ivoire,"Abidjan- North",5.3,-4.0,1"#
        );
        assert_eq!(
            escape_quoted_delimiters(r#"a,"b,'c,d',e"#),
            r#"a,"b,'c-d',e"#
        );
    }

    #[test]
    fn multibyte_text_survives() {
        assert_eq!(
            escape_quoted_delimiters("1,\"Zürich, Ost\",ß"),
            "1,\"Zürich- Ost\",ß"
        );
    }

    #[test]
    fn unescape_strips_quotes_and_restores_delimiters() {
        assert_eq!(unescape_field(r#""Virgin Islands- British""#), "Virgin Islands, British");
        assert_eq!(unescape_field("'Lake- Wavatown'"), "Lake, Wavatown");
        assert_eq!(unescape_field("Nepal"), "Nepal");
    }

    #[test]
    fn unescape_turns_literal_sentinel_into_delimiter() {
        assert_eq!(unescape_field("Guinea-Bissau"), "Guinea,Bissau");
    }
}
