//! Delimited list codecs for single-column list storage.
//!
//! # Responsibility
//! - Encode ordered string lists as one quoted, comma-joined CSV record.
//! - Decode stored records back into ordered lists, preserving duplicates.
//! - Encode/decode unquoted integer code lists.
//!
//! # Invariants
//! - `decode_list("")` is empty and `encode_list(&[])` is `""`.
//! - `decode_list(&encode_list(xs)) == xs` for every string list.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;

const QUOTE: char = '"';
const SEPARATOR: char = ',';

/// Decodes one CSV record into its fields.
///
/// Parsing is lenient: characters after a closing quote are appended to the
/// current field, and a quote inside an unquoted field is kept literally.
pub fn decode_list(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();
    let mut at_field_start = true;
    let mut in_quotes = false;

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    chars.next();
                    field.push(QUOTE);
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }

        match ch {
            SEPARATOR => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            QUOTE if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            other => {
                field.push(other);
                at_field_start = false;
            }
        }
    }

    fields.push(field);
    fields
}

/// Decodes an optional stored record; `None` behaves like empty text.
pub fn decode_optional_list(text: Option<&str>) -> Vec<String> {
    text.map(decode_list).unwrap_or_default()
}

/// Encodes values as one CSV record with every field quoted.
pub fn encode_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|value| {
            let escaped = value.as_ref().replace(QUOTE, "\"\"");
            format!("{QUOTE}{escaped}{QUOTE}")
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Error raised when a stored integer code list is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeListError {
    pub value: String,
    pub source: ParseIntError,
}

impl Display for CodeListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid code `{}` in code list: {}", self.value, self.source)
    }
}

impl Error for CodeListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Joins integer codes with commas, without quoting.
pub fn encode_codes(codes: &[u32]) -> String {
    codes
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a comma-joined integer code list. Empty text yields no codes.
pub fn decode_codes(text: &str) -> Result<Vec<u32>, CodeListError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    text.split(SEPARATOR)
        .map(|raw| {
            let trimmed = raw.trim();
            trimmed.parse::<u32>().map_err(|source| CodeListError {
                value: trimmed.to_string(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{decode_codes, decode_list, decode_optional_list, encode_codes, encode_list};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn empty_text_decodes_to_empty_list() {
        assert!(decode_list("").is_empty());
        assert!(decode_optional_list(None).is_empty());
    }

    #[test]
    fn empty_list_encodes_to_empty_text() {
        let encoded = encode_list::<&str>(&[]);
        assert_eq!(encoded, "");
        assert!(decode_list(&encoded).is_empty());
    }

    #[test]
    fn encode_quotes_every_field() {
        assert_eq!(encode_list(&["a", "b c"]), r#""a","b c""#);
    }

    #[test]
    fn round_trip_preserves_order_duplicates_and_punctuation() {
        let values = strings(&["event", "say \"hi\"", "a,b", "", "event", "ünïcode"]);
        assert_eq!(decode_list(&encode_list(&values)), values);
    }

    #[test]
    fn single_empty_field_is_distinct_from_empty_list() {
        let encoded = encode_list(&[""]);
        assert_eq!(encoded, "\"\"");
        assert_eq!(decode_list(&encoded), strings(&[""]));
    }

    #[test]
    fn decode_accepts_unquoted_and_mixed_fields() {
        assert_eq!(decode_list("a,\"b\",c"), strings(&["a", "b", "c"]));
        assert_eq!(decode_list("a,"), strings(&["a", ""]));
        assert_eq!(decode_list("ab\"c"), strings(&["ab\"c"]));
        assert_eq!(decode_list("\"ab\"c,d"), strings(&["abc", "d"]));
    }

    #[test]
    fn codes_join_without_quotes_and_parse_back() {
        assert_eq!(encode_codes(&[3, 10, 3]), "3,10,3");
        assert_eq!(decode_codes("3,10,3").unwrap(), vec![3, 10, 3]);
        assert!(decode_codes("").unwrap().is_empty());
    }

    #[test]
    fn malformed_codes_are_rejected() {
        let err = decode_codes("1,x").unwrap_err();
        assert_eq!(err.value, "x");
    }
}
