//! Extra Specs Text Parsing
//!
//! Textarea convention for key/value metadata: one entry per line (or
//! `;`-separated). `key=value` sets a key, a bare `key` unsets it.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Longest key or value accepted
pub const MAX_META_LENGTH: usize = 255;

/// Parsed set/unset request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraSpecsUpdate {
    /// Keys to set, last occurrence wins
    pub set: BTreeMap<String, String>,
    /// Keys to unset, in first-seen order without duplicates
    pub unset: Vec<String>,
}

impl ExtraSpecsUpdate {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }
}

fn strip(s: &str) -> &str {
    s.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
}

/// Parse textarea input into keys to set and keys to unset
///
/// Blank segments are skipped. Malformed segments produce an
/// [`Error::Validation`] naming the offending text.
pub fn parse_str_meta(text: &str) -> Result<ExtraSpecsUpdate> {
    let mut update = ExtraSpecsUpdate::default();

    for raw in text.split(|c| c == '\n' || c == ';') {
        let segment = strip(raw);
        if segment.is_empty() {
            continue;
        }

        match segment.split_once('=') {
            Some((key, value)) => {
                let (key, value) = (strip(key), strip(value));
                if key.is_empty() {
                    return Err(Error::invalid(format!("Key is missing in '{}'.", segment)));
                }
                if value.is_empty() {
                    return Err(Error::invalid(format!(
                        "Value for key '{}' is empty. Use a bare key to unset it.",
                        key
                    )));
                }
                if key.len() > MAX_META_LENGTH || value.len() > MAX_META_LENGTH {
                    return Err(Error::invalid(
                        "All keys and values must be in range from 1 to 255.",
                    ));
                }
                if key.contains(char::is_whitespace) {
                    return Err(Error::invalid(format!(
                        "Keys should not contain spaces. Error in '{}'.",
                        segment
                    )));
                }
                update.set.insert(key.to_string(), value.to_string());
            }
            None => {
                if segment.len() > MAX_META_LENGTH {
                    return Err(Error::invalid(format!(
                        "Key '{}' has improper length.",
                        segment
                    )));
                }
                if segment.contains(char::is_whitespace) {
                    return Err(Error::invalid(format!(
                        "Key can not contain spaces. See string '{}'.",
                        segment
                    )));
                }
                if !update.unset.iter().any(|k| k == segment) {
                    update.unset.push(segment.to_string());
                }
            }
        }
    }

    if let Some(key) = update.unset.iter().find(|k| update.set.contains_key(*k)) {
        return Err(Error::invalid(format!(
            "Key '{}' can not be both set and unset.",
            key
        )));
    }

    Ok(update)
}

/// Render a spec map back into textarea form
pub fn format_extra_specs(specs: &BTreeMap<String, String>) -> String {
    specs
        .iter()
        .map(|(k, v)| format!("{}={}\r\n", k, v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pairs_only() {
        let update = parse_str_meta("a=1\nb=2").unwrap();
        assert_eq!(update.set, map(&[("a", "1"), ("b", "2")]));
        assert!(update.unset.is_empty());
    }

    #[test]
    fn test_bare_key_is_unset() {
        let update = parse_str_meta("a=1\r\nstale_key\r\n").unwrap();
        assert_eq!(update.set, map(&[("a", "1")]));
        assert_eq!(update.unset, vec!["stale_key".to_string()]);
    }

    #[test]
    fn test_semicolons_and_blank_segments() {
        let update = parse_str_meta(" a = 1 ;; \n\n  b=2;c ").unwrap();
        assert_eq!(update.set, map(&[("a", "1"), ("b", "2")]));
        assert_eq!(update.unset, vec!["c".to_string()]);
        assert!(parse_str_meta("   \n ; \r\n").unwrap().is_empty());
    }

    #[test]
    fn test_last_duplicate_wins() {
        let update = parse_str_meta("a=1\na=2\nb\nb").unwrap();
        assert_eq!(update.set, map(&[("a", "2")]));
        assert_eq!(update.unset, vec!["b".to_string()]);
    }

    #[test]
    fn test_value_keeps_later_equals_and_quotes_are_stripped() {
        let update = parse_str_meta("\"capabilities:opt\"='x=y'").unwrap();
        assert_eq!(update.set, map(&[("capabilities:opt", "x=y")]));
    }

    #[test]
    fn test_malformed_segments() {
        let err = parse_str_meta("a=").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Value for key 'a' is empty"));

        let err = parse_str_meta("=1").unwrap_err();
        assert!(err.to_string().contains("Key is missing"));

        let err = parse_str_meta("my key=1").unwrap_err();
        assert!(err.to_string().contains("Keys should not contain spaces"));

        let err = parse_str_meta("my key").unwrap_err();
        assert!(err.to_string().contains("Key can not contain spaces"));

        let long = "k".repeat(MAX_META_LENGTH + 1);
        assert!(parse_str_meta(&format!("{}=v", long)).is_err());
        assert!(parse_str_meta(&long).is_err());
    }

    #[test]
    fn test_set_and_unset_conflict() {
        let err = parse_str_meta("a=1\na").unwrap_err();
        assert_eq!(err.to_string(), "Key 'a' can not be both set and unset.");
    }

    #[test]
    fn test_format_round_trips_through_parser() {
        let specs = map(&[("driver_handles_share_servers", "True"), ("snapshot_support", "False")]);
        let text = format_extra_specs(&specs);
        assert_eq!(
            text,
            "driver_handles_share_servers=True\r\nsnapshot_support=False\r\n"
        );
        assert_eq!(parse_str_meta(&text).unwrap().set, specs);
    }
}
