//! Flat `key=value` property text
//!
//! Supports the subset of the `.properties` format that build tooling emits:
//! `#`/`!` comments, `=`, `:` or whitespace separators, backslash line
//! continuations and the usual escapes including `\uXXXX`.

use std::collections::HashMap;
use std::path::Path;

use crate::common::{Error, Result};

/// Parsed property set; later duplicates of a key win
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Read and parse a property file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::properties_read(path, e))?;
        Ok(Self::parse(&text))
    }

    /// Parse property text
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        let mut logical = String::new();
        let mut continuing = false;

        for line in text.lines() {
            let line = line.trim_start();

            if !continuing && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }

            if ends_with_continuation(line) {
                logical.push_str(&line[..line.len() - 1]);
                continuing = true;
                continue;
            }

            logical.push_str(line);
            continuing = false;

            let (key, value) = split_key_value(&logical);
            entries.insert(unescape(key), unescape(value));
            logical.clear();
        }

        // Trailing continuation at end of input
        if continuing && !logical.is_empty() {
            let (key, value) = split_key_value(&logical);
            entries.insert(unescape(key), unescape(value));
        }

        Self { entries }
    }

    /// Raw value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An odd number of trailing backslashes continues the line
fn ends_with_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Split a logical line at the first unescaped `=`, `:` or whitespace
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();
    if rest.starts_with('=') || rest.starts_with(':') {
        rest = rest[1..].trim_start();
    }
    (key, rest)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators() {
        let props = Properties::parse("a=1\nb:2\nc 3\nd = 4\ne\t:\t5\n");
        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some("4"));
        assert_eq!(props.get("e"), Some("5"));
        assert_eq!(props.len(), 5);
    }

    #[test]
    fn test_parse_comments_and_blank_lines() {
        let props = Properties::parse("# header\n\n   ! bang comment\nsut.host=example\n");
        assert_eq!(props.keys(), vec!["sut.host"]);
    }

    #[test]
    fn test_value_keeps_inner_separators() {
        let props = Properties::parse("url=http://host:8080/a=b\n");
        assert_eq!(props.get("url"), Some("http://host:8080/a=b"));
    }

    #[test]
    fn test_key_without_value() {
        let props = Properties::parse("sut.indexation\n");
        assert_eq!(props.get("sut.indexation"), Some(""));
    }

    #[test]
    fn test_line_continuation() {
        let props = Properties::parse("list=one, \\\n    two, \\\n    three\nnext=x\n");
        assert_eq!(props.get("list"), Some("one, two, three"));
        assert_eq!(props.get("next"), Some("x"));
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let props = Properties::parse("path=C:\\\\drivers\\\\\nother=1\n");
        assert_eq!(props.get("path"), Some("C:\\drivers\\"));
        assert_eq!(props.get("other"), Some("1"));
    }

    #[test]
    fn test_escapes() {
        let props = Properties::parse("key\\=with\\:sep=tab\\there\nunicode=caf\\u00e9\n");
        assert_eq!(props.get("key=with:sep"), Some("tab\there"));
        assert_eq!(props.get("unicode"), Some("café"));
    }

    #[test]
    fn test_malformed_unicode_escape_is_kept() {
        let props = Properties::parse("bad=\\uZZ\n");
        assert_eq!(props.get("bad"), Some("\\uZZ"));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let props = Properties::parse("k=1\nk=2\n");
        assert_eq!(props.get("k"), Some("2"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let props = Properties::parse("a=1\r\nb=2\r\n");
        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Properties::load(Path::new("/nonexistent/run.properties")).unwrap_err();
        assert!(matches!(err, Error::PropertiesRead { .. }));
    }
}
