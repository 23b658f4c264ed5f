//! Document Splitting
//!
//! Concatenated OpenAPI files often carry several documents back to back with
//! no `---` separator between them. Each line starting with `openapi:` at
//! column 0 opens a new fragment; every fragment is then parsed as a YAML
//! stream, so `---` separators inside a fragment still work.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::diagnostics::Diagnostics;
use crate::document::shape_name;
use crate::error::{Result, SpecError};

static DOCUMENT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\x{FEFF}?openapi:").expect("document start pattern is valid"));

/// A slice of the input text that is parsed on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// Position in discovery order (0-based)
    pub index: usize,
    /// Fragment text with surrounding newlines trimmed
    pub text: &'a str,
}

/// Documents recovered from an input text
#[derive(Debug, Default)]
pub struct ParsedDocuments {
    /// Every parsed document, in discovery order
    pub documents: Vec<Value>,
    /// Number of fragments scanned
    pub fragment_count: usize,
    /// Fragments skipped because they failed to parse
    pub diagnostics: Diagnostics,
}

/// Partition `text` into independently parseable fragments.
///
/// Text before the first detected start (blank lines, a byte-order mark)
/// stays with the first fragment. Without any detected start the whole text
/// is one fragment.
pub fn split_fragments(text: &str) -> Vec<Fragment<'_>> {
    let starts: Vec<usize> = DOCUMENT_START.find_iter(text).map(|m| m.start()).collect();
    if starts.is_empty() {
        return vec![Fragment { index: 0, text: text.trim_matches('\n') }];
    }

    let mut fragments = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let begin = if i == 0 { 0 } else { start };
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        fragments.push(Fragment {
            index: i,
            text: text[begin..end].trim_matches('\n'),
        });
    }
    fragments
}

/// Parse one fragment as a YAML stream, dropping empty documents
pub fn parse_fragment(text: &str) -> std::result::Result<Vec<Value>, serde_yaml::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut documents = Vec::new();
    for deserializer in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(deserializer)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Parse every fragment, skipping (and recording) the ones that fail
pub fn parse_fragments(fragments: &[Fragment<'_>]) -> ParsedDocuments {
    let mut parsed = ParsedDocuments {
        fragment_count: fragments.len(),
        ..ParsedDocuments::default()
    };

    for fragment in fragments {
        match parse_fragment(fragment.text) {
            Ok(docs) => {
                debug!(fragment = fragment.index, documents = docs.len(), "parsed fragment");
                parsed.documents.extend(docs);
            }
            Err(e) => {
                warn!(fragment = fragment.index, error = %e, "skipping fragment that failed to parse");
                parsed.diagnostics.fragment_parse_failed(fragment.index, &e.to_string());
            }
        }
    }

    parsed
}

/// Split and parse `text`; fails only when no document parses at all
pub fn split_documents(text: &str) -> Result<ParsedDocuments> {
    let fragments = split_fragments(text);
    let parsed = parse_fragments(&fragments);
    if parsed.documents.is_empty() {
        return Err(SpecError::NoDocuments { fragments: fragments.len() });
    }
    Ok(parsed)
}

/// Parse `text` as one standalone document whose root must be a mapping.
///
/// An empty text reads as an empty mapping.
pub fn parse_document(text: &str) -> Result<Value> {
    match serde_yaml::from_str::<Value>(text)? {
        Value::Null => Ok(Value::Mapping(Default::default())),
        doc @ Value::Mapping(_) => Ok(doc),
        other => Err(SpecError::InvalidFormat(format!(
            "expected a mapping at the document root, found {}",
            shape_name(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_document_is_one_fragment() {
        let text = "openapi: 3.0.3\ninfo:\n  title: A\n";
        let fragments = split_fragments(text);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "openapi: 3.0.3\ninfo:\n  title: A");
    }

    #[test]
    fn test_no_header_keeps_whole_text() {
        let fragments = split_fragments("info:\n  title: A\n");
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "info:\n  title: A");
    }

    #[test]
    fn test_concatenated_documents_split_on_header() {
        let text = "openapi: 3.0.3\npaths: {}\nopenapi: 3.0.3\ncomponents: {}\n";
        let fragments = split_fragments(text);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "openapi: 3.0.3\npaths: {}");
        assert_eq!(fragments[1].text, "openapi: 3.0.3\ncomponents: {}");
        assert_eq!(fragments[1].index, 1);
    }

    #[test]
    fn test_leading_content_stays_with_first_fragment() {
        let text = "\n\n# generated\nopenapi: 3.0.3\npaths: {}\nopenapi: 3.0.3\n";
        let fragments = split_fragments(text);
        assert_eq!(fragments.len(), 2);
        assert!(fragments[0].text.starts_with("# generated"));
    }

    #[test]
    fn test_byte_order_mark_stays_with_first_fragment() {
        let text = "\u{feff}openapi: 3.0.3\npaths: {/a: {}}\nopenapi: 3.0.3\npaths: {/b: {}}\n";
        let fragments = split_fragments(text);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "\u{feff}openapi: 3.0.3\npaths: {/a: {}}");
        assert_eq!(fragments[1].text, "openapi: 3.0.3\npaths: {/b: {}}");

        let parsed = split_documents(text).unwrap();
        assert_eq!(parsed.documents.len(), 2);
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_indented_openapi_key_is_not_a_header() {
        let text = "openapi: 3.0.3\ninfo:\n  openapi: nested\n";
        assert_eq!(split_fragments(text).len(), 1);
    }

    #[test]
    fn test_fragment_with_separators_yields_several_documents() {
        let docs = parse_fragment("openapi: 3.0.3\n---\npaths: {}\n---\n").unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_bad_fragment_is_skipped() {
        let text = "openapi: 3.0.3\npaths: {}\nopenapi: [unclosed\n";
        let parsed = split_documents(text).unwrap();
        assert_eq!(parsed.documents.len(), 1);
        assert_eq!(parsed.fragment_count, 2);
        assert_eq!(parsed.diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_nothing_parses_is_fatal() {
        let err = split_documents("openapi: [unclosed\n").unwrap_err();
        assert!(matches!(err, SpecError::NoDocuments { fragments: 1 }));
    }

    #[test]
    fn test_parse_document_requires_mapping_root() {
        assert!(parse_document("openapi: 3.0.3").unwrap().is_mapping());
        assert!(parse_document("").unwrap().is_mapping());
        assert!(matches!(parse_document("- a\n- b"), Err(SpecError::InvalidFormat(_))));
        assert!(matches!(parse_document("a: [unclosed"), Err(SpecError::Yaml(_))));
    }

    #[test]
    fn test_empty_input_is_fatal() {
        assert!(matches!(split_documents("\n\n"), Err(SpecError::NoDocuments { .. })));
    }
}
