//! Document Tree Access
//!
//! Every parsed YAML/JSON fragment is a [`serde_yaml::Value`]. The helpers here
//! read it by shape: a node that is not the shape a caller asks for reads as
//! absent or empty, never as an error.

use std::borrow::Cow;

use serde_yaml::{Mapping, Value};

/// Prefix of an internal reference to a named component schema
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Path-item keys that denote operations
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Root address of a document
pub const ROOT: &str = "#";

/// Mapping view of a node, `None` for any other shape
pub fn mapping(node: &Value) -> Option<&Mapping> {
    match node {
        Value::Mapping(map) => Some(map),
        _ => None,
    }
}

/// Sequence items of a node, empty for any other shape
pub fn items(node: &Value) -> &[Value] {
    match node {
        Value::Sequence(seq) => seq.as_slice(),
        _ => &[],
    }
}

/// Child of a mapping node by string key
pub fn field<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    mapping(node).and_then(|map| map.get(key))
}

/// String child of a mapping node
pub fn str_field<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    field(node, key).and_then(Value::as_str)
}

/// Render a scalar as text: strings as-is, numbers and booleans via Display.
///
/// Unquoted YAML keys such as `200:` or values such as `openapi: 3.1` arrive
/// as numbers and must still compare as text.
pub fn scalar_text(node: &Value) -> Option<Cow<'_, str>> {
    match node {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

/// Shape name of a node, for messages
pub fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// `(key, value)` pairs of a mapping node whose keys are scalars
pub fn entries(node: &Value) -> impl Iterator<Item = (Cow<'_, str>, &Value)> {
    mapping(node)
        .into_iter()
        .flat_map(|map| map.iter())
        .filter_map(|(k, v)| scalar_text(k).map(|k| (k, v)))
}

/// Name of the component schema an internal reference points at
pub fn schema_ref_name(reference: &str) -> Option<&str> {
    let name = reference.strip_prefix(SCHEMA_REF_PREFIX)?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name)
}

/// Call `f` for every `$ref` string anywhere below `node`, in document order
pub fn visit_refs<'a>(node: &'a Value, f: &mut impl FnMut(&'a str)) {
    match node {
        Value::Mapping(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                f(reference);
            }
            for value in map.values() {
                visit_refs(value, f);
            }
        }
        Value::Sequence(seq) => {
            for item in seq {
                visit_refs(item, f);
            }
        }
        Value::Tagged(tagged) => visit_refs(&tagged.value, f),
        _ => {}
    }
}

/// All `$ref` strings below `node`
pub fn collect_refs(node: &Value) -> Vec<&str> {
    let mut refs = Vec::new();
    visit_refs(node, &mut |r| refs.push(r));
    refs
}

/// True if `pred` holds for `node` or any node below it
pub fn any_node(node: &Value, pred: &mut impl FnMut(&Value) -> bool) -> bool {
    if pred(node) {
        return true;
    }
    match node {
        Value::Mapping(map) => map.values().any(|v| any_node(v, pred)),
        Value::Sequence(seq) => seq.iter().any(|v| any_node(v, pred)),
        Value::Tagged(tagged) => any_node(&tagged.value, pred),
        _ => false,
    }
}

/// Escape one reference token (`~` → `~0`, `/` → `~1`)
pub fn escape_token(token: &str) -> Cow<'_, str> {
    if token.contains(['~', '/']) {
        Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(token)
    }
}

/// Address of `token` below `base`
pub fn child_address(base: &str, token: &str) -> String {
    format!("{}/{}", base, escape_token(token))
}

/// Address of the `index`-th item below `base`
pub fn index_address(base: &str, index: usize) -> String {
    format!("{}/{}", base, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_wrong_shape_reads_as_empty() {
        let doc = yaml("paths: [1, 2]\ntags: {a: 1}");
        assert_eq!(entries(doc.get("paths").unwrap()).count(), 0);
        assert!(items(doc.get("tags").unwrap()).is_empty());
        assert!(field(&Value::Null, "anything").is_none());
    }

    #[test]
    fn test_numeric_keys_read_as_text() {
        let doc = yaml("responses:\n  200: {description: ok}\n  default: {description: err}");
        let keys: Vec<String> = entries(doc.get("responses").unwrap())
            .map(|(k, _)| k.into_owned())
            .collect();
        assert_eq!(keys, vec!["200", "default"]);
    }

    #[test]
    fn test_schema_ref_name() {
        assert_eq!(schema_ref_name("#/components/schemas/Pet"), Some("Pet"));
        assert_eq!(schema_ref_name("#/components/schemas/Pet/properties/id"), None);
        assert_eq!(schema_ref_name("#/components/parameters/Limit"), None);
        assert_eq!(schema_ref_name("other.yaml#/components/schemas/Pet"), None);
    }

    #[test]
    fn test_collect_refs_in_document_order() {
        let doc = yaml(
            "a: {$ref: '#/x'}\nb:\n  - {$ref: '#/y'}\n  - c: {$ref: '#/z'}",
        );
        assert_eq!(collect_refs(&doc), vec!["#/x", "#/y", "#/z"]);
    }

    #[test]
    fn test_addresses_escape_tokens() {
        assert_eq!(child_address(ROOT, "paths"), "#/paths");
        assert_eq!(child_address("#/paths", "/pets/{id}"), "#/paths/~1pets~1{id}");
        assert_eq!(child_address("#", "a~b"), "#/a~0b");
        assert_eq!(index_address("#/p/parameters", 2), "#/p/parameters/2");
    }
}
