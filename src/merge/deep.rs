//! Earliest-wins deep merge
//!
//! Later documents may only add: missing keys are copied in, mappings merge
//! recursively, sequences concatenate without duplicates. Any other clash
//! keeps the destination value and is recorded as a [`MergeConflict`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::document::{child_address, scalar_text, shape_name};

/// Why a later value was not taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Both sides are scalars with different values
    ScalarConflict,
    /// The two sides have different shapes
    TypeMismatch,
}

/// A key whose later value was shadowed by the earlier one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConflict {
    /// Address of the shadowed key in the merged document
    pub address: String,
    /// Index (0-based) of the document whose value was ignored
    pub document: usize,
    pub kind: ConflictKind,
    /// Short rendering of the value that was kept
    pub kept: String,
    /// Short rendering of the value that was ignored
    pub ignored: String,
}

/// Merge state for one source document
pub(crate) struct MergeContext<'a> {
    pub document: usize,
    pub conflicts: &'a mut Vec<MergeConflict>,
}

/// Deep-merge `src` into `dst`
pub(crate) fn deep_merge(dst: &mut Mapping, src: &Mapping, address: &str, ctx: &mut MergeContext<'_>) {
    for (key, value) in src {
        if value.is_null() {
            continue;
        }
        match dst.get_mut(key) {
            None => {
                dst.insert(key.clone(), value.clone());
            }
            Some(existing) => {
                let token = scalar_text(key).unwrap_or_default();
                merge_value(existing, value, &child_address(address, &token), ctx);
            }
        }
    }
}

/// Merge one value into an existing one at `address`
pub(crate) fn merge_value(dst: &mut Value, src: &Value, address: &str, ctx: &mut MergeContext<'_>) {
    match (dst, src) {
        (Value::Mapping(d), Value::Mapping(s)) => deep_merge(d, s, address, ctx),
        (Value::Sequence(d), Value::Sequence(s)) => append_unique(d, s),
        (d, s) => {
            if *d == *s {
                return;
            }
            let kind = if is_scalar(d) && is_scalar(s) {
                ConflictKind::ScalarConflict
            } else {
                ConflictKind::TypeMismatch
            };
            ctx.conflicts.push(MergeConflict {
                address: address.to_string(),
                document: ctx.document,
                kind,
                kept: describe(d),
                ignored: describe(s),
            });
        }
    }
}

/// Append items of `src` not already present (by serialized form) in `dst`
pub(crate) fn append_unique(dst: &mut Vec<Value>, src: &[Value]) {
    let mut seen: HashSet<String> = dst.iter().map(fingerprint).collect();
    for item in src {
        if seen.insert(fingerprint(item)) {
            dst.push(item.clone());
        }
    }
}

/// Append mapping items of `src` whose `identity` field is not already present in `dst`.
///
/// Entries without the field share one "missing" identity. Non-mapping
/// entries in `src` are ignored.
pub(crate) fn append_by_identity(dst: &mut Vec<Value>, src: &[Value], identity: &str) {
    let identity_of = |item: &Value| -> Option<String> {
        item.get(identity).and_then(scalar_text).map(|s| s.into_owned())
    };

    let mut seen: HashSet<Option<String>> = dst
        .iter()
        .filter(|item| item.is_mapping())
        .map(identity_of)
        .collect();

    for item in src.iter().filter(|item| item.is_mapping()) {
        if seen.insert(identity_of(item)) {
            dst.push(item.clone());
        }
    }
}

fn fingerprint(value: &Value) -> String {
    format!("{:?}", value)
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_))
}

fn describe(value: &Value) -> String {
    match scalar_text(value) {
        Some(text) => text.into_owned(),
        None => shape_name(value).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn merge(dst: &str, src: &str) -> (Value, Vec<MergeConflict>) {
        let mut dst = yaml(dst);
        let src = yaml(src);
        let mut conflicts = Vec::new();
        let mut ctx = MergeContext { document: 1, conflicts: &mut conflicts };
        merge_value(&mut dst, &src, "#", &mut ctx);
        (dst, conflicts)
    }

    #[test]
    fn test_missing_keys_are_added() {
        let (merged, conflicts) = merge("a: 1", "b: {c: 2}");
        assert_eq!(merged, yaml("a: 1\nb: {c: 2}"));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_scalar_clash_keeps_first() {
        let (merged, conflicts) = merge("info: {title: First}", "info: {title: Second}");
        assert_eq!(merged, yaml("info: {title: First}"));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].address, "#/info/title");
        assert_eq!(conflicts[0].kind, ConflictKind::ScalarConflict);
        assert_eq!(conflicts[0].kept, "First");
        assert_eq!(conflicts[0].ignored, "Second");
        assert_eq!(conflicts[0].document, 1);
    }

    #[test]
    fn test_equal_scalars_are_not_conflicts() {
        let (_, conflicts) = merge("openapi: 3.0.3", "openapi: 3.0.3");
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_shape_clash_is_type_mismatch() {
        let (merged, conflicts) = merge("x: [1]", "x: {a: 1}");
        assert_eq!(merged, yaml("x: [1]"));
        assert_eq!(conflicts[0].kind, ConflictKind::TypeMismatch);
        assert_eq!(conflicts[0].kept, "sequence");
        assert_eq!(conflicts[0].ignored, "mapping");
    }

    #[test]
    fn test_null_source_values_are_skipped() {
        let (merged, conflicts) = merge("a: 1", "a: null\nb: null");
        assert_eq!(merged, yaml("a: 1"));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_sequences_concatenate_without_duplicates() {
        let (merged, _) = merge("l: [a, {x: 1}, b]", "l: [b, {x: 1}, c, c]");
        assert_eq!(merged, yaml("l: [a, {x: 1}, b, c]"));
    }

    #[test]
    fn test_identity_dedup_ignores_other_fields() {
        let mut dst = vec![yaml("{name: pets, description: first}")];
        let src = vec![
            yaml("{name: pets, description: second}"),
            yaml("{name: owners}"),
            yaml("plain"),
        ];
        append_by_identity(&mut dst, &src, "name");
        assert_eq!(dst.len(), 2);
        assert_eq!(dst[0], yaml("{name: pets, description: first}"));
        assert_eq!(dst[1], yaml("{name: owners}"));
    }
}
