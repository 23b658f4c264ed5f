//! Raw document metrics: operations, parameters, object schemas, references

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeSet;

use crate::document::{collect_refs, entries, field, items, mapping, scalar_text, schema_ref_name, str_field};
use crate::graph::locator::operations;

/// Operation statistics over `paths`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetrics {
    pub count: usize,
    /// Lowercase method -> frequency, first-seen order
    pub methods: IndexMap<String, usize>,
    /// Path-level plus operation-level parameters, averaged (2 decimals)
    pub avg_parameters: f64,
    pub max_parameters: usize,
    /// Share of operations that are POST (2 decimals)
    pub post_ratio: f64,
}

/// Property statistics over named `type: object` schemas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStats {
    pub object_count: usize,
    pub avg_properties: f64,
    pub max_properties: usize,
}

/// Reference statistics over the whole document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefStats {
    /// Every `$ref`, any target
    pub ref_count: usize,
    /// Sorted names referenced as `#/components/schemas/<name>`
    pub distinct_ref_targets: Vec<String>,
}

/// Document identification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub openapi_version: Option<String>,
    pub title: Option<String>,
    pub version: Option<String>,
}

/// Round to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn average(total: usize, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        total as f64 / n as f64
    }
}

/// Number of entries under `paths`
pub fn path_count(doc: &Value) -> usize {
    field(doc, "paths").and_then(mapping).map_or(0, |paths| paths.len())
}

pub fn operation_metrics(doc: &Value) -> OperationMetrics {
    let mut methods: IndexMap<String, usize> = IndexMap::new();
    let mut parameter_counts = Vec::new();

    let path_items = field(doc, "paths").into_iter().flat_map(entries);
    for (_, item) in path_items {
        let path_level = field(item, "parameters").map_or(0, |p| items(p).len());
        for (method, operation) in operations(item) {
            *methods.entry(method.to_ascii_lowercase()).or_default() += 1;
            let op_level = field(operation, "parameters").map_or(0, |p| items(p).len());
            parameter_counts.push(path_level + op_level);
        }
    }

    let count = parameter_counts.len();
    let posts = methods.get("post").copied().unwrap_or(0);
    OperationMetrics {
        count,
        methods,
        avg_parameters: round_to(average(parameter_counts.iter().sum(), count), 2),
        max_parameters: parameter_counts.iter().copied().max().unwrap_or(0),
        post_ratio: round_to(average(posts, count), 2),
    }
}

pub fn object_stats(doc: &Value) -> ObjectStats {
    let property_counts: Vec<usize> = field(doc, "components")
        .and_then(|components| field(components, "schemas"))
        .into_iter()
        .flat_map(entries)
        .filter(|(_, schema)| str_field(schema, "type") == Some("object"))
        .map(|(_, schema)| field(schema, "properties").and_then(mapping).map_or(0, |p| p.len()))
        .collect();

    ObjectStats {
        object_count: property_counts.len(),
        avg_properties: round_to(average(property_counts.iter().sum(), property_counts.len()), 2),
        max_properties: property_counts.iter().copied().max().unwrap_or(0),
    }
}

pub fn ref_stats(doc: &Value) -> RefStats {
    let refs = collect_refs(doc);
    let targets: BTreeSet<&str> = refs.iter().filter_map(|r| schema_ref_name(r)).collect();
    RefStats {
        ref_count: refs.len(),
        distinct_ref_targets: targets.into_iter().map(String::from).collect(),
    }
}

pub fn meta(doc: &Value) -> Meta {
    let text = |node: Option<&Value>| node.and_then(scalar_text).map(|s| s.into_owned());
    let info = field(doc, "info");
    Meta {
        openapi_version: text(field(doc, "openapi")),
        title: text(info.and_then(|i| field(i, "title"))),
        version: text(info.and_then(|i| field(i, "version"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const API: &str = r##"
openapi: 3.1
info: {title: Pets, version: 2}
paths:
  /pets:
    parameters:
      - {name: tenant, in: header}
    get:
      parameters:
        - {name: limit, in: query}
        - {name: offset, in: query}
      responses: {}
    POST:
      responses: {}
    x-internal: true
  /pets/{id}:
    post: {parameters: not-a-list}
  /broken: 5
components:
  schemas:
    Pet:
      type: object
      properties:
        id: {type: integer}
        name: {type: string}
        owner: {$ref: "#/components/schemas/Owner"}
    Owner: {type: object}
    Name: {type: string}
    Ext: {$ref: "other.yaml#/components/schemas/X"}
"##;

    fn doc() -> Value {
        serde_yaml::from_str(API).unwrap()
    }

    #[test]
    fn test_operations() {
        let ops = operation_metrics(&doc());
        assert_eq!(ops.count, 3);
        assert_eq!(ops.methods.iter().map(|(m, c)| (m.as_str(), *c)).collect::<Vec<_>>(), vec![("get", 1), ("post", 2)]);
        // 3 + 1 + 0
        assert_eq!(ops.avg_parameters, 1.33);
        assert_eq!(ops.max_parameters, 3);
        assert_eq!(ops.post_ratio, 0.67);
    }

    #[test]
    fn test_no_operations() {
        let ops = operation_metrics(&Value::Null);
        assert_eq!(ops.count, 0);
        assert_eq!(ops.avg_parameters, 0.0);
        assert_eq!(ops.post_ratio, 0.0);
    }

    #[test]
    fn test_paths_count_every_entry() {
        assert_eq!(path_count(&doc()), 3);
    }

    #[test]
    fn test_object_stats() {
        let stats = object_stats(&doc());
        assert_eq!(stats.object_count, 2);
        assert_eq!(stats.avg_properties, 1.5);
        assert_eq!(stats.max_properties, 3);
    }

    #[test]
    fn test_ref_stats() {
        let refs = ref_stats(&doc());
        assert_eq!(refs.ref_count, 2);
        assert_eq!(refs.distinct_ref_targets, vec!["Owner"]);
    }

    #[test]
    fn test_meta_reads_unquoted_scalars() {
        let meta = meta(&doc());
        assert_eq!(meta.openapi_version.as_deref(), Some("3.1"));
        assert_eq!(meta.title.as_deref(), Some("Pets"));
        assert_eq!(meta.version.as_deref(), Some("2"));
        assert_eq!(super::meta(&Value::Null), Meta::default());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
        assert_eq!(round_to(7.25, 1), 7.3);
    }
}
