//! Polymorphism Counting
//!
//! Walks every located schema site at all nesting levels and counts union
//! (`oneOf`/`anyOf`), `allOf` and `discriminator` usage. Separately finds the
//! named schemas that are polymorphic at their own top level and counts the
//! references pointing at them.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeSet;

use crate::document::{entries, items, mapping, schema_ref_name, visit_refs};
use crate::graph::SchemaSites;

const UNION_KEYWORDS: [&str; 2] = ["oneOf", "anyOf"];

/// Keys whose values are sample data, not schemas
const EXAMPLE_KEYS: [&str; 2] = ["example", "examples"];

/// Keys whose values are maps from property names to schemas
const PROPERTY_MAP_KEYS: [&str; 2] = ["properties", "patternProperties"];

/// Polymorphism counters for one site or a whole document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolymorphismCounts {
    /// Schema nodes carrying `oneOf` or `anyOf`
    pub union_node_count: usize,
    /// Sum of `oneOf` and `anyOf` list lengths
    pub union_branch_total: usize,
    /// Largest `oneOf` + `anyOf` branch count on a single node
    pub max_union_branches: usize,
    /// Sum of `allOf` list lengths
    pub all_of_count: usize,
    /// `discriminator` occurrences
    pub discriminator_count: usize,
}

impl PolymorphismCounts {
    /// Count polymorphism in `node` and everything below it
    pub fn of_schema(node: &Value) -> Self {
        let mut counts = Self::default();
        counts.walk(node);
        counts
    }

    /// Fold another set of counts into this one
    pub fn absorb(&mut self, other: &PolymorphismCounts) {
        self.union_node_count += other.union_node_count;
        self.union_branch_total += other.union_branch_total;
        self.max_union_branches = self.max_union_branches.max(other.max_union_branches);
        self.all_of_count += other.all_of_count;
        self.discriminator_count += other.discriminator_count;
    }

    fn walk(&mut self, node: &Value) {
        match node {
            Value::Mapping(map) => {
                self.count_node(node);
                for (key, value) in map {
                    match key.as_str() {
                        Some(k) if EXAMPLE_KEYS.contains(&k) => {}
                        Some(k) if PROPERTY_MAP_KEYS.contains(&k) => {
                            for (_, property) in entries(value) {
                                self.walk(property);
                            }
                        }
                        _ => self.walk(value),
                    }
                }
            }
            Value::Sequence(seq) => {
                for item in seq {
                    self.walk(item);
                }
            }
            Value::Tagged(tagged) => self.walk(&tagged.value),
            _ => {}
        }
    }

    fn count_node(&mut self, node: &Value) {
        let branches: usize = UNION_KEYWORDS
            .iter()
            .filter_map(|k| node.get(*k))
            .map(|list| items(list).len())
            .sum();
        let has_union = UNION_KEYWORDS.iter().any(|k| node.get(*k).is_some_and(Value::is_sequence));
        if has_union {
            self.union_node_count += 1;
            self.union_branch_total += branches;
            self.max_union_branches = self.max_union_branches.max(branches);
        }
        if let Some(all_of) = node.get("allOf") {
            self.all_of_count += items(all_of).len();
        }
        if node.get("discriminator").is_some() {
            self.discriminator_count += 1;
        }
    }
}

/// Document-wide polymorphism summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolymorphismSummary {
    #[serde(flatten)]
    pub counts: PolymorphismCounts,
    /// Named schemas with a union, `allOf` or `discriminator` at top level
    pub polymorphic_schemas: Vec<String>,
    /// References anywhere in the document to those schemas
    pub polymorphic_ref_count: usize,
}

/// True if a schema is polymorphic at its own top level
pub fn is_polymorphic(schema: &Value) -> bool {
    mapping(schema).is_some_and(|map| {
        ["oneOf", "anyOf", "allOf", "discriminator"]
            .iter()
            .any(|k| map.contains_key(*k))
    })
}

/// Count polymorphism across all located sites of `doc`
pub fn count_polymorphism(doc: &Value, sites: &SchemaSites<'_>) -> PolymorphismSummary {
    let mut counts = PolymorphismCounts::default();
    for (_, site) in sites.iter() {
        counts.absorb(&PolymorphismCounts::of_schema(site.node));
    }

    let polymorphic: BTreeSet<&str> = sites
        .named()
        .filter(|(_, site)| is_polymorphic(site.node))
        .filter_map(|(address, _)| schema_ref_name(address))
        .collect();

    let mut polymorphic_ref_count = 0;
    visit_refs(doc, &mut |reference| {
        if schema_ref_name(reference).is_some_and(|name| polymorphic.contains(name)) {
            polymorphic_ref_count += 1;
        }
    });

    PolymorphismSummary {
        counts,
        polymorphic_schemas: polymorphic.into_iter().map(String::from).collect(),
        polymorphic_ref_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::locate_schemas;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_counts_nested_levels() {
        let schema = yaml(
            r#"
oneOf:
  - type: string
  - type: object
    properties:
      inner:
        anyOf: [{type: integer}, {type: number}, {type: boolean}]
allOf: [{type: object}]
discriminator: {propertyName: kind}
"#,
        );
        let counts = PolymorphismCounts::of_schema(&schema);
        assert_eq!(counts.union_node_count, 2);
        assert_eq!(counts.union_branch_total, 5);
        assert_eq!(counts.max_union_branches, 3);
        assert_eq!(counts.all_of_count, 1);
        assert_eq!(counts.discriminator_count, 1);
    }

    #[test]
    fn test_property_names_are_not_keywords() {
        let schema = yaml(
            "type: object\nproperties:\n  discriminator: {type: string}\n  oneOf: {type: string}",
        );
        assert_eq!(PolymorphismCounts::of_schema(&schema), PolymorphismCounts::default());
    }

    #[test]
    fn test_examples_are_skipped() {
        let schema = yaml("type: object\nexample:\n  oneOf: [1, 2]\n  discriminator: x");
        assert_eq!(PolymorphismCounts::of_schema(&schema), PolymorphismCounts::default());
    }

    #[test]
    fn test_non_list_union_is_ignored() {
        let schema = yaml("oneOf: {type: string}");
        assert_eq!(PolymorphismCounts::of_schema(&schema).union_node_count, 0);
    }

    #[test]
    fn test_document_summary() {
        let doc = yaml(
            r##"
paths:
  /pets:
    get:
      responses:
        "200":
          content:
            application/json:
              schema:
                oneOf:
                  - $ref: "#/components/schemas/Pet"
                  - $ref: "#/components/schemas/Cat"
components:
  schemas:
    Pet:
      oneOf:
        - $ref: "#/components/schemas/Cat"
        - $ref: "#/components/schemas/Dog"
      discriminator: {propertyName: kind}
    Cat: {type: object}
    Dog:
      allOf:
        - $ref: "#/components/schemas/Cat"
"##,
        );
        let sites = locate_schemas(&doc);
        let summary = count_polymorphism(&doc, &sites);

        assert_eq!(summary.counts.union_node_count, 2);
        assert_eq!(summary.counts.union_branch_total, 4);
        assert_eq!(summary.counts.max_union_branches, 2);
        assert_eq!(summary.counts.all_of_count, 1);
        assert_eq!(summary.counts.discriminator_count, 1);
        assert_eq!(summary.polymorphic_schemas, vec!["Dog", "Pet"]);
        // path response -> Pet, Pet.oneOf -> Dog
        assert_eq!(summary.polymorphic_ref_count, 2);
    }
}
