//! Nesting Depth
//!
//! Depth of a schema is the longest chain of `properties` values, `items`,
//! and `allOf`/`anyOf`/`oneOf` members below it, one unit per hop. A `$ref`
//! node is a leaf: the target's own depth is not added.
//!
//! Nodes are identified by address. Re-entering an address that is still
//! being expanded contributes 0, so recursive schemas terminate with an
//! undercounted depth.

use serde_yaml::Value;
use std::collections::{HashMap, HashSet};

use crate::document::{child_address, entries, field, index_address, items, mapping, ROOT};

const COMPOSITION_KEYWORDS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

/// Computes nesting depth over one document's schemas
#[derive(Debug)]
pub struct DepthComputer<'a> {
    named: HashMap<String, &'a Value>,
}

impl<'a> DepthComputer<'a> {
    pub fn new(doc: &'a Value) -> Self {
        let named = field(doc, "components")
            .and_then(|components| field(components, "schemas"))
            .into_iter()
            .flat_map(entries)
            .filter(|(_, schema)| mapping(schema).is_some())
            .map(|(name, schema)| (name.into_owned(), schema))
            .collect();
        Self { named }
    }

    /// Depth of the schema `node` found at `address`
    pub fn depth(&self, address: &str, node: &'a Value) -> usize {
        let mut walk = DepthWalk {
            in_progress: HashSet::new(),
            finished: HashMap::new(),
        };
        walk.depth(address.to_string(), node)
    }

    /// Depth of a named component schema, `None` if there is no such schema
    pub fn named_depth(&self, name: &str) -> Option<usize> {
        let schema = *self.named.get(name)?;
        Some(self.depth(&named_address(name), schema))
    }

    /// Largest depth over all named component schemas, 0 when there are none
    pub fn max_named_depth(&self) -> usize {
        self.named
            .keys()
            .filter_map(|name| self.named_depth(name))
            .max()
            .unwrap_or(0)
    }
}

/// Largest nesting depth over the named component schemas of `doc`
pub fn max_named_depth(doc: &Value) -> usize {
    DepthComputer::new(doc).max_named_depth()
}

fn named_address(name: &str) -> String {
    child_address(&child_address(&child_address(ROOT, "components"), "schemas"), name)
}

struct DepthWalk {
    in_progress: HashSet<String>,
    finished: HashMap<String, usize>,
}

impl DepthWalk {
    fn depth(&mut self, address: String, node: &Value) -> usize {
        let Some(map) = mapping(node) else {
            return 0;
        };
        if let Some(&known) = self.finished.get(&address) {
            return known;
        }
        if !self.in_progress.insert(address.clone()) {
            return 0;
        }

        let mut deepest = 0;

        if let Some(properties) = map.get("properties") {
            let base = child_address(&address, "properties");
            for (name, property) in entries(properties) {
                deepest = deepest.max(1 + self.depth(child_address(&base, &name), property));
            }
        }

        if let Some(item) = map.get("items") {
            deepest = deepest.max(1 + self.depth(child_address(&address, "items"), item));
        }

        for keyword in COMPOSITION_KEYWORDS {
            let Some(members) = map.get(keyword) else {
                continue;
            };
            let base = child_address(&address, keyword);
            for (index, member) in items(members).iter().enumerate() {
                deepest = deepest.max(1 + self.depth(index_address(&base, index), member));
            }
        }

        self.in_progress.remove(&address);
        self.finished.insert(address, deepest);
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn computer_for(text: &str) -> (Value, usize) {
        let doc: Value = serde_yaml::from_str(text).unwrap();
        let max = max_named_depth(&doc);
        (doc, max)
    }

    #[test]
    fn test_flat_object() {
        let (_, max) = computer_for("components:\n  schemas:\n    Pet: {type: object, properties: {id: {type: integer}}}");
        assert_eq!(max, 1);
    }

    #[test]
    fn test_nested_properties_and_items() {
        let (doc, max) = computer_for(
            r#"
components:
  schemas:
    Order:
      type: object
      properties:
        lines:
          type: array
          items:
            type: object
            properties:
              sku: {type: string}
    Empty: {type: object}
"#,
        );
        assert_eq!(max, 3);
        let computer = DepthComputer::new(&doc);
        assert_eq!(computer.named_depth("Empty"), Some(0));
        assert_eq!(computer.named_depth("Nope"), None);
    }

    #[test]
    fn test_refs_are_leaves() {
        let (doc, _) = computer_for(
            r##"
components:
  schemas:
    Owner:
      properties:
        pet: {$ref: "#/components/schemas/Pet"}
    Pet:
      properties:
        tag: {properties: {name: {type: string}}}
"##,
        );
        let computer = DepthComputer::new(&doc);
        assert_eq!(computer.named_depth("Pet"), Some(2));
        assert_eq!(computer.named_depth("Owner"), Some(1));
    }

    #[test]
    fn test_self_referential_items_terminate() {
        let (doc, max) = computer_for(
            r##"
components:
  schemas:
    Tree:
      type: array
      items: {$ref: "#/components/schemas/Tree"}
"##,
        );
        assert_eq!(max, 1);
        assert_eq!(DepthComputer::new(&doc).named_depth("Tree"), Some(1));
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let (doc, max) = computer_for(
            r##"
components:
  schemas:
    A:
      allOf:
        - $ref: "#/components/schemas/B"
    B:
      type: object
      properties:
        parent: {$ref: "#/components/schemas/A"}
"##,
        );
        assert_eq!(max, 1);
        let computer = DepthComputer::new(&doc);
        assert_eq!(computer.named_depth("A"), Some(1));
        assert_eq!(computer.named_depth("B"), Some(1));
    }

    #[test]
    fn test_inline_site_depth() {
        let doc: Value = serde_yaml::from_str(
            "schema:\n  oneOf:\n    - {type: string}\n    - {type: array, items: {type: integer}}",
        )
        .unwrap();
        let computer = DepthComputer::new(&doc);
        let schema = field(&doc, "schema").unwrap();
        assert_eq!(computer.depth("#/schema", schema), 2);
    }

    #[test]
    fn test_no_schemas() {
        let (_, max) = computer_for("openapi: 3.0.3");
        assert_eq!(max, 0);
    }
}
