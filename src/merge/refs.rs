//! External reference rewriting
//!
//! `./pets.yaml#/components/schemas/Pet` becomes `#/components/schemas/Pet`.
//! The target is not checked for existence.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

static EXTERNAL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^#]+)#/(.+)$").expect("external ref pattern is valid"));

/// Internal form of an external `path#/pointer` reference, `None` if `reference` is not one
pub fn internalize(reference: &str) -> Option<String> {
    EXTERNAL_REF
        .captures(reference)
        .map(|caps| format!("#/{}", &caps[2]))
}

/// Rewrite every external `$ref` below `node` in place; returns how many changed
pub fn rewrite_external_refs(node: &mut Value) -> usize {
    match node {
        Value::Mapping(map) => {
            let mut rewritten = 0;
            if let Some(Value::String(reference)) = map.get_mut("$ref") {
                if let Some(internal) = internalize(reference) {
                    *reference = internal;
                    rewritten += 1;
                }
            }
            for value in map.values_mut() {
                rewritten += rewrite_external_refs(value);
            }
            rewritten
        }
        Value::Sequence(seq) => seq.iter_mut().map(rewrite_external_refs).sum(),
        Value::Tagged(tagged) => rewrite_external_refs(&mut tagged.value),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internalize() {
        assert_eq!(
            internalize("./pets.yaml#/components/schemas/Pet").as_deref(),
            Some("#/components/schemas/Pet")
        );
        assert_eq!(
            internalize("common/errors.yml#/components/responses/NotFound").as_deref(),
            Some("#/components/responses/NotFound")
        );
        assert_eq!(internalize("#/components/schemas/Pet"), None);
        assert_eq!(internalize("pets.yaml"), None);
        assert_eq!(internalize("pets.yaml#/"), None);
    }

    #[test]
    fn test_rewrite_walks_whole_tree() {
        let mut doc: Value = serde_yaml::from_str(
            r##"
paths:
  /pets:
    get:
      responses:
        "200":
          content:
            application/json:
              schema:
                type: array
                items: {$ref: "pets.yaml#/components/schemas/Pet"}
components:
  schemas:
    Owner:
      allOf:
        - $ref: "#/components/schemas/Base"
        - $ref: "./base.yaml#/components/schemas/Named"
"##,
        )
        .unwrap();

        assert_eq!(rewrite_external_refs(&mut doc), 2);
        let refs = crate::document::collect_refs(&doc);
        assert!(refs.iter().all(|r| r.starts_with("#/")));
        assert!(refs.contains(&"#/components/schemas/Named"));
    }
}
