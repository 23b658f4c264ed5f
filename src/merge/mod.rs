//! Document Merging
//!
//! Folds an ordered list of parsed OpenAPI documents into one document whose
//! references are all internal. The first document is the baseline; the
//! rest can only add to it. Shadowed values are reported, not overwritten.

pub mod deep;
pub mod refs;

pub use deep::{ConflictKind, MergeConflict};
pub use refs::{internalize, rewrite_external_refs};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::config::MergeConfig;
use crate::diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics};
use crate::document::{child_address, entries, scalar_text, shape_name, ROOT};
use crate::error::{Result, SpecError};
use crate::split::split_documents;
use deep::{append_by_identity, deep_merge, merge_value, MergeContext};

/// Component subsections every OpenAPI 3.x document may carry
pub const STANDARD_COMPONENTS: [&str; 9] = [
    "schemas",
    "parameters",
    "responses",
    "requestBodies",
    "headers",
    "securitySchemes",
    "examples",
    "links",
    "callbacks",
];

/// Subsections kept even when empty
pub const RETAINED_COMPONENTS: [&str; 3] = ["schemas", "parameters", "responses"];

/// 3.1-only component subsection
pub const PATH_ITEMS: &str = "pathItems";

/// Result of a merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged document
    pub document: Value,
    /// Values from later documents that lost to earlier ones
    pub conflicts: Vec<MergeConflict>,
    /// Normalizations and conflicts, for reporting
    pub diagnostics: Diagnostics,
    /// Number of external references rewritten to internal form
    pub rewritten_refs: usize,
}

impl MergeOutcome {
    /// Serialize the merged document as YAML, keys in first-insertion order
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.document)?)
    }
}

/// True when `version` names OpenAPI 3.1.x
pub fn is_openapi_31(version: &str) -> bool {
    version.starts_with("3.1")
}

/// Merge `documents` into a single OpenAPI document
pub fn merge_documents(documents: &[Value], config: &MergeConfig) -> Result<MergeOutcome> {
    let Some((first, rest)) = documents.split_first() else {
        return Err(SpecError::NoDocuments { fragments: 0 });
    };

    let mut diagnostics = Diagnostics::new();
    let mut conflicts = Vec::new();

    let mut result = match first {
        Value::Mapping(map) => map.clone(),
        other => {
            diagnostics.non_mapping("document 0", shape_name(other));
            Mapping::new()
        }
    };

    apply_defaults(&mut result, config, &mut diagnostics);
    let version = openapi_version(&result, config);

    for (offset, doc) in rest.iter().enumerate() {
        let index = offset + 1;
        let Value::Mapping(doc) = doc else {
            diagnostics.non_mapping(format!("document {}", index), shape_name(doc));
            continue;
        };
        let mut ctx = MergeContext { document: index, conflicts: &mut conflicts };
        merge_into(&mut result, doc, &mut ctx, &mut diagnostics);
        debug!(document = index, "merged document");
    }

    finalize_components(&mut result, &version, &mut diagnostics);

    let mut document = Value::Mapping(result);
    let rewritten_refs = rewrite_external_refs(&mut document);
    ensure_openapi(&mut document, config);

    for conflict in &conflicts {
        warn!(
            address = %conflict.address,
            document = conflict.document,
            kept = %conflict.kept,
            ignored = %conflict.ignored,
            "kept earlier value"
        );
        diagnostics.push(
            DiagnosticItem::new(
                conflict.address.clone(),
                DiagnosticCode::MergeConflict,
                format!("kept '{}', ignored '{}'", conflict.kept, conflict.ignored),
            )
            .with_context(format!("from document {}", conflict.document)),
        );
    }

    info!(
        documents = documents.len(),
        conflicts = conflicts.len(),
        rewritten_refs,
        "merged OpenAPI documents"
    );

    Ok(MergeOutcome {
        document,
        conflicts,
        diagnostics,
        rewritten_refs,
    })
}

/// Split `text` into documents and merge them; split diagnostics come first
pub fn merge_text(text: &str, config: &MergeConfig) -> Result<MergeOutcome> {
    let parsed = split_documents(text)?;
    let mut outcome = merge_documents(&parsed.documents, config)?;
    let mut diagnostics = parsed.diagnostics;
    diagnostics.merge(std::mem::take(&mut outcome.diagnostics));
    outcome.diagnostics = diagnostics;
    Ok(outcome)
}

/// Insert the required top-level sections and standard component subsections
fn apply_defaults(result: &mut Mapping, config: &MergeConfig, diagnostics: &mut Diagnostics) {
    if !result.contains_key("openapi") {
        result.insert("openapi".into(), config.default_openapi_version.clone().into());
    }
    if !result.contains_key("info") {
        let mut info = Mapping::new();
        info.insert("title".into(), config.default_title.clone().into());
        info.insert("version".into(), config.default_version.clone().into());
        result.insert("info".into(), Value::Mapping(info));
    }

    mapping_slot(result, "paths", ROOT, diagnostics);
    let Some(components) = mapping_slot(result, "components", ROOT, diagnostics) else {
        return;
    };
    let base = child_address(ROOT, "components");
    for key in STANDARD_COMPONENTS {
        mapping_slot(components, key, &base, diagnostics);
    }
}

fn openapi_version(result: &Mapping, config: &MergeConfig) -> String {
    result
        .get("openapi")
        .and_then(scalar_text)
        .map(|v| v.into_owned())
        .unwrap_or_else(|| config.default_openapi_version.clone())
}

/// Merge one later document into the accumulated result
fn merge_into(result: &mut Mapping, doc: &Mapping, ctx: &mut MergeContext<'_>, diagnostics: &mut Diagnostics) {
    for (key, value) in doc {
        if value.is_null() {
            continue;
        }
        let key_text = scalar_text(key).unwrap_or_default();
        match key_text.as_ref() {
            "paths" => {
                if let Value::Mapping(paths) = value {
                    if let Some(dst) = mapping_slot(result, "paths", ROOT, diagnostics) {
                        deep_merge(dst, paths, &child_address(ROOT, "paths"), ctx);
                    }
                }
            }
            "components" => {
                let Some(components) = mapping_slot(result, "components", ROOT, diagnostics) else {
                    continue;
                };
                let base = child_address(ROOT, "components");
                for (section, content) in entries(value) {
                    if let Value::Mapping(content) = content {
                        if let Some(dst) = mapping_slot(components, &section, &base, diagnostics) {
                            deep_merge(dst, content, &child_address(&base, &section), ctx);
                        }
                    }
                }
            }
            "tags" => merge_identified(result, "tags", value, "name", ctx),
            "servers" => merge_identified(result, "servers", value, "url", ctx),
            _ => match result.get_mut(key) {
                None => {
                    result.insert(key.clone(), value.clone());
                }
                Some(existing) => merge_value(existing, value, &child_address(ROOT, &key_text), ctx),
            },
        }
    }
}

/// Merge a top-level list whose entries are identified by one field
fn merge_identified(result: &mut Mapping, section: &str, value: &Value, identity: &str, ctx: &mut MergeContext<'_>) {
    let Value::Sequence(incoming) = value else {
        return;
    };
    let slot = result
        .entry(section.into())
        .or_insert_with(|| Value::Sequence(Vec::new()));
    match slot {
        Value::Sequence(existing) => append_by_identity(existing, incoming, identity),
        other => merge_value(other, value, &child_address(ROOT, section), ctx),
    }
}

/// Strip or add `pathItems` by version, then prune empty subsections
fn finalize_components(result: &mut Mapping, version: &str, diagnostics: &mut Diagnostics) {
    let Some(components) = mapping_slot(result, "components", ROOT, diagnostics) else {
        return;
    };
    let base = child_address(ROOT, "components");

    if is_openapi_31(version) {
        mapping_slot(components, PATH_ITEMS, &base, diagnostics);
    } else if components.remove(PATH_ITEMS).is_some() {
        diagnostics.push(
            DiagnosticItem::new(
                child_address(&base, PATH_ITEMS),
                DiagnosticCode::PathItemsStripped,
                "components.pathItems is only valid in OpenAPI 3.1",
            )
            .with_context(format!("openapi {}", version)),
        );
    }

    components.retain(|key, value| {
        let empty = matches!(value, Value::Mapping(m) if m.is_empty());
        let retained = key.as_str().map_or(false, |k| RETAINED_COMPONENTS.contains(&k));
        !empty || retained
    });
}

/// Re-insert the default version if the merged `openapi` key is missing or empty
fn ensure_openapi(document: &mut Value, config: &MergeConfig) {
    let Value::Mapping(map) = document else {
        return;
    };
    let present = map
        .get("openapi")
        .and_then(scalar_text)
        .map_or(false, |v| !v.is_empty());
    if !present {
        map.insert("openapi".into(), config.default_openapi_version.clone().into());
    }
}

/// Mapping stored under `key`, created empty when absent and normalized when malformed
fn mapping_slot<'a>(
    parent: &'a mut Mapping,
    key: &str,
    parent_address: &str,
    diagnostics: &mut Diagnostics,
) -> Option<&'a mut Mapping> {
    let slot = parent
        .entry(key.into())
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !slot.is_mapping() {
        diagnostics.non_mapping(child_address(parent_address, key), shape_name(slot));
        *slot = Value::Mapping(Mapping::new());
    }
    slot.as_mapping_mut()
}
