//! Waveform Serialization Advisory
//!
//! Flags sample-array properties (`samples`, `waveform`, ...) typed as arrays
//! of numbers when the document offers no binary encoding anywhere.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashSet;

use crate::config::WaveformConfig;
use crate::document::{any_node, child_address, entries, field, index_address, str_field, ROOT};

const OCTET_STREAM: &str = "application/octet-stream";

/// A property carrying numeric samples as a JSON array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleArrayProperty {
    /// Address of the property schema
    pub address: String,
    pub property: String,
    /// `number` or `integer`
    pub item_type: String,
}

/// Size estimate for one binary encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodingEstimate {
    pub encoding: String,
    pub bytes_per_sample: u32,
    /// Typical JSON text bytes for one sample
    pub json_bytes_per_sample: String,
    pub expansion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveformAdvisory {
    pub issue_detected: bool,
    pub binary_alternative_present: bool,
    pub properties: Vec<SampleArrayProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub estimates: Vec<EncodingEstimate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Check `doc` for sample arrays without a binary alternative
pub fn assess_waveforms(doc: &Value, config: &WaveformConfig) -> WaveformAdvisory {
    let names = config.name_set();
    let mut properties = Vec::new();
    find_sample_arrays(doc, ROOT.to_string(), &names, &mut properties);

    let binary_alternative_present = has_binary_alternative(doc);
    let issue_detected = !properties.is_empty() && !binary_alternative_present;

    let (estimates, recommendation) = if issue_detected {
        (
            fixed_estimates(),
            Some(
                "Offer the samples as application/octet-stream or a base64 string \
                 (contentEncoding: base64) of packed float32 or int16 values"
                    .to_string(),
            ),
        )
    } else {
        (Vec::new(), None)
    };

    WaveformAdvisory {
        issue_detected,
        binary_alternative_present,
        properties,
        estimates,
        recommendation,
    }
}

/// True if any node declares a binary or base64 encoding, or an octet-stream media type
pub fn has_binary_alternative(doc: &Value) -> bool {
    any_node(doc, &mut |node| {
        let Value::Mapping(map) = node else {
            return false;
        };
        matches!(str_field(node, "format"), Some("byte" | "binary"))
            || str_field(node, "contentEncoding") == Some("base64")
            || map.contains_key(OCTET_STREAM)
    })
}

fn find_sample_arrays(node: &Value, address: String, names: &HashSet<String>, found: &mut Vec<SampleArrayProperty>) {
    match node {
        Value::Mapping(_) => {
            if let Some(props) = field(node, "properties") {
                let base = child_address(&address, "properties");
                for (name, schema) in entries(props) {
                    if !names.contains(&name.to_lowercase()) {
                        continue;
                    }
                    if let Some(item_type) = numeric_array_item_type(schema) {
                        found.push(SampleArrayProperty {
                            address: child_address(&base, &name),
                            property: name.into_owned(),
                            item_type: item_type.to_string(),
                        });
                    }
                }
            }
            for (key, value) in entries(node) {
                find_sample_arrays(value, child_address(&address, &key), names, found);
            }
        }
        Value::Sequence(seq) => {
            for (index, item) in seq.iter().enumerate() {
                find_sample_arrays(item, index_address(&address, index), names, found);
            }
        }
        Value::Tagged(tagged) => find_sample_arrays(&tagged.value, address, names, found),
        _ => {}
    }
}

/// Item type of an `array` of `number`/`integer` schema
fn numeric_array_item_type(schema: &Value) -> Option<&str> {
    if !has_type(schema, "array") {
        return None;
    }
    let items = field(schema, "items")?;
    ["number", "integer"].into_iter().find(|t| has_type(items, t))
}

/// `type: t` or, for 3.1 documents, `type: [t, ...]`
fn has_type(schema: &Value, t: &str) -> bool {
    match field(schema, "type") {
        Some(Value::String(s)) => s == t,
        Some(Value::Sequence(types)) => types.iter().any(|v| v.as_str() == Some(t)),
        _ => false,
    }
}

fn fixed_estimates() -> Vec<EncodingEstimate> {
    vec![
        EncodingEstimate {
            encoding: "float32".to_string(),
            bytes_per_sample: 4,
            json_bytes_per_sample: "8-20".to_string(),
            expansion: "~2-5x larger as JSON text (~1.33x as base64)".to_string(),
        },
        EncodingEstimate {
            encoding: "int16".to_string(),
            bytes_per_sample: 2,
            json_bytes_per_sample: "2-7".to_string(),
            expansion: "~1.5-3.5x larger as JSON text (~1.33x as base64)".to_string(),
        },
    ]
}
