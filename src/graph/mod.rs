//! Schema Reference Graph
//!
//! Directed graph over the named component schemas of one document, using
//! petgraph. An edge `A -> B` means A's definition contains an internal
//! `$ref` to B; the edge weight records the keyword that carried it.
//! Inline schemas are not vertices.

pub mod cycles;
pub mod depth;
pub mod locator;

pub use cycles::find_cyclic_schemas;
pub use depth::{max_named_depth, DepthComputer};
pub use locator::{locate_schemas, SchemaSite, SchemaSites, SiteKind};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::document::{entries, field, mapping, schema_ref_name};

/// Name of a `components.schemas` entry
pub type SchemaName = String;

/// Keyword under which a reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// `$ref` directly on the schema, or under a keyword not listed below
    Ref,
    /// allOf composition
    AllOf,
    /// oneOf union branch
    OneOf,
    /// anyOf union branch
    AnyOf,
    /// array element schema
    Items,
    /// map value schema
    AdditionalProperties,
    /// property schema
    Property,
}

impl EdgeKind {
    /// Classify the schema keyword a child node hangs under
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "allOf" => Some(Self::AllOf),
            "oneOf" => Some(Self::OneOf),
            "anyOf" => Some(Self::AnyOf),
            "items" => Some(Self::Items),
            "additionalProperties" => Some(Self::AdditionalProperties),
            "properties" => Some(Self::Property),
            _ => None,
        }
    }

    /// DOT edge label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ref => "$ref",
            Self::AllOf => "allOf",
            Self::OneOf => "oneOf",
            Self::AnyOf => "anyOf",
            Self::Items => "items",
            Self::AdditionalProperties => "additionalProperties",
            Self::Property => "properties",
        }
    }
}

/// The named-schema dependency graph
#[derive(Debug, Default)]
pub struct SchemaGraph {
    /// Vertices in `components.schemas` order
    pub(crate) graph: DiGraph<SchemaName, EdgeKind>,

    /// Node index lookup: name -> NodeIndex
    pub(crate) node_indices: HashMap<SchemaName, NodeIndex>,
}

impl SchemaGraph {
    /// Build the graph from the mapping-valued entries of `components.schemas`.
    ///
    /// Each source gets at most one edge per target (the first keyword seen
    /// wins). References to names that are not vertices are dropped.
    pub fn from_document(doc: &Value) -> Self {
        let mut graph = SchemaGraph::default();
        let schemas: Vec<(String, &Value)> = field(doc, "components")
            .and_then(|components| field(components, "schemas"))
            .into_iter()
            .flat_map(entries)
            .filter(|(_, schema)| mapping(schema).is_some())
            .map(|(name, schema)| (name.into_owned(), schema))
            .collect();

        for (name, _) in &schemas {
            if !graph.node_indices.contains_key(name) {
                let idx = graph.graph.add_node(name.clone());
                graph.node_indices.insert(name.clone(), idx);
            }
        }

        for (name, schema) in &schemas {
            let source = graph.node_indices[name];
            let mut seen = HashSet::new();
            let mut refs = Vec::new();
            collect_schema_refs(schema, EdgeKind::Ref, &mut refs);

            for (target, kind) in refs {
                let Some(&target_idx) = graph.node_indices.get(target) else {
                    continue;
                };
                if seen.insert(target_idx) {
                    graph.graph.add_edge(source, target_idx, kind);
                }
            }
        }

        debug!(
            schemas = graph.schema_count(),
            edges = graph.edge_count(),
            "built schema graph"
        );
        graph
    }

    // ========== Public API ==========

    /// Get schema count
    pub fn schema_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }

    /// Schema names in document order
    pub fn names(&self) -> impl Iterator<Item = &SchemaName> {
        self.graph.node_indices().filter_map(|idx| self.graph.node_weight(idx))
    }

    /// Get immediate outgoing refs (dependencies), in insertion order
    pub fn refs_out(&self, name: &str) -> Vec<&SchemaName> {
        let Some(&node_idx) = self.node_indices.get(name) else {
            return Vec::new();
        };

        let mut out: Vec<&SchemaName> = self
            .graph
            .edges_directed(node_idx, Direction::Outgoing)
            .filter_map(|e| self.graph.node_weight(e.target()))
            .collect();
        out.reverse();
        out
    }

    /// Get immediate incoming refs (dependents), in insertion order
    pub fn refs_in(&self, name: &str) -> Vec<&SchemaName> {
        let Some(&node_idx) = self.node_indices.get(name) else {
            return Vec::new();
        };

        let mut incoming: Vec<&SchemaName> = self
            .graph
            .edges_directed(node_idx, Direction::Incoming)
            .filter_map(|e| self.graph.node_weight(e.source()))
            .collect();
        incoming.reverse();
        incoming
    }

    /// Keyword that carried the reference `from -> to`
    pub fn edge_kind(&self, from: &str, to: &str) -> Option<EdgeKind> {
        let from = *self.node_indices.get(from)?;
        let to = *self.node_indices.get(to)?;
        self.graph
            .find_edge(from, to)
            .and_then(|e| self.graph.edge_weight(e))
            .copied()
    }

    /// Successor indices of `idx`, in insertion order
    pub(crate) fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        next.reverse();
        next
    }

    /// Export the graph to GraphViz DOT format, cyclic schemas highlighted
    pub fn to_dot(&self) -> String {
        let cyclic: HashSet<String> = find_cyclic_schemas(self).into_iter().collect();
        let mut output = String::new();

        output.push_str("digraph SchemaGraph {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8, fontcolor=\"#606060\"];\n");
        output.push('\n');

        for name in self.names() {
            let fill = if cyclic.contains(name) { "#F44336" } else { "#E0E0E0" };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\", fillcolor=\"{}\"];\n",
                dot_escape(name),
                dot_escape(name),
                fill
            ));
        }

        output.push('\n');

        for edge in self.graph.edge_references() {
            if let (Some(source), Some(target)) = (
                self.graph.node_weight(edge.source()),
                self.graph.node_weight(edge.target()),
            ) {
                output.push_str(&format!(
                    "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                    dot_escape(source),
                    dot_escape(target),
                    edge.weight().label()
                ));
            }
        }

        output.push_str("}\n");
        output
    }
}

fn dot_escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Collect `(target name, keyword)` for every internal schema reference below `node`.
///
/// The keyword is the innermost classified keyword above the `$ref`.
fn collect_schema_refs<'a>(node: &'a Value, kind: EdgeKind, refs: &mut Vec<(&'a str, EdgeKind)>) {
    match node {
        Value::Mapping(map) => {
            for (key, value) in map {
                let key = key.as_str().unwrap_or_default();
                if key == "$ref" {
                    if let Some(name) = value.as_str().and_then(schema_ref_name) {
                        refs.push((name, kind));
                    }
                    continue;
                }
                let child_kind = EdgeKind::from_keyword(key).unwrap_or(kind);
                collect_schema_refs(value, child_kind, refs);
            }
        }
        Value::Sequence(seq) => {
            for item in seq {
                collect_schema_refs(item, kind, refs);
            }
        }
        Value::Tagged(tagged) => collect_schema_refs(&tagged.value, kind, refs),
        _ => {}
    }
}
