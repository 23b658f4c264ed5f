//! Cycle Detection
//!
//! Depth-first search with white/gray/black coloring. Reaching a gray vertex
//! (one on the current stack) marks every vertex on the stack as cyclic, not
//! only the members of the closed cycle. This over-approximates membership
//! when a stack passes through an acyclic prefix before entering a cycle.

use petgraph::graph::NodeIndex;
use std::collections::BTreeSet;

use super::{SchemaGraph, SchemaName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

struct CycleSearch<'g> {
    graph: &'g SchemaGraph,
    color: Vec<Color>,
    stack: Vec<NodeIndex>,
    cyclic: BTreeSet<NodeIndex>,
}

impl<'g> CycleSearch<'g> {
    fn new(graph: &'g SchemaGraph) -> Self {
        Self {
            graph,
            color: vec![Color::White; graph.graph.node_count()],
            stack: Vec::new(),
            cyclic: BTreeSet::new(),
        }
    }

    fn visit(&mut self, idx: NodeIndex) {
        match self.color[idx.index()] {
            Color::Gray => {
                self.cyclic.extend(self.stack.iter().copied());
                return;
            }
            Color::Black => return,
            Color::White => {}
        }

        self.color[idx.index()] = Color::Gray;
        self.stack.push(idx);
        for next in self.graph.successors(idx) {
            self.visit(next);
        }
        self.stack.pop();
        self.color[idx.index()] = Color::Black;
    }
}

/// Names of schemas flagged as taking part in a cycle, sorted
pub fn find_cyclic_schemas(graph: &SchemaGraph) -> Vec<SchemaName> {
    let mut search = CycleSearch::new(graph);
    for idx in graph.graph.node_indices() {
        search.visit(idx);
    }

    let names: BTreeSet<&SchemaName> = search
        .cyclic
        .iter()
        .filter_map(|&idx| graph.graph.node_weight(idx))
        .collect();
    names.into_iter().cloned().collect()
}
