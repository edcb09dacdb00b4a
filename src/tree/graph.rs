// Projection of a ModuleTree into a directed graph

use crate::tree::node::NodeKind;
use crate::tree::registry::ModuleTree;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Graph vertex: a node id and, for ids the tree holds, its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// `None` for ids only referenced as a parent or child
    pub kind: Option<NodeKind>,
}

/// Directed graph with `parent -> child` edges
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    graph: DiGraph<GraphNode, ()>,
    index: HashMap<String, NodeIndex>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex, or fill in the kind of a bare one
    pub fn add_node(&mut self, id: &str, kind: Option<NodeKind>) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            if kind.is_some() && self.graph[idx].kind.is_none() {
                self.graph[idx].kind = kind;
            }
            return idx;
        }

        let idx = self.graph.add_node(GraphNode {
            id: id.to_string(),
            kind,
        });
        self.index.insert(id.to_string(), idx);
        idx
    }

    /// Add `from -> to`; adding an existing edge changes nothing
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from = self.add_node(from, None);
        let to = self.add_node(to, None);
        self.graph.update_edge(from, to, ());
    }

    pub fn nodes(&self) -> BTreeSet<&str> {
        self.graph.node_weights().map(|n| n.id.as_str()).collect()
    }

    pub fn edges(&self) -> BTreeSet<(&str, &str)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a].id.as_str(), self.graph[b].id.as_str()))
            .collect()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    pub fn kind_of(&self, id: &str) -> Option<NodeKind> {
        self.index.get(id).and_then(|&idx| self.graph[idx].kind)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Targets of edges leaving `id`, sorted
    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Sources of edges entering `id`, sorted
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// The underlying petgraph graph
    pub fn inner(&self) -> &DiGraph<GraphNode, ()> {
        &self.graph
    }

    /// Sorted, serializable copy of the graph
    pub fn export(&self) -> GraphExport {
        let mut nodes: Vec<GraphNode> = self.graph.node_weights().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let edges = self
            .edges()
            .into_iter()
            .map(|(from, to)| GraphEdge {
                from: from.to_string(),
                to: to.to_string(),
            })
            .collect();

        GraphExport { nodes, edges }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

/// Serializable form of a [`ModuleGraph`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Build the graph of a tree.
///
/// Every node becomes a vertex carrying its kind. Each recorded child gives
/// an edge `node -> child` and each parent an edge `parent -> node`, so a
/// link recorded on both sides yields one edge. Ids that are only referenced
/// become bare vertices.
pub fn tree_to_graph(tree: &ModuleTree) -> ModuleGraph {
    let mut graph = ModuleGraph::new();

    for node in tree.nodes() {
        graph.add_node(node.id(), Some(node.kind()));
    }

    for node in tree.nodes() {
        for child in &node.children {
            graph.add_edge(node.id(), child);
        }
        for parent in &node.parents {
            graph.add_edge(parent, node.id());
        }
    }

    graph
}
