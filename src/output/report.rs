// Walk reports
//
// JSON carries the full tree plus the projected graph. Text is a summary
// line followed by one `parent --> child` line per graph edge.

use crate::error::Result;
use crate::tree::{GraphExport, ModuleGraph, ModuleTree, TreeNode, TreeStats};
use serde::Serialize;
use std::fmt::Write;

/// Everything a walk produced, ready for serialization
#[derive(Debug, Serialize)]
pub struct WalkReport<'a> {
    pub project: &'a str,
    pub name: &'a str,
    pub stats: TreeStats,
    pub nodes: Vec<&'a TreeNode>,
    pub graph: GraphExport,
}

impl<'a> WalkReport<'a> {
    pub fn new(project: &'a str, tree: &'a ModuleTree, graph: &ModuleGraph) -> Self {
        Self {
            project,
            name: tree.name(),
            stats: tree.stats(),
            nodes: tree.nodes().collect(),
            graph: graph.export(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Plain text rendering of a walk
pub fn render_text(tree: &ModuleTree, graph: &ModuleGraph) -> String {
    let stats = tree.stats();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# {}: {} nodes ({} modules, {} classes, {} functions), {} edges",
        tree.name(),
        stats.nodes,
        stats.modules,
        stats.classes,
        stats.functions,
        graph.edge_count()
    );
    for (from, to) in graph.edges() {
        let _ = writeln!(out, "{} --> {}", from, to);
    }
    // Vertices without edges would otherwise not show up at all
    for id in graph.nodes() {
        if graph.successors(id).is_empty() && graph.predecessors(id).is_empty() {
            let _ = writeln!(out, "{}", id);
        }
    }
    out
}
