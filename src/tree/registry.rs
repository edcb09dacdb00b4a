// The module tree: owner of every node discovered by one traversal

use crate::tree::node::{NodeKind, TreeNode};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A parent id that was not in the tree when a child named it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingParent {
    pub child: String,
    pub parent: String,
}

/// Outcome of [`ModuleTree::add_node`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// Node inserted; lists the parent ids that were not present
    Added { dangling: Vec<String> },
    /// A node with the same id was already present; nothing changed
    Duplicate,
}

/// Aggregated outcome of several insertions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    pub added: Vec<String>,
    pub duplicates: Vec<String>,
    pub dangling: Vec<DanglingParent>,
}

impl AddReport {
    fn record(&mut self, id: &str, insertion: Insertion) {
        match insertion {
            Insertion::Added { dangling } => {
                self.added.push(id.to_string());
                self.dangling.extend(dangling.into_iter().map(|parent| DanglingParent {
                    child: id.to_string(),
                    parent,
                }));
            }
            Insertion::Duplicate => self.duplicates.push(id.to_string()),
        }
    }
}

/// Nodes keyed by id, in discovery order.
///
/// Nodes are never removed. Adding an id that is already present is a
/// no-op: the first node wins and the later one's relationships are
/// dropped. A new node is appended to the `children` of each of its
/// parents that is already in the tree; parents added afterwards do not
/// pick up the link.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleTree {
    name: String,
    nodes: Vec<TreeNode>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ModuleTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a node unless its id is already present
    pub fn add_node(&mut self, mut node: TreeNode) -> Insertion {
        if self.index.contains_key(node.id()) {
            return Insertion::Duplicate;
        }

        node.attach(&self.name);
        let id = node.id().to_string();
        let parents = node.parents.clone();
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(node);

        let mut dangling = Vec::new();
        for parent_id in parents {
            match self.index.get(&parent_id) {
                Some(&idx) => {
                    let parent = &mut self.nodes[idx];
                    if !parent.children.contains(&id) {
                        parent.children.push(id.clone());
                    }
                }
                None => dangling.push(parent_id),
            }
        }

        Insertion::Added { dangling }
    }

    /// Add nodes one after another
    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = TreeNode>) -> AddReport {
        let mut report = AddReport::default();
        for node in nodes {
            let id = node.id().to_string();
            let insertion = self.add_node(node);
            report.record(&id, insertion);
        }
        report
    }

    /// Move every node of another traversal into this tree, in that
    /// traversal's discovery order, through [`ModuleTree::add_node`].
    pub fn merge(&mut self, other: ModuleTree) -> AddReport {
        self.add_nodes(other.nodes)
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in discovery order
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(TreeNode::id)
    }

    pub fn of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    pub fn modules(&self) -> impl Iterator<Item = &TreeNode> {
        self.of_kind(NodeKind::Module)
    }

    pub fn classes(&self) -> impl Iterator<Item = &TreeNode> {
        self.of_kind(NodeKind::Class)
    }

    pub fn functions(&self) -> impl Iterator<Item = &TreeNode> {
        self.of_kind(NodeKind::Function)
    }

    /// Nodes that relate up to at least one id
    pub fn nodes_with_parents(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|n| !n.parents.is_empty())
    }

    /// Nodes that gained at least one child
    pub fn nodes_with_children(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|n| !n.children.is_empty())
    }

    /// Recorded children of `id` that are nodes of this tree
    pub fn children_of<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a TreeNode> + 'a {
        self.get(id)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(move |child| self.get(child))
    }

    /// Children of `id` of one kind: the submodules, classes or functions
    /// hanging off a node
    pub fn children_of_kind<'a>(
        &'a self,
        id: &str,
        kind: NodeKind,
    ) -> impl Iterator<Item = &'a TreeNode> + 'a {
        self.children_of(id).filter(move |n| n.kind() == kind)
    }

    pub fn stats(&self) -> TreeStats {
        let count = |kind| self.of_kind(kind).count();
        TreeStats {
            nodes: self.nodes.len(),
            modules: count(NodeKind::Module),
            classes: count(NodeKind::Class),
            functions: count(NodeKind::Function),
            links: self.nodes.iter().map(|n| n.children.len()).sum(),
        }
    }
}

impl fmt::Display for ModuleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ModuleTree({})", self.name)?;
        for (label, kind) in [
            ("modules", NodeKind::Module),
            ("classes", NodeKind::Class),
            ("functions", NodeKind::Function),
        ] {
            writeln!(f, "  {}:", label)?;
            for node in self.of_kind(kind) {
                writeln!(f, "    - {}", node)?;
            }
        }
        Ok(())
    }
}

/// Counts over a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub nodes: usize,
    pub modules: usize,
    pub classes: usize,
    pub functions: usize,
    /// Recorded parent -> child links
    pub links: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, parents: &[&str]) -> TreeNode {
        TreeNode::class(name, "app", parents.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn test_empty_tree() {
        let tree = ModuleTree::new("app");
        assert_eq!(tree.name(), "app");
        assert!(tree.is_empty());
        assert_eq!(tree.stats().nodes, 0);
    }

    #[test]
    fn test_add_node_attaches_tree() {
        let mut tree = ModuleTree::new("app");
        tree.add_node(class("Base", &[]));
        assert_eq!(tree.get("Base").unwrap().tree(), Some("app"));
    }

    #[test]
    fn test_idempotent_insertion() {
        let mut tree = ModuleTree::new("app");
        assert_eq!(
            tree.add_node(class("Base", &[])),
            Insertion::Added { dangling: vec![] }
        );
        let before = tree.get("Base").cloned();

        assert_eq!(tree.add_node(class("Base", &["Other"])), Insertion::Duplicate);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get("Base").cloned(), before);
    }

    #[test]
    fn test_child_linked_when_parent_present() {
        let mut tree = ModuleTree::new("app");
        tree.add_node(class("Base", &[]));
        tree.add_node(class("Derived", &["Base"]));
        assert_eq!(tree.get("Base").unwrap().children, vec!["Derived".to_string()]);
    }

    #[test]
    fn test_parent_added_late_does_not_gain_child() {
        let mut tree = ModuleTree::new("app");
        let insertion = tree.add_node(class("Derived", &["Base"]));
        assert_eq!(
            insertion,
            Insertion::Added {
                dangling: vec!["Base".to_string()]
            }
        );

        tree.add_node(class("Base", &[]));
        assert!(tree.get("Base").unwrap().children.is_empty());
        assert_eq!(tree.get("Derived").unwrap().parents, vec!["Base".to_string()]);
    }

    #[test]
    fn test_children_not_duplicated() {
        let mut tree = ModuleTree::new("app");
        tree.add_node(TreeNode::module("app.models", "app"));
        let mut twice = TreeNode::function("build", "app.models", Vec::new());
        twice.parents.push("app.models".to_string());
        tree.add_node(twice);

        assert_eq!(
            tree.get("app.models").unwrap().children,
            vec!["build".to_string()]
        );
    }

    #[test]
    fn test_add_nodes_report() {
        let mut tree = ModuleTree::new("app");
        let report = tree.add_nodes(vec![
            class("Derived", &["Base", "Mixin"]),
            class("Base", &[]),
            class("Derived", &[]),
        ]);

        assert_eq!(report.added, vec!["Derived".to_string(), "Base".to_string()]);
        assert_eq!(report.duplicates, vec!["Derived".to_string()]);
        assert_eq!(report.dangling.len(), 2);
        assert_eq!(report.dangling[0].child, "Derived");
        assert_eq!(report.dangling[0].parent, "Base");
    }

    #[test]
    fn test_kind_views() {
        let mut tree = ModuleTree::new("app");
        tree.add_nodes(vec![
            TreeNode::module("app.models", "app"),
            class("Base", &[]),
            TreeNode::function("helper", "app.models", Vec::new()),
        ]);

        assert_eq!(tree.modules().count(), 1);
        assert_eq!(tree.classes().map(TreeNode::id).collect::<Vec<_>>(), vec!["Base"]);
        assert_eq!(tree.functions().count(), 1);
        assert_eq!(tree.nodes_with_parents().count(), 1);
        assert_eq!(
            tree.nodes_with_children().map(TreeNode::id).collect::<Vec<_>>(),
            vec!["app.models"]
        );
    }

    #[test]
    fn test_children_of_kind() {
        let mut tree = ModuleTree::new("app");
        tree.add_nodes(vec![
            TreeNode::module("app.models", "app"),
            TreeNode::function("helper", "app.models", Vec::new()),
            TreeNode::class("Model", "app.models", vec!["app.models".to_string()]),
        ]);

        let functions: Vec<&str> = tree
            .children_of_kind("app.models", NodeKind::Function)
            .map(TreeNode::id)
            .collect();
        assert_eq!(functions, vec!["helper"]);
        assert_eq!(tree.children_of("app.models").count(), 2);
        assert_eq!(tree.children_of("missing").count(), 0);
    }

    #[test]
    fn test_merge_uses_insertion_rules() {
        let mut first = ModuleTree::new("app");
        first.add_node(class("Base", &[]));

        let mut second = ModuleTree::new("plugins");
        second.add_nodes(vec![class("Plugin", &["Base"]), class("Base", &["Other"])]);

        let report = first.merge(second);
        assert_eq!(report.added, vec!["Plugin".to_string()]);
        assert_eq!(report.duplicates, vec!["Base".to_string()]);
        assert_eq!(first.len(), 2);
        assert_eq!(first.get("Base").unwrap().children, vec!["Plugin".to_string()]);
        assert!(first.get("Base").unwrap().parents.is_empty());
        assert_eq!(first.get("Plugin").unwrap().tree(), Some("app"));
    }

    #[test]
    fn test_stats() {
        let mut tree = ModuleTree::new("app");
        tree.add_nodes(vec![class("Base", &[]), class("Derived", &["Base"])]);
        let stats = tree.stats();
        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.classes, 2);
        assert_eq!(stats.modules, 0);
        assert_eq!(stats.links, 1);
    }

    #[test]
    fn test_display_lists_kinds() {
        let mut tree = ModuleTree::new("app");
        tree.add_nodes(vec![TreeNode::module("app.models", "app"), class("Base", &[])]);
        let text = tree.to_string();
        assert!(text.starts_with("ModuleTree(app)"));
        assert!(text.contains("- Module(app.models)"));
        assert!(text.contains("- Class(Base)"));
    }
}
