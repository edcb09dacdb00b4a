//! The module tree and its graph projection.
//!
//! [`ScopeWalker`] drives a [`MetadataProvider`](crate::provider::MetadataProvider)
//! to fill a [`ModuleTree`] with [`TreeNode`]s; [`tree_to_graph`] turns the
//! finished tree into a [`ModuleGraph`].

pub mod graph;
pub mod node;
pub mod registry;
pub mod walker;

pub use graph::{tree_to_graph, GraphEdge, GraphExport, GraphNode, ModuleGraph};
pub use node::{node_id, NodeKind, NodePayload, TreeNode};
pub use registry::{AddReport, DanglingParent, Insertion, ModuleTree, TreeStats};
pub use walker::{ScopeWalker, WalkOptions};
