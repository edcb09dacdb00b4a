//! classy-mermaid - Build class and module trees from codebases
//!
//! Walks the scopes of a codebase through a [`MetadataProvider`], collects
//! modules, classes and functions into a [`ModuleTree`] with parent/child
//! links, and projects the tree into a directed [`ModuleGraph`].

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod parser;
pub mod provider;
pub mod tree;

// Re-export main types
pub use config::Config;
pub use diagnostics::{Diagnostics, RecordingDiagnostics, TracingDiagnostics, WalkEvent};
pub use error::{Error, Result};
pub use provider::{Member, MemberKind, MetadataProvider, PythonProvider, ScopeHandle, StaticProvider};
pub use tree::{tree_to_graph, ModuleGraph, ModuleTree, NodeKind, ScopeWalker, TreeNode, WalkOptions};
