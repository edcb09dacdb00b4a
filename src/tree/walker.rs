// Recursive scope traversal
//
// Resolves a scope through a provider, enumerates its members, filters them
// and feeds the survivors into a shared ModuleTree, then recurses into the
// surviving sub-scopes until the depth limit is reached.

use crate::diagnostics::{Diagnostics, TracingDiagnostics, WalkEvent};
use crate::error::Result;
use crate::provider::{is_within, Member, MemberKind, MetadataProvider, ScopeHandle, ScopeRef};
use crate::tree::node::TreeNode;
use crate::tree::registry::ModuleTree;
use std::collections::{BTreeSet, HashSet};

/// Traversal options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Member names never added or entered
    pub ignore: BTreeSet<String>,
    /// Skip members whose binding starts with `_`
    pub skip_private: bool,
    /// Number of scope levels enumerated, the root being the first
    pub max_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            ignore: BTreeSet::new(),
            skip_private: true,
            max_depth: 2,
        }
    }
}

impl WalkOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_skip_private(mut self, skip_private: bool) -> Self {
        self.skip_private = skip_private;
        self
    }

    pub fn ignoring<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Walks scopes of a [`MetadataProvider`] into a [`ModuleTree`]
pub struct ScopeWalker<'a, P: MetadataProvider + ?Sized> {
    provider: &'a P,
    options: WalkOptions,
    diagnostics: Box<dyn Diagnostics + 'a>,
}

impl<'a, P: MetadataProvider + ?Sized> ScopeWalker<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            options: WalkOptions::default(),
            diagnostics: Box::new(TracingDiagnostics),
        }
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'a) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Walk `scope` into a new tree named after it
    pub fn walk(&self, scope: impl Into<ScopeRef>) -> Result<ModuleTree> {
        let root = self.resolve(scope.into())?;
        let mut tree = ModuleTree::new(root.name.clone());
        self.walk_root(&root, &mut tree)?;
        Ok(tree)
    }

    /// Walk `scope` into an existing tree
    pub fn walk_into(&self, scope: impl Into<ScopeRef>, tree: &mut ModuleTree) -> Result<()> {
        let root = self.resolve(scope.into())?;
        self.walk_root(&root, tree)
    }

    fn resolve(&self, scope: ScopeRef) -> Result<ScopeHandle> {
        match scope {
            ScopeRef::Name(name) => self.provider.resolve(&name),
            ScopeRef::Handle(handle) => Ok(handle),
        }
    }

    fn walk_root(&self, root: &ScopeHandle, tree: &mut ModuleTree) -> Result<()> {
        self.diagnostics.info(&WalkEvent::TraversalStarted {
            scope: root.name.clone(),
            tree: tree.name().to_string(),
            max_depth: self.options.max_depth,
        });

        let mut visited = HashSet::new();
        visited.insert(root.name.clone());
        let mut ignore = self.options.ignore.clone();
        self.walk_scope(root, &root.name, tree, 0, &mut visited, &mut ignore)?;

        self.diagnostics.info(&WalkEvent::TraversalFinished {
            scope: root.name.clone(),
            nodes: tree.len(),
        });
        Ok(())
    }

    fn walk_scope(
        &self,
        scope: &ScopeHandle,
        root: &str,
        tree: &mut ModuleTree,
        depth: usize,
        visited: &mut HashSet<String>,
        ignore: &mut BTreeSet<String>,
    ) -> Result<()> {
        self.diagnostics.debug(&WalkEvent::ScopeEntered {
            scope: scope.name.clone(),
            depth,
        });

        let members = self.provider.members(scope)?;
        let total = members.len();

        let candidates: Vec<Member> = members
            .into_iter()
            .filter(|m| {
                matches!(
                    m.kind,
                    MemberKind::Module { .. } | MemberKind::Class { .. } | MemberKind::Function { .. }
                ) && !self.provider.is_builtin(m)
            })
            .collect();

        // Exclusions found here stay in force for every later scope
        for member in &candidates {
            if self.is_hidden(member, root) {
                ignore.insert(member.binding.clone());
            }
        }

        let mut submodules = Vec::new();
        let mut classes = Vec::new();
        let mut functions = Vec::new();
        let mut excluded = 0;
        for member in candidates {
            if ignore.contains(&member.binding) || ignore.contains(&member.name) {
                excluded += 1;
                continue;
            }
            match member.kind {
                MemberKind::Module { .. } => submodules.push(member),
                MemberKind::Class { .. } => classes.push(member),
                _ => functions.push(member),
            }
        }

        self.diagnostics.debug(&WalkEvent::ScopeEnumerated {
            scope: scope.name.clone(),
            members: total,
            submodules: submodules.len(),
            classes: classes.len(),
            functions: functions.len(),
            excluded,
        });

        let nodes = submodules
            .iter()
            .chain(&classes)
            .chain(&functions)
            .map(TreeNode::from_member)
            .collect::<Result<Vec<_>>>()?;
        let report = tree.add_nodes(nodes);
        for missing in report.dangling {
            self.diagnostics.debug(&WalkEvent::ParentMissing {
                child: missing.child,
                parent: missing.parent,
            });
        }

        self.diagnostics.debug(&WalkEvent::ScopeFinished {
            scope: scope.name.clone(),
            added: report.added.len(),
        });

        let depth = depth + 1;
        if depth >= self.options.max_depth || submodules.is_empty() {
            return Ok(());
        }

        for submodule in &submodules {
            if !visited.insert(submodule.name.clone()) {
                continue;
            }
            let handle = self.provider.resolve(&submodule.name)?;
            self.walk_scope(&handle, root, tree, depth, visited, ignore)?;
        }

        Ok(())
    }

    /// Private or declared outside `root`
    fn is_hidden(&self, member: &Member, root: &str) -> bool {
        (self.options.skip_private && member.binding.starts_with('_'))
            || !is_within(&member.declaring_scope, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::error::Error;
    use crate::provider::{MemberSpec, StaticProvider, StaticScope};
    use crate::tree::graph::tree_to_graph;
    use crate::tree::node::NodeKind;

    fn walk(provider: &StaticProvider, scope: &str, options: WalkOptions) -> ModuleTree {
        ScopeWalker::new(provider)
            .with_options(options)
            .walk(scope)
            .unwrap()
    }

    #[test]
    fn test_base_and_derived() {
        let provider = StaticProvider::new().with_scope(
            StaticScope::new("app")
                .class("Base", &[])
                .class("Derived", &["Base"]),
        );
        let tree = walk(&provider, "app", WalkOptions::default().with_max_depth(1));

        assert_eq!(tree.name(), "app");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get("Base").unwrap().children, vec!["Derived".to_string()]);
        assert_eq!(tree.get("Derived").unwrap().parents, vec!["Base".to_string()]);
        assert_eq!(tree.get("Derived").unwrap().tree(), Some("app"));

        let graph = tree_to_graph(&tree);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges().into_iter().collect::<Vec<_>>(), vec![("Base", "Derived")]);
    }

    #[test]
    fn test_cycle_enters_each_scope_once() {
        let provider = StaticProvider::new()
            .with_scope(StaticScope::new("app").module("b", "app.b"))
            .with_scope(
                StaticScope::new("app.b")
                    .module("app", "app")
                    .module("c", "app.b.c")
                    .class("Node", &[]),
            )
            .with_scope(StaticScope::new("app.b.c").module("b", "app.b"));

        let rec = RecordingDiagnostics::new();
        let tree = ScopeWalker::new(&provider)
            .with_options(WalkOptions::default().with_max_depth(50))
            .with_diagnostics(&rec)
            .walk("app")
            .unwrap();

        assert_eq!(
            rec.entered_scopes(),
            vec!["app".to_string(), "app.b".to_string(), "app.b.c".to_string()]
        );
        assert!(tree.contains("app.b"));
        assert!(tree.contains("app.b.c"));
        assert!(tree.contains("Node"));
    }

    #[test]
    fn test_depth_bound() {
        let provider = StaticProvider::new()
            .with_scope(StaticScope::new("app").module("a", "app.a"))
            .with_scope(StaticScope::new("app.a").module("b", "app.a.b"))
            .with_scope(StaticScope::new("app.a.b").module("c", "app.a.b.c"))
            .with_scope(StaticScope::new("app.a.b.c").class("Deep", &[]));

        let rec = RecordingDiagnostics::new();
        let tree = ScopeWalker::new(&provider)
            .with_diagnostics(&rec)
            .walk("app")
            .unwrap();

        assert_eq!(rec.entered_scopes(), vec!["app".to_string(), "app.a".to_string()]);
        assert!(tree.contains("app.a.b"));
        assert!(!tree.contains("app.a.b.c"));
        assert!(!tree.contains("Deep"));
    }

    #[test]
    fn test_depth_one_stays_in_root() {
        let provider = StaticProvider::new()
            .with_scope(StaticScope::new("app").module("models", "app.models"))
            .with_scope(StaticScope::new("app.models").class("User", &[]));

        let tree = walk(&provider, "app", WalkOptions::default().with_max_depth(1));
        assert!(tree.contains("app.models"));
        assert!(!tree.contains("User"));
    }

    #[test]
    fn test_private_members_skipped() {
        let provider = StaticProvider::new().with_scope(
            StaticScope::new("app")
                .class("Public", &[])
                .class("_Hidden", &[])
                .function("_helper", &[])
                .module("_internal", "app._internal"),
        );

        let tree = walk(&provider, "app", WalkOptions::default().with_max_depth(1));
        assert!(tree.contains("Public"));
        assert!(!tree.contains("_Hidden"));
        assert!(!tree.contains("_helper"));
        assert!(!tree.contains("app._internal"));

        let tree = walk(
            &provider,
            "app",
            WalkOptions::default().with_max_depth(1).with_skip_private(false),
        );
        assert!(tree.contains("_Hidden"));
        assert!(tree.contains("_helper"));
    }

    #[test]
    fn test_origin_filter() {
        let provider = StaticProvider::new().with_scope(
            StaticScope::new("app")
                .class("Local", &[])
                .with(MemberSpec::class("Vendor", &[]).declared_in("vendor.lib"))
                .with(MemberSpec::class("Lookalike", &[]).declared_in("application"))
                .with(MemberSpec::function("nested", &[]).declared_in("app.utils")),
        );

        let tree = walk(&provider, "app", WalkOptions::default().with_max_depth(1));
        assert!(tree.contains("Local"));
        assert!(tree.contains("nested"));
        assert!(!tree.contains("Vendor"));
        assert!(!tree.contains("Lookalike"));
    }

    #[test]
    fn test_origin_is_checked_against_root_in_sub_scopes() {
        let provider = StaticProvider::new()
            .with_scope(StaticScope::new("app").module("models", "app.models"))
            .with_scope(
                StaticScope::new("app.models")
                    .with(MemberSpec::class("Base", &[]).declared_in("app.base"))
                    .with(MemberSpec::class("Foreign", &[]).declared_in("other")),
            );

        let tree = walk(&provider, "app", WalkOptions::default());
        assert!(tree.contains("Base"));
        assert!(!tree.contains("Foreign"));
    }

    #[test]
    fn test_imported_name_stays_excluded_in_sub_scopes() {
        let provider = StaticProvider::new()
            .with_scope(
                StaticScope::new("app")
                    .with(MemberSpec::class("Helper", &[]).declared_in("vendor"))
                    .module("sub", "app.sub"),
            )
            .with_scope(
                StaticScope::new("app.sub")
                    .class("Helper", &[])
                    .class("Worker", &["Helper"]),
            );

        let rec = RecordingDiagnostics::new();
        let tree = ScopeWalker::new(&provider)
            .with_diagnostics(&rec)
            .walk("app")
            .unwrap();

        assert_eq!(rec.entered_scopes(), vec!["app".to_string(), "app.sub".to_string()]);
        assert_eq!(tree.ids().collect::<Vec<_>>(), vec!["app.sub", "Worker"]);
    }

    #[test]
    fn test_separate_walks_do_not_share_exclusions() {
        let provider = StaticProvider::new()
            .with_scope(
                StaticScope::new("app")
                    .with(MemberSpec::class("Helper", &[]).declared_in("vendor")),
            )
            .with_scope(StaticScope::new("vendor").class("Helper", &[]));

        let walker = ScopeWalker::new(&provider);
        assert!(walker.walk("app").unwrap().is_empty());
        assert!(walker.walk("vendor").unwrap().contains("Helper"));
        assert!(walker.options().ignore.is_empty());
    }

    #[test]
    fn test_ignore_list() {
        let provider = StaticProvider::new()
            .with_scope(
                StaticScope::new("app")
                    .module("legacy", "app.legacy")
                    .class("Keep", &[])
                    .class("Drop", &[]),
            )
            .with_scope(StaticScope::new("app.legacy").class("Old", &[]));

        let rec = RecordingDiagnostics::new();
        let tree = ScopeWalker::new(&provider)
            .with_options(WalkOptions::default().ignoring(["legacy", "Drop"]))
            .with_diagnostics(&rec)
            .walk("app")
            .unwrap();

        assert!(tree.contains("Keep"));
        assert!(!tree.contains("Drop"));
        assert!(!tree.contains("app.legacy"));
        assert!(!tree.contains("Old"));
        assert_eq!(rec.entered_scopes(), vec!["app".to_string()]);
    }

    #[test]
    fn test_builtins_excluded_and_unknown_parent_reported() {
        let provider = StaticProvider::new().with_scope(
            StaticScope::new("app")
                .class("Model", &["object"])
                .with(MemberSpec::function("len", &["obj"]).declared_in("builtins"))
                .with(MemberSpec::class("object", &[]).declared_in("builtins")),
        );

        let rec = RecordingDiagnostics::new();
        let tree = ScopeWalker::new(&provider)
            .with_diagnostics(&rec)
            .walk("app")
            .unwrap();

        assert_eq!(tree.ids().collect::<Vec<_>>(), vec!["Model"]);
        assert_eq!(
            rec.missing_parents(),
            vec![("Model".to_string(), "object".to_string())]
        );
    }

    #[test]
    fn test_non_candidate_kinds_ignored() {
        let provider = StaticProvider::new().with_scope(
            StaticScope::new("app")
                .attribute("VERSION")
                .opaque("handle")
                .with(MemberSpec::method("bound"))
                .function("run", &["argv"]),
        );

        let tree = walk(&provider, "app", WalkOptions::default());
        assert_eq!(tree.ids().collect::<Vec<_>>(), vec!["run"]);
        assert_eq!(tree.get("run").unwrap().kind(), NodeKind::Function);
        assert_eq!(tree.get("run").unwrap().parents, vec!["app".to_string()]);
    }

    #[test]
    fn test_unresolvable_root() {
        let provider = StaticProvider::new();
        let err = ScopeWalker::new(&provider).walk("missing").unwrap_err();
        assert!(matches!(err, Error::ScopeResolution { scope } if scope == "missing"));
    }

    #[test]
    fn test_unresolvable_sub_scope_aborts() {
        let provider = StaticProvider::new()
            .with_scope(StaticScope::new("app").module("ghost", "app.ghost"));

        let err = ScopeWalker::new(&provider).walk("app").unwrap_err();
        assert!(matches!(err, Error::ScopeResolution { scope } if scope == "app.ghost"));
    }

    #[test]
    fn test_walk_resolved_handle() {
        let provider = StaticProvider::new().with_scope(StaticScope::new("app").class("A", &[]));
        let handle = provider.resolve("app").unwrap();
        let tree = ScopeWalker::new(&provider).walk(handle).unwrap();
        assert!(tree.contains("A"));
    }

    #[test]
    fn test_walk_into_shared_tree() {
        let provider = StaticProvider::new()
            .with_scope(StaticScope::new("core").class("Base", &[]))
            .with_scope(StaticScope::new("plugins").class("Plugin", &["core.Base"]));

        let walker = ScopeWalker::new(&provider);
        let mut tree = ModuleTree::new("all");
        walker.walk_into("core", &mut tree).unwrap();
        walker.walk_into("plugins", &mut tree).unwrap();

        assert_eq!(tree.get("Base").unwrap().children, vec!["Plugin".to_string()]);
        assert_eq!(tree.get("Plugin").unwrap().tree(), Some("all"));
    }

    #[test]
    fn test_traversal_events_bracket_the_walk() {
        let provider = StaticProvider::new().with_scope(StaticScope::new("app").class("A", &[]));
        let rec = RecordingDiagnostics::new();
        ScopeWalker::new(&provider)
            .with_diagnostics(&rec)
            .walk("app")
            .unwrap();

        let events = rec.events();
        assert_eq!(events.first().map(WalkEvent::name), Some("traversal_started"));
        assert_eq!(
            events.last(),
            Some(&WalkEvent::TraversalFinished {
                scope: "app".to_string(),
                nodes: 1
            })
        );
    }
}
