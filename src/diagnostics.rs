//! Traversal diagnostics.
//!
//! The walker reports progress through an injected [`Diagnostics`] sink
//! instead of a global logger. Events are advisory: a sink cannot change the
//! outcome of a traversal.

use std::cell::RefCell;
use std::fmt;

/// Something that happened during a traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    TraversalStarted {
        scope: String,
        tree: String,
        max_depth: usize,
    },
    ScopeEntered {
        scope: String,
        depth: usize,
    },
    /// Candidates found in a scope, after filtering
    ScopeEnumerated {
        scope: String,
        members: usize,
        submodules: usize,
        classes: usize,
        functions: usize,
        excluded: usize,
    },
    /// A node named a parent that was not (yet) in the tree
    ParentMissing {
        child: String,
        parent: String,
    },
    ScopeFinished {
        scope: String,
        added: usize,
    },
    TraversalFinished {
        scope: String,
        nodes: usize,
    },
}

impl WalkEvent {
    /// Short event name, usable as a structured field
    pub fn name(&self) -> &'static str {
        match self {
            WalkEvent::TraversalStarted { .. } => "traversal_started",
            WalkEvent::ScopeEntered { .. } => "scope_entered",
            WalkEvent::ScopeEnumerated { .. } => "scope_enumerated",
            WalkEvent::ParentMissing { .. } => "parent_missing",
            WalkEvent::ScopeFinished { .. } => "scope_finished",
            WalkEvent::TraversalFinished { .. } => "traversal_finished",
        }
    }

    /// Scope the event concerns; the child id for `ParentMissing`
    pub fn scope(&self) -> &str {
        match self {
            WalkEvent::TraversalStarted { scope, .. }
            | WalkEvent::ScopeEntered { scope, .. }
            | WalkEvent::ScopeEnumerated { scope, .. }
            | WalkEvent::ScopeFinished { scope, .. }
            | WalkEvent::TraversalFinished { scope, .. } => scope,
            WalkEvent::ParentMissing { child, .. } => child,
        }
    }
}

impl fmt::Display for WalkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkEvent::TraversalStarted {
                scope,
                tree,
                max_depth,
            } => write!(
                f,
                "walking `{}` into tree `{}` (max depth {})",
                scope, tree, max_depth
            ),
            WalkEvent::ScopeEntered { scope, depth } => {
                write!(f, "entering `{}` at depth {}", scope, depth)
            }
            WalkEvent::ScopeEnumerated {
                scope,
                members,
                submodules,
                classes,
                functions,
                excluded,
            } => write!(
                f,
                "`{}`: {} members, {} submodules, {} classes, {} functions, {} excluded",
                scope, members, submodules, classes, functions, excluded
            ),
            WalkEvent::ParentMissing { child, parent } => {
                write!(f, "`{}` names parent `{}` which is not in the tree", child, parent)
            }
            WalkEvent::ScopeFinished { scope, added } => {
                write!(f, "finished `{}`, {} nodes added", scope, added)
            }
            WalkEvent::TraversalFinished { scope, nodes } => {
                write!(f, "walk of `{}` done, {} nodes", scope, nodes)
            }
        }
    }
}

/// Sink for traversal events
pub trait Diagnostics {
    fn debug(&self, event: &WalkEvent);
    fn info(&self, event: &WalkEvent);
}

impl<D: Diagnostics + ?Sized> Diagnostics for &D {
    fn debug(&self, event: &WalkEvent) {
        (**self).debug(event)
    }

    fn info(&self, event: &WalkEvent) {
        (**self).info(event)
    }
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn debug(&self, event: &WalkEvent) {
        tracing::debug!(event = event.name(), scope = %event.scope(), "{}", event);
    }

    fn info(&self, event: &WalkEvent) {
        tracing::info!(event = event.name(), scope = %event.scope(), "{}", event);
    }
}

/// Diagnostic level an event was reported at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: RefCell<Vec<(Level, WalkEvent)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, WalkEvent)> {
        self.entries.borrow().clone()
    }

    pub fn events(&self) -> Vec<WalkEvent> {
        self.entries.borrow().iter().map(|(_, e)| e.clone()).collect()
    }

    /// Scopes in the order they were entered
    pub fn entered_scopes(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|(_, e)| match e {
                WalkEvent::ScopeEntered { scope, .. } => Some(scope.clone()),
                _ => None,
            })
            .collect()
    }

    /// `(child, parent)` pairs reported as missing
    pub fn missing_parents(&self) -> Vec<(String, String)> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|(_, e)| match e {
                WalkEvent::ParentMissing { child, parent } => Some((child.clone(), parent.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn push(&self, level: Level, event: &WalkEvent) {
        self.entries.borrow_mut().push((level, event.clone()));
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn debug(&self, event: &WalkEvent) {
        self.push(Level::Debug, event);
    }

    fn info(&self, event: &WalkEvent) {
        self.push(Level::Info, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_keeps_levels() {
        let rec = RecordingDiagnostics::new();
        rec.info(&WalkEvent::TraversalStarted {
            scope: "app".into(),
            tree: "app".into(),
            max_depth: 2,
        });
        rec.debug(&WalkEvent::ScopeEntered {
            scope: "app".into(),
            depth: 0,
        });

        let entries = rec.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, Level::Info);
        assert_eq!(entries[1].0, Level::Debug);
        assert_eq!(rec.entered_scopes(), vec!["app".to_string()]);
    }

    #[test]
    fn test_recording_through_reference() {
        fn report(sink: impl Diagnostics) {
            sink.debug(&WalkEvent::ParentMissing {
                child: "Derived".into(),
                parent: "Base".into(),
            });
        }

        let rec = RecordingDiagnostics::new();
        report(&rec);
        assert_eq!(
            rec.missing_parents(),
            vec![("Derived".to_string(), "Base".to_string())]
        );
    }

    #[test]
    fn test_event_display_and_fields() {
        let event = WalkEvent::ScopeFinished {
            scope: "app.models".into(),
            added: 3,
        };
        assert_eq!(event.name(), "scope_finished");
        assert_eq!(event.scope(), "app.models");
        assert_eq!(event.to_string(), "finished `app.models`, 3 nodes added");
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        let sink = TracingDiagnostics;
        sink.info(&WalkEvent::TraversalFinished {
            scope: "app".into(),
            nodes: 0,
        });
    }
}
