//! Metadata providers.
//!
//! A provider is the only thing the walker knows about the codebase being
//! described: it resolves scope names to handles, lists the members bound in
//! a scope, and says which members are built-in primitives. Two providers
//! ship with the crate: [`StaticProvider`] (scopes declared in code or in a
//! TOML manifest) and [`PythonProvider`] (a Python source tree read through
//! tree-sitter).

mod memory;
mod python;

pub use memory::{MemberSpec, SpecKind, StaticProvider, StaticScope};
pub use python::PythonProvider;

use crate::error::Result;
use crate::parser::Parameter;
use serde::{Deserialize, Serialize};

/// Declaring scope reported for built-in primitives
pub const BUILTINS_SCOPE: &str = "builtins";

/// Source of scopes and members for a traversal
pub trait MetadataProvider {
    /// Resolve a dotted scope name to a handle
    fn resolve(&self, name: &str) -> Result<ScopeHandle>;

    /// Direct members of a scope
    fn members(&self, scope: &ScopeHandle) -> Result<Vec<Member>>;

    /// Whether a member is a built-in/opaque primitive
    fn is_builtin(&self, member: &Member) -> bool {
        member.declaring_scope == BUILTINS_SCOPE
    }
}

/// A resolved scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeHandle {
    /// Dotted scope name, e.g. `app.models`
    pub name: String,
    /// Package identity: the scope itself for packages, its parent otherwise
    pub package: String,
}

impl ScopeHandle {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
        }
    }

    /// Whether `scope` is this scope or nested below it
    pub fn contains(&self, scope: &str) -> bool {
        is_within(scope, &self.name)
    }
}

/// `scope` equals `root` or is a dotted descendant of it
pub fn is_within(scope: &str, root: &str) -> bool {
    scope == root
        || scope
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// A scope given either by name or as an already resolved handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRef {
    Name(String),
    Handle(ScopeHandle),
}

impl ScopeRef {
    pub fn name(&self) -> &str {
        match self {
            ScopeRef::Name(name) => name,
            ScopeRef::Handle(handle) => &handle.name,
        }
    }
}

impl From<&str> for ScopeRef {
    fn from(name: &str) -> Self {
        ScopeRef::Name(name.to_string())
    }
}

impl From<String> for ScopeRef {
    fn from(name: String) -> Self {
        ScopeRef::Name(name)
    }
}

impl From<ScopeHandle> for ScopeRef {
    fn from(handle: ScopeHandle) -> Self {
        ScopeRef::Handle(handle)
    }
}

/// One member bound in a scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Name the member is bound to in the enumerated scope
    pub binding: String,
    /// The entity's own name; dotted for modules
    pub name: String,
    /// Scope the entity is defined in (package identity for modules)
    pub declaring_scope: String,
    pub kind: MemberKind,
}

impl Member {
    pub fn module(name: &str, package: &str) -> Self {
        Self::new(name, package, MemberKind::Module { attributes: Vec::new() })
    }

    pub fn class(name: &str, scope: &str, bases: Vec<String>) -> Self {
        Self::new(name, scope, MemberKind::Class { bases })
    }

    pub fn function(name: &str, scope: &str, parameters: Vec<Parameter>) -> Self {
        Self::new(name, scope, MemberKind::Function { parameters })
    }

    pub fn attribute(name: &str, scope: &str) -> Self {
        Self::new(name, scope, MemberKind::Attribute)
    }

    pub fn opaque(name: &str, scope: &str) -> Self {
        Self::new(name, scope, MemberKind::Opaque)
    }

    fn new(name: &str, scope: &str, kind: MemberKind) -> Self {
        Self {
            binding: name.to_string(),
            name: name.to_string(),
            declaring_scope: scope.to_string(),
            kind,
        }
    }

    /// Rebind under another name (`import x as y`)
    pub fn bound_as(mut self, binding: &str) -> Self {
        self.binding = binding.to_string();
        self
    }

    pub fn with_attributes(mut self, names: Vec<String>) -> Self {
        if let MemberKind::Module { attributes } = &mut self.kind {
            *attributes = names;
        }
        self
    }
}

/// What a member is, with the data each kind carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberKind {
    /// An importable scope container
    Module { attributes: Vec<String> },
    /// A type definition; bases as the provider knows them
    Class { bases: Vec<String> },
    /// A callable not bound to a type
    Function { parameters: Vec<Parameter> },
    /// A callable bound to a type
    Method,
    /// A plain value
    Attribute,
    /// Anything the provider cannot look into
    Opaque,
}

impl MemberKind {
    pub fn tag(&self) -> &'static str {
        match self {
            MemberKind::Module { .. } => "module",
            MemberKind::Class { .. } => "class",
            MemberKind::Function { .. } => "function",
            MemberKind::Method => "method",
            MemberKind::Attribute => "attribute",
            MemberKind::Opaque => "opaque",
        }
    }
}
