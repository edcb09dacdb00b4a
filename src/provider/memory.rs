// In-memory provider, built in code or loaded from a TOML manifest

use super::{Member, MemberKind, MetadataProvider, ScopeHandle};
use crate::error::{Error, Result};
use crate::parser::Parameter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Kind of a declared member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    Module,
    Class,
    Function,
    Method,
    Attribute,
    Opaque,
}

/// A member declared in a [`StaticScope`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSpec {
    /// Name the member is bound to in the scope
    pub name: String,
    pub kind: SpecKind,
    /// Entity's own name when it differs from the binding; for modules,
    /// the dotted scope name (defaults to `<scope>.<name>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Declaring scope; defaults to the enclosing scope, or for modules to
    /// the target scope's package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_in: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

impl MemberSpec {
    fn new(name: &str, kind: SpecKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            target: None,
            declared_in: None,
            bases: Vec::new(),
            parameters: Vec::new(),
        }
    }

    pub fn class(name: &str, bases: &[&str]) -> Self {
        Self {
            bases: bases.iter().map(|b| b.to_string()).collect(),
            ..Self::new(name, SpecKind::Class)
        }
    }

    pub fn function(name: &str, parameters: &[&str]) -> Self {
        Self {
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            ..Self::new(name, SpecKind::Function)
        }
    }

    pub fn module(binding: &str, target: &str) -> Self {
        Self::new(binding, SpecKind::Module).target(target)
    }

    pub fn method(name: &str) -> Self {
        Self::new(name, SpecKind::Method)
    }

    pub fn attribute(name: &str) -> Self {
        Self::new(name, SpecKind::Attribute)
    }

    pub fn opaque(name: &str) -> Self {
        Self::new(name, SpecKind::Opaque)
    }

    pub fn target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn declared_in(mut self, scope: &str) -> Self {
        self.declared_in = Some(scope.to_string());
        self
    }
}

/// One scope and its members, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticScope {
    pub name: String,
    /// Package identity; defaults to the scope itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, rename = "member")]
    pub members: Vec<MemberSpec>,
}

impl StaticScope {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            package: None,
            members: Vec::new(),
        }
    }

    pub fn in_package(mut self, package: &str) -> Self {
        self.package = Some(package.to_string());
        self
    }

    pub fn package(&self) -> &str {
        self.package.as_deref().unwrap_or(&self.name)
    }

    pub fn with(mut self, spec: MemberSpec) -> Self {
        self.members.push(spec);
        self
    }

    pub fn class(self, name: &str, bases: &[&str]) -> Self {
        self.with(MemberSpec::class(name, bases))
    }

    pub fn function(self, name: &str, parameters: &[&str]) -> Self {
        self.with(MemberSpec::function(name, parameters))
    }

    pub fn module(self, binding: &str, target: &str) -> Self {
        self.with(MemberSpec::module(binding, target))
    }

    pub fn attribute(self, name: &str) -> Self {
        self.with(MemberSpec::attribute(name))
    }

    pub fn opaque(self, name: &str) -> Self {
        self.with(MemberSpec::opaque(name))
    }
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    scope: Vec<StaticScope>,
}

/// Provider over a fixed set of scopes
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    scopes: BTreeMap<String, StaticScope>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scope, replacing any scope of the same name
    pub fn with_scope(mut self, scope: StaticScope) -> Self {
        self.scopes.insert(scope.name.clone(), scope);
        self
    }

    /// Add a scope; a second scope with the same name is an error
    pub fn add_scope(&mut self, scope: StaticScope) -> Result<()> {
        if self.scopes.contains_key(&scope.name) {
            return Err(Error::manifest(format!(
                "scope `{}` declared more than once",
                scope.name
            )));
        }
        self.scopes.insert(scope.name.clone(), scope);
        Ok(())
    }

    /// Parse a manifest of `[[scope]]` tables
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(contents).map_err(|e| Error::manifest(e.to_string()))?;

        let mut provider = Self::new();
        for scope in manifest.scope {
            if scope.name.is_empty() {
                return Err(Error::manifest("scope with an empty name"));
            }
            provider.add_scope(scope)?;
        }
        Ok(provider)
    }

    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn scope(&self, name: &str) -> Option<&StaticScope> {
        self.scopes.get(name)
    }

    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    fn member(&self, scope: &StaticScope, spec: &MemberSpec) -> Member {
        let name = spec.target.as_deref().unwrap_or(&spec.name);
        let declared = spec.declared_in.as_deref().unwrap_or(&scope.name);

        let member = match spec.kind {
            SpecKind::Module => return self.module_member(scope, spec),
            SpecKind::Class => Member::class(name, declared, spec.bases.clone()),
            SpecKind::Function => Member::function(
                name,
                declared,
                spec.parameters.iter().map(|p| Parameter::new(p)).collect(),
            ),
            SpecKind::Attribute => Member::attribute(name, declared),
            SpecKind::Opaque => Member::opaque(name, declared),
            SpecKind::Method => Member {
                kind: MemberKind::Method,
                ..Member::opaque(name, declared)
            },
        };
        member.bound_as(&spec.name)
    }

    fn module_member(&self, scope: &StaticScope, spec: &MemberSpec) -> Member {
        let target = spec
            .target
            .clone()
            .unwrap_or_else(|| format!("{}.{}", scope.name, spec.name));
        let target_scope = self.scopes.get(&target);

        let package = spec
            .declared_in
            .as_deref()
            .or_else(|| target_scope.map(StaticScope::package))
            .unwrap_or(target.as_str())
            .to_string();
        let attributes = target_scope
            .map(|s| {
                s.members
                    .iter()
                    .filter(|m| m.kind == SpecKind::Attribute)
                    .map(|m| m.name.clone())
                    .collect()
            })
            .unwrap_or_default();

        Member::module(&target, &package)
            .bound_as(&spec.name)
            .with_attributes(attributes)
    }
}

impl MetadataProvider for StaticProvider {
    fn resolve(&self, name: &str) -> Result<ScopeHandle> {
        self.scopes
            .get(name)
            .map(|scope| ScopeHandle::new(name, scope.package()))
            .ok_or_else(|| Error::scope_resolution(name))
    }

    fn members(&self, scope: &ScopeHandle) -> Result<Vec<Member>> {
        let declared = self
            .scopes
            .get(&scope.name)
            .ok_or_else(|| Error::scope_resolution(&scope.name))?;
        Ok(declared
            .members
            .iter()
            .map(|spec| self.member(declared, spec))
            .collect())
    }
}
