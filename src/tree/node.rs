// Entity descriptors for the module tree

use crate::error::{Error, Result};
use crate::parser::Parameter;
use crate::provider::{Member, MemberKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a discovered entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Module,
    Class,
    Function,
    Attribute,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Module => "Module",
            NodeKind::Class => "Class",
            NodeKind::Function => "Function",
            NodeKind::Attribute => "Attribute",
        };
        f.write_str(name)
    }
}

/// Kind-specific data carried by a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodePayload {
    Module {
        attributes: BTreeMap<String, TreeNode>,
    },
    Class,
    Function {
        parameters: Vec<Parameter>,
    },
    Attribute,
}

/// One discovered entity and its relationships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Declared name; also the node id
    pub name: String,
    /// Scope the entity is declared in
    pub path: String,
    /// Ids this entity relates up to (bases, declaring module)
    pub parents: Vec<String>,
    /// Ids that named this entity as a parent while it was in the tree
    pub children: Vec<String>,
    #[serde(flatten)]
    pub payload: NodePayload,
    /// Name of the tree that owns this node, set on insertion
    #[serde(skip)]
    tree: Option<String>,
}

impl TreeNode {
    fn new(name: &str, path: &str, parents: Vec<String>, payload: NodePayload) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            parents,
            children: Vec::new(),
            payload,
            tree: None,
        }
    }

    pub fn module(name: &str, package: &str) -> Self {
        Self::new(
            name,
            package,
            Vec::new(),
            NodePayload::Module {
                attributes: BTreeMap::new(),
            },
        )
    }

    pub fn class(name: &str, path: &str, parents: Vec<String>) -> Self {
        Self::new(name, path, parents, NodePayload::Class)
    }

    pub fn function(name: &str, path: &str, parameters: Vec<Parameter>) -> Self {
        Self::new(
            name,
            path,
            vec![path.to_string()],
            NodePayload::Function { parameters },
        )
    }

    pub fn attribute(name: &str, module: &str) -> Self {
        Self::new(name, module, vec![module.to_string()], NodePayload::Attribute)
    }

    /// Classify a provider member into a node.
    ///
    /// Modules, classes and free functions are supported; everything else
    /// (methods, plain values, opaque handles) is an
    /// [`Error::UnsupportedEntityKind`]. Filtering built-ins out is the
    /// walker's job, not this factory's.
    pub fn from_member(member: &Member) -> Result<Self> {
        match &member.kind {
            MemberKind::Module { attributes } => {
                let mut node = Self::module(&member.name, &member.declaring_scope);
                if let NodePayload::Module { attributes: attrs } = &mut node.payload {
                    for attr in attributes {
                        attrs.insert(attr.clone(), TreeNode::attribute(attr, &member.name));
                    }
                }
                Ok(node)
            }
            MemberKind::Class { bases } => {
                let mut parents: Vec<String> = Vec::with_capacity(bases.len());
                for base in bases.iter().map(|b| node_id(b)) {
                    if !parents.contains(&base) {
                        parents.push(base);
                    }
                }
                Ok(Self::class(&member.name, &member.declaring_scope, parents))
            }
            MemberKind::Function { parameters } => Ok(Self::function(
                &member.name,
                &member.declaring_scope,
                parameters.clone(),
            )),
            other => Err(Error::unsupported_kind(&member.name, other.tag())),
        }
    }

    /// Node id. Ids are bare names, so same-named entities from different
    /// scopes share one id.
    pub fn id(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        match self.payload {
            NodePayload::Module { .. } => NodeKind::Module,
            NodePayload::Class => NodeKind::Class,
            NodePayload::Function { .. } => NodeKind::Function,
            NodePayload::Attribute => NodeKind::Attribute,
        }
    }

    /// Name of the owning tree, if the node has been added to one
    pub fn tree(&self) -> Option<&str> {
        self.tree.as_deref()
    }

    pub(crate) fn attach(&mut self, tree: &str) {
        self.tree = Some(tree.to_string());
    }

    /// Module attributes
    pub fn attributes(&self) -> Option<&BTreeMap<String, TreeNode>> {
        match &self.payload {
            NodePayload::Module { attributes } => Some(attributes),
            _ => None,
        }
    }

    /// Function parameters
    pub fn parameters(&self) -> Option<&[Parameter]> {
        match &self.payload {
            NodePayload::Function { parameters } => Some(parameters),
            _ => None,
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.id())
    }
}

/// Id of a type written as a base, e.g. `models.Base` or `Generic[T]`.
/// Classes are identified by their own short name.
pub fn node_id(written: &str) -> String {
    let end = written
        .find(|c| c == '[' || c == '(')
        .unwrap_or(written.len());
    let path = written[..end].trim();
    path.rsplit('.').next().unwrap_or(path).trim().to_string()
}
