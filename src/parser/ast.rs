// Syntax types for parsed Python modules
//
// Only module-level bindings are kept: imports, classes, functions and
// assignments. That is all a module namespace exposes to introspection.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed Python module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedFile {
    /// Source file path
    pub path: PathBuf,
    /// Dotted module name
    pub module_name: String,
    /// Module-level imports
    pub imports: Vec<Import>,
    /// Module-level class definitions
    pub classes: Vec<Class>,
    /// Module-level function definitions
    pub functions: Vec<Function>,
    /// Module-level assignments
    pub assignments: Vec<Assignment>,
}

impl ParsedFile {
    pub fn new(path: PathBuf, module_name: String) -> Self {
        Self {
            path,
            module_name,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            assignments: Vec::new(),
        }
    }

    /// All binding statements in source order
    pub fn statements(&self) -> Vec<Statement<'_>> {
        let mut statements: Vec<Statement<'_>> = self
            .imports
            .iter()
            .map(Statement::Import)
            .chain(self.classes.iter().map(Statement::Class))
            .chain(self.functions.iter().map(Statement::Function))
            .chain(self.assignments.iter().map(Statement::Assignment))
            .collect();
        statements.sort_by_key(Statement::line);
        statements
    }
}

/// A binding statement borrowed from a [`ParsedFile`]
#[derive(Debug, Clone, Copy)]
pub enum Statement<'a> {
    Import(&'a Import),
    Class(&'a Class),
    Function(&'a Function),
    Assignment(&'a Assignment),
}

impl Statement<'_> {
    pub fn line(&self) -> usize {
        match self {
            Statement::Import(i) => i.line,
            Statement::Class(c) => c.line,
            Statement::Function(f) => f.line,
            Statement::Assignment(a) => a.line,
        }
    }
}

/// An import statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Import {
    /// The module being imported (empty for `from . import x`)
    pub module: String,
    /// Imported names
    pub names: Vec<ImportedName>,
    pub kind: ImportKind,
    pub line: usize,
}

/// A single imported name with optional alias
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn with_alias(name: &str, alias: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: Some(alias.to_string()),
        }
    }

    /// Name bound in the importing module
    pub fn used_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == "*"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ImportKind {
    /// `import x` or `import x as y`
    Direct,
    /// `from x import y`
    From,
    /// `from . import y` or `from ..x import y`
    Relative { level: usize },
}

/// A class definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Class {
    pub name: String,
    /// Base classes as written, not resolved
    pub bases: Vec<String>,
    pub line: usize,
}

impl Class {
    pub fn new(name: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            bases: Vec::new(),
            line,
        }
    }
}

/// A function definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub line: usize,
}

impl Function {
    pub fn new(name: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            parameters: Vec::new(),
            line,
        }
    }
}

/// A function parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_hint: Option<String>,
    pub default: Option<String>,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_hint: None,
            default: None,
            kind: ParameterKind::Regular,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Regular,
    /// *args
    Args,
    /// **kwargs
    Kwargs,
    /// before `/`
    PositionalOnly,
    /// after `*`
    KeywordOnly,
}

/// A module-level assignment (`NAME = ...` or `NAME: T = ...`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub line: usize,
}

impl Assignment {
    pub fn new(name: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            line,
        }
    }
}
