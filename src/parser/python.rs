// Python parser using tree-sitter

use crate::error::{Error, Result};
use crate::parser::ast::*;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

/// Parser for Python source files
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| Error::Parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse a Python file as the module `module_name`
    pub fn parse_file(&mut self, path: &Path, module_name: &str) -> Result<ParsedFile> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;

        self.parse_source(&source, path.to_path_buf(), module_name.to_string())
    }

    /// Parse Python source code
    pub fn parse_source(
        &mut self,
        source: &str,
        path: PathBuf,
        module_name: String,
    ) -> Result<ParsedFile> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::parse(&path, "tree-sitter returned no tree"))?;

        let root = tree.root_node();
        let source = source.as_bytes();
        let mut file = ParsedFile::new(path, module_name);

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "import_statement" => {
                    if let Some(import) = parse_import(&child, source) {
                        file.imports.push(import);
                    }
                }
                "import_from_statement" => {
                    if let Some(import) = parse_import_from(&child, source) {
                        file.imports.push(import);
                    }
                }
                "class_definition" => {
                    if let Some(class) = parse_class(&child, source) {
                        file.classes.push(class);
                    }
                }
                "function_definition" => {
                    if let Some(func) = parse_function(&child, source) {
                        file.functions.push(func);
                    }
                }
                "decorated_definition" => {
                    // bound under the definition's name, decorators are dropped
                    match child.child_by_field_name("definition") {
                        Some(def) if def.kind() == "class_definition" => {
                            if let Some(mut class) = parse_class(&def, source) {
                                class.line = child.start_position().row + 1;
                                file.classes.push(class);
                            }
                        }
                        Some(def) if def.kind() == "function_definition" => {
                            if let Some(mut func) = parse_function(&def, source) {
                                func.line = child.start_position().row + 1;
                                file.functions.push(func);
                            }
                        }
                        _ => {}
                    }
                }
                "expression_statement" => {
                    file.assignments.extend(parse_assignment(&child, source));
                }
                _ => {}
            }
        }

        Ok(file)
    }
}

/// `import x`, `import x.y as z`, `import a, b`
fn parse_import(node: &Node, source: &[u8]) -> Option<Import> {
    let line = node.start_position().row + 1;
    let mut names = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "dotted_name" => {
                names.push(ImportedName::new(child.utf8_text(source).ok()?));
            }
            "aliased_import" => {
                let name = child.child_by_field_name("name")?.utf8_text(source).ok()?;
                match child.child_by_field_name("alias") {
                    Some(alias) => {
                        names.push(ImportedName::with_alias(name, alias.utf8_text(source).ok()?))
                    }
                    None => names.push(ImportedName::new(name)),
                }
            }
            _ => {}
        }
    }

    let module = names.first()?.name.clone();
    Some(Import {
        module,
        names,
        kind: ImportKind::Direct,
        line,
    })
}

/// `from x import y`, `from ..x import y as z`, `from . import y`
fn parse_import_from(node: &Node, source: &[u8]) -> Option<Import> {
    let line = node.start_position().row + 1;
    let mut module = String::new();
    let mut names = Vec::new();
    let mut relative_level = 0;
    let mut seen_import_keyword = false;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "relative_import" => {
                let mut inner_cursor = child.walk();
                for inner in child.children(&mut inner_cursor) {
                    match inner.kind() {
                        "import_prefix" => {
                            relative_level = inner
                                .utf8_text(source)
                                .ok()?
                                .chars()
                                .filter(|c| *c == '.')
                                .count();
                        }
                        "dotted_name" => {
                            module = inner.utf8_text(source).ok()?.to_string();
                        }
                        _ => {}
                    }
                }
            }
            "dotted_name" => {
                let text = child.utf8_text(source).ok()?;
                if seen_import_keyword {
                    names.push(ImportedName::new(text));
                } else {
                    module = text.to_string();
                }
            }
            "import" => {
                seen_import_keyword = true;
            }
            "wildcard_import" => {
                names.push(ImportedName::new("*"));
            }
            "aliased_import" => {
                let name = child.child_by_field_name("name")?.utf8_text(source).ok()?;
                match child.child_by_field_name("alias") {
                    Some(alias) => {
                        names.push(ImportedName::with_alias(name, alias.utf8_text(source).ok()?))
                    }
                    None => names.push(ImportedName::new(name)),
                }
            }
            _ => {}
        }
    }

    if module.is_empty() && relative_level == 0 {
        return None;
    }

    let kind = if relative_level > 0 {
        ImportKind::Relative {
            level: relative_level,
        }
    } else {
        ImportKind::From
    };

    Some(Import {
        module,
        names,
        kind,
        line,
    })
}

fn parse_class(node: &Node, source: &[u8]) -> Option<Class> {
    let name = node.child_by_field_name("name")?.utf8_text(source).ok()?;
    let mut class = Class::new(name, node.start_position().row + 1);

    if let Some(superclasses) = node.child_by_field_name("superclasses") {
        class.bases = extract_bases(&superclasses, source);
    }

    Some(class)
}

/// Base classes from the superclass argument list; keyword arguments such
/// as `metaclass=...` are skipped.
fn extract_bases(node: &Node, source: &[u8]) -> Vec<String> {
    let mut bases = Vec::new();
    let mut cursor = node.walk();

    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "identifier" | "attribute" | "subscript" | "call" => {
                if let Ok(text) = child.utf8_text(source) {
                    bases.push(text.to_string());
                }
            }
            _ => {}
        }
    }

    bases
}

fn parse_function(node: &Node, source: &[u8]) -> Option<Function> {
    let name = node.child_by_field_name("name")?.utf8_text(source).ok()?;
    let mut func = Function::new(name, node.start_position().row + 1);

    if let Some(params) = node.child_by_field_name("parameters") {
        func.parameters = parse_parameters(&params, source);
    }

    Some(func)
}

fn parse_parameters(node: &Node, source: &[u8]) -> Vec<Parameter> {
    let mut params: Vec<Parameter> = Vec::new();
    let mut cursor = node.walk();
    let mut keyword_only = false;

    for child in node.named_children(&mut cursor) {
        let parsed = match child.kind() {
            "identifier" => child.utf8_text(source).ok().map(Parameter::new),
            "typed_parameter" => parse_typed_parameter(&child, source),
            "default_parameter" | "typed_default_parameter" => {
                parse_default_parameter(&child, source)
            }
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                let name = child.named_child(0).and_then(|n| n.utf8_text(source).ok());
                name.map(|n| {
                    let mut param = Parameter::new(n);
                    param.kind = if child.kind() == "list_splat_pattern" {
                        ParameterKind::Args
                    } else {
                        ParameterKind::Kwargs
                    };
                    param
                })
            }
            "keyword_separator" => {
                keyword_only = true;
                None
            }
            "positional_separator" => {
                for param in params.iter_mut() {
                    if param.kind == ParameterKind::Regular {
                        param.kind = ParameterKind::PositionalOnly;
                    }
                }
                None
            }
            _ => None,
        };

        if let Some(mut param) = parsed {
            if param.kind == ParameterKind::Args {
                keyword_only = true;
            } else if keyword_only && param.kind == ParameterKind::Regular {
                param.kind = ParameterKind::KeywordOnly;
            }
            params.push(param);
        }
    }

    params
}

/// `name: type`, or `*args: type` / `**kwargs: type`
fn parse_typed_parameter(node: &Node, source: &[u8]) -> Option<Parameter> {
    let target = node.named_child(0)?;
    let mut param = match target.kind() {
        "list_splat_pattern" | "dictionary_splat_pattern" => {
            let name = target.named_child(0)?.utf8_text(source).ok()?;
            let mut param = Parameter::new(name);
            param.kind = if target.kind() == "list_splat_pattern" {
                ParameterKind::Args
            } else {
                ParameterKind::Kwargs
            };
            param
        }
        _ => Parameter::new(target.utf8_text(source).ok()?),
    };
    param.type_hint = node
        .child_by_field_name("type")
        .and_then(|t| t.utf8_text(source).ok())
        .map(str::to_string);
    Some(param)
}

/// `name=default` or `name: type = default`
fn parse_default_parameter(node: &Node, source: &[u8]) -> Option<Parameter> {
    let name = node.child_by_field_name("name")?.utf8_text(source).ok()?;
    let mut param = Parameter::new(name);
    param.type_hint = node
        .child_by_field_name("type")
        .and_then(|t| t.utf8_text(source).ok())
        .map(str::to_string);
    param.default = node
        .child_by_field_name("value")
        .and_then(|v| v.utf8_text(source).ok())
        .map(str::to_string);
    Some(param)
}

/// Module-level assignments: `X = ...`, `X: T = ...`, `X: T`, `a = b = ...`
fn parse_assignment(node: &Node, source: &[u8]) -> Vec<Assignment> {
    let mut assignments = Vec::new();
    let mut current = node.named_child(0);

    while let Some(assign) = current.filter(|n| n.kind() == "assignment") {
        let line = assign.start_position().row + 1;
        if let Some(left) = assign.child_by_field_name("left") {
            if left.kind() == "identifier" {
                if let Ok(name) = left.utf8_text(source) {
                    assignments.push(Assignment::new(name, line));
                }
            }
        }
        // chained `a = b = 1` nests the second assignment on the right
        current = assign.child_by_field_name("right");
    }

    assignments
}
