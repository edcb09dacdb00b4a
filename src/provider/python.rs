// Python source provider
//
// Reads a source tree with the tree-sitter parser and answers with the
// bindings a module namespace would hold at runtime: child modules of a
// package, imported names, classes, functions and module-level values.

use super::{Member, MetadataProvider, ScopeHandle, BUILTINS_SCOPE};
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::parser::{Class, Import, ImportKind, ImportedName, ParsedFile, PythonParser, Statement};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use walkdir::WalkDir;

/// Modules implemented inside the interpreter
const BUILTIN_MODULES: &[&str] = &[
    "builtins",
    "sys",
    "gc",
    "marshal",
    "time",
    "math",
    "itertools",
    "errno",
    "posix",
    "nt",
    "atexit",
    "_io",
    "_thread",
    "_weakref",
    "_abc",
    "_imp",
    "_warnings",
    "_signal",
];

/// How far `from m import n` follows re-exports before giving up
const MAX_REEXPORT_HOPS: usize = 4;

/// Where a dotted module name lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    /// Directory with an `__init__.py`
    Package(PathBuf),
    /// A `.py` file
    Module(PathBuf),
    /// Directory without an `__init__.py`
    Namespace(PathBuf),
}

impl Location {
    fn source(&self) -> Option<PathBuf> {
        match self {
            Location::Package(dir) => Some(dir.join("__init__.py")),
            Location::Module(file) => Some(file.clone()),
            Location::Namespace(_) => None,
        }
    }

    fn directory(&self) -> Option<&Path> {
        match self {
            Location::Package(dir) | Location::Namespace(dir) => Some(dir),
            Location::Module(_) => None,
        }
    }
}

/// Provider over a directory of Python packages
pub struct PythonProvider {
    root: PathBuf,
    discover_submodules: bool,
    exclude: Vec<glob::Pattern>,
    parser: RefCell<PythonParser>,
    cache: RefCell<HashMap<String, Rc<ParsedFile>>>,
}

impl PythonProvider {
    /// Provider for the packages directly under `root`
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            discover_submodules: true,
            exclude: Vec::new(),
            parser: RefCell::new(PythonParser::new()?),
            cache: RefCell::new(HashMap::new()),
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Self::new(&config.root)?
            .with_discover_submodules(config.discover_submodules)
            .with_exclude(&config.exclude)
    }

    pub fn with_discover_submodules(mut self, discover: bool) -> Self {
        self.discover_submodules = discover;
        self
    }

    /// Glob patterns matched against child module names, short or dotted
    pub fn with_exclude(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude = patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, glob::PatternError>>()?;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, name: &str) -> Option<Location> {
        if name.is_empty() || !name.split('.').all(is_identifier) {
            return None;
        }

        let relative: PathBuf = name.split('.').collect();
        let dir = self.root.join(&relative);
        if dir.join("__init__.py").is_file() {
            return Some(Location::Package(dir));
        }
        let file = dir.with_extension("py");
        if file.is_file() {
            return Some(Location::Module(file));
        }
        if dir.is_dir() {
            return Some(Location::Namespace(dir));
        }
        None
    }

    /// Parsed source of a module, `None` for namespace packages
    fn parsed(&self, name: &str, location: &Location) -> Result<Option<Rc<ParsedFile>>> {
        if let Some(file) = self.cache.borrow().get(name) {
            return Ok(Some(Rc::clone(file)));
        }
        let Some(path) = location.source() else {
            return Ok(None);
        };

        let file = Rc::new(self.parser.borrow_mut().parse_file(&path, name)?);
        tracing::trace!(module = name, path = %path.display(), "parsed module");
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&file));
        Ok(Some(file))
    }

    /// Member for the module `name`, located or not
    fn module_member(&self, name: &str) -> Result<Member> {
        let Some(location) = self.locate(name) else {
            return Ok(Member::module(name, parent_or_self(name)));
        };

        let attributes = match self.parsed(name, &location)? {
            Some(file) => {
                let mut names: Vec<String> = Vec::new();
                for assignment in &file.assignments {
                    if !names.contains(&assignment.name) {
                        names.push(assignment.name.clone());
                    }
                }
                names
            }
            None => Vec::new(),
        };

        Ok(Member::module(name, &package_of(name, &location)).with_attributes(attributes))
    }

    /// Importable child modules of a package directory, by short name
    fn submodules(&self, scope: &str, dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };

            let name = if entry.file_type().is_dir() {
                if !entry.path().join("__init__.py").is_file() {
                    continue;
                }
                file_name
            } else {
                match file_name.strip_suffix(".py") {
                    Some(stem) if stem != "__init__" => stem,
                    _ => continue,
                }
            };

            if !is_identifier(name) || self.is_excluded(name, &format!("{}.{}", scope, name)) {
                continue;
            }
            names.push(name.to_string());
        }
        Ok(names)
    }

    fn is_excluded(&self, short: &str, dotted: &str) -> bool {
        self.exclude
            .iter()
            .any(|p| p.matches(short) || p.matches(dotted))
    }

    /// Member bound by one name of an import statement in `package`
    fn import_member(
        &self,
        import: &Import,
        imported: &ImportedName,
        package: &str,
        hops: usize,
    ) -> Result<Member> {
        match import.kind {
            ImportKind::Direct => match &imported.alias {
                Some(_) => self.module_member(&imported.name),
                None => self.module_member(top_level(&imported.name)),
            },
            ImportKind::From => self.from_import(&import.module, &imported.name, hops),
            ImportKind::Relative { level } => {
                let base = relative_base(package, level, &import.module);
                self.from_import(&base, &imported.name, hops)
            }
        }
    }

    /// `from base import name`: a submodule, then a binding of `base`,
    /// then an opaque name declared in `base`
    fn from_import(&self, base: &str, name: &str, hops: usize) -> Result<Member> {
        let candidate = if base.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", base, name)
        };
        if self.locate(&candidate).is_some() {
            return self.module_member(&candidate);
        }

        if hops > 0 {
            if let Some(member) = self.lookup(base, name, hops - 1)? {
                return Ok(member);
            }
        }

        Ok(Member::opaque(name, base))
    }

    /// Last binding of `name` in the source of `module`
    fn lookup(&self, module: &str, name: &str, hops: usize) -> Result<Option<Member>> {
        let Some(location) = self.locate(module) else {
            return Ok(None);
        };
        let Some(file) = self.parsed(module, &location)? else {
            return Ok(None);
        };
        let package = package_of(module, &location);

        for statement in file.statements().into_iter().rev() {
            match statement {
                Statement::Class(class) if class.name == name => {
                    return Ok(Some(class_member(class, module)));
                }
                Statement::Function(func) if func.name == name => {
                    return Ok(Some(Member::function(&func.name, module, func.parameters.clone())));
                }
                Statement::Assignment(assignment) if assignment.name == name => {
                    return Ok(Some(Member::attribute(&assignment.name, module)));
                }
                Statement::Import(import) => {
                    let bound = import
                        .names
                        .iter()
                        .rev()
                        .find(|n| !n.is_wildcard() && bound_name(import, n) == name);
                    if let Some(imported) = bound {
                        return self.import_member(import, imported, &package, hops).map(Some);
                    }
                }
                _ => {}
            }
        }
        Ok(None)
    }
}

impl MetadataProvider for PythonProvider {
    fn resolve(&self, name: &str) -> Result<ScopeHandle> {
        let location = self
            .locate(name)
            .ok_or_else(|| Error::scope_resolution(name))?;
        Ok(ScopeHandle::new(name, package_of(name, &location)))
    }

    fn members(&self, scope: &ScopeHandle) -> Result<Vec<Member>> {
        let location = self
            .locate(&scope.name)
            .ok_or_else(|| Error::scope_resolution(&scope.name))?;

        let mut bindings: BTreeMap<String, Member> = BTreeMap::new();

        if self.discover_submodules {
            if let Some(dir) = location.directory() {
                for child in self.submodules(&scope.name, dir)? {
                    let member = self.module_member(&format!("{}.{}", scope.name, child))?;
                    bindings.insert(child.clone(), member.bound_as(&child));
                }
            }
        }

        if let Some(file) = self.parsed(&scope.name, &location)? {
            for statement in file.statements() {
                match statement {
                    Statement::Import(import) => {
                        for imported in import.names.iter().filter(|n| !n.is_wildcard()) {
                            let binding = bound_name(import, imported);
                            let member = self
                                .import_member(import, imported, &scope.package, MAX_REEXPORT_HOPS)?
                                .bound_as(binding);
                            bindings.insert(binding.to_string(), member);
                        }
                    }
                    Statement::Class(class) => {
                        bindings.insert(class.name.clone(), class_member(class, &scope.name));
                    }
                    Statement::Function(func) => {
                        let member =
                            Member::function(&func.name, &scope.name, func.parameters.clone());
                        bindings.insert(func.name.clone(), member);
                    }
                    Statement::Assignment(assignment) => {
                        let member = Member::attribute(&assignment.name, &scope.name);
                        bindings.insert(assignment.name.clone(), member);
                    }
                }
            }
        }

        Ok(bindings.into_values().collect())
    }

    fn is_builtin(&self, member: &Member) -> bool {
        member.declaring_scope == BUILTINS_SCOPE
            || BUILTIN_MODULES.contains(&top_level(&member.declaring_scope))
    }
}

fn class_member(class: &Class, module: &str) -> Member {
    let bases = if class.bases.is_empty() {
        vec!["object".to_string()]
    } else {
        class.bases.clone()
    };
    Member::class(&class.name, module, bases)
}

/// Name an import binds in the importing module
fn bound_name<'a>(import: &Import, imported: &'a ImportedName) -> &'a str {
    match (&import.kind, &imported.alias) {
        (_, Some(alias)) => alias.as_str(),
        (ImportKind::Direct, None) => top_level(&imported.name),
        (_, None) => imported.name.as_str(),
    }
}

/// Package identity: packages are their own package, modules belong to
/// their parent
fn package_of(name: &str, location: &Location) -> String {
    match location {
        Location::Package(_) | Location::Namespace(_) => name.to_string(),
        Location::Module(_) => parent_or_self(name).to_string(),
    }
}

fn parent_or_self(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(parent, _)| parent)
}

fn top_level(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Absolute module for `from <dots><module> import ...` inside `package`
fn relative_base(package: &str, level: usize, module: &str) -> String {
    let mut segments: Vec<&str> = package.split('.').filter(|s| !s.is_empty()).collect();
    let drop = level.saturating_sub(1).min(segments.len());
    segments.truncate(segments.len() - drop);
    if !module.is_empty() {
        segments.push(module);
    }
    segments.join(".")
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}
