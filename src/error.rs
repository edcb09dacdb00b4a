use std::path::PathBuf;
use thiserror::Error;

/// classy-mermaid error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot resolve scope `{scope}`")]
    ScopeResolution { scope: String },

    #[error("Unsupported entity kind `{kind}` for member `{name}`")]
    UnsupportedEntityKind { name: String, kind: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

/// Result type alias for classy-mermaid operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a scope resolution error
    pub fn scope_resolution(scope: impl Into<String>) -> Self {
        Error::ScopeResolution {
            scope: scope.into(),
        }
    }

    /// Create an unsupported entity kind error
    pub fn unsupported_kind(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Error::UnsupportedEntityKind {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a manifest error
    pub fn manifest(msg: impl Into<String>) -> Self {
        Error::Manifest(msg.into())
    }

    /// Create a parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a parser error
    pub fn parser(msg: impl Into<String>) -> Self {
        Error::Parser(msg.into())
    }
}
