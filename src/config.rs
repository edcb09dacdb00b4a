use crate::error::{Error, Result};
use crate::tree::WalkOptions;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "classy-mermaid.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub walk: WalkConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
}

/// Traversal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    pub max_depth: usize,
    pub skip_private: bool,
    pub ignore: Vec<String>,
}

/// Where Python sources are read from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding the top-level packages
    pub root: PathBuf,
    pub discover_submodules: bool,
    /// Glob patterns on child module names
    pub exclude: Vec<String>,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Write here instead of stdout
    pub path: Option<PathBuf>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            description: None,
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        let options = WalkOptions::default();
        Self {
            max_depth: options.max_depth,
            skip_private: options.skip_private,
            ignore: Vec::new(),
        }
    }
}

impl WalkConfig {
    /// Options for a [`ScopeWalker`](crate::tree::ScopeWalker)
    pub fn options(&self) -> WalkOptions {
        WalkOptions::default()
            .with_max_depth(self.max_depth)
            .with_skip_private(self.skip_private)
            .ignoring(self.ignore.iter().cloned())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            discover_submodules: true,
            exclude: vec![
                "tests".to_string(),
                "test_*".to_string(),
                "conftest".to_string(),
            ],
        }
    }
}

/// Command line values that override the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root: Option<PathBuf>,
    pub depth: Option<usize>,
    pub include_private: bool,
    pub ignore: Vec<String>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file, or defaults when it is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                Self::default()
            }
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: CliOverrides) {
        if let Some(root) = cli.root {
            self.source.root = root;
        }

        if let Some(d) = cli.depth {
            self.walk.max_depth = d;
        }

        if cli.include_private {
            self.walk.skip_private = false;
        }

        for name in cli.ignore {
            if !self.walk.ignore.contains(&name) {
                self.walk.ignore.push(name);
            }
        }

        if let Some(format) = cli.format {
            self.output.format = format;
        }

        if let Some(out) = cli.output {
            self.output.path = Some(out);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.walk.max_depth == 0 {
            return Err(Error::config_validation("max_depth must be at least 1"));
        }

        if self.walk.max_depth > 100 {
            return Err(Error::config_validation("max_depth cannot exceed 100"));
        }

        for pattern in &self.source.exclude {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(Error::config_validation(format!(
                    "invalid exclude pattern `{}`: {}",
                    pattern, e
                )));
            }
        }

        if self.walk.ignore.iter().any(|name| name.is_empty()) {
            return Err(Error::config_validation("ignore entries cannot be empty"));
        }

        Ok(())
    }
}
