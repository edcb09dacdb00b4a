//! CLI argument parsing

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build a class and module tree from a codebase
#[derive(Parser, Debug)]
#[command(name = "classy-mermaid")]
#[command(about = "Build a class and module tree from a codebase")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk a scope and print its tree and graph
    Walk {
        /// Dotted name of the scope to start from
        scope: String,

        /// Directory containing the top-level Python packages
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Read scopes from a TOML manifest instead of Python sources
        #[arg(short, long, conflicts_with = "root")]
        manifest: Option<PathBuf>,

        /// Number of scope levels to enumerate
        #[arg(short, long)]
        depth: Option<usize>,

        /// Keep members whose name starts with `_`
        #[arg(long)]
        include_private: bool,

        /// Member names to skip (can be repeated)
        #[arg(long)]
        ignore: Vec<String>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_defaults() {
        let args = Args::try_parse_from(["classy-mermaid", "walk", "app"]).unwrap();
        match args.command {
            Command::Walk {
                scope,
                root,
                manifest,
                depth,
                include_private,
                ignore,
                format,
                output,
                config,
                verbose,
            } => {
                assert_eq!(scope, "app");
                assert!(root.is_none());
                assert!(manifest.is_none());
                assert!(depth.is_none());
                assert!(!include_private);
                assert!(ignore.is_empty());
                assert!(format.is_none());
                assert!(output.is_none());
                assert!(config.is_none());
                assert!(!verbose);
            }
            _ => panic!("Expected Walk command"),
        }
    }

    #[test]
    fn test_walk_with_options() {
        let args = Args::try_parse_from([
            "classy-mermaid", "walk", "shop.models",
            "--root", "./src",
            "--depth", "3",
            "--include-private",
            "--ignore", "legacy",
            "--ignore", "vendor",
            "--format", "text",
            "--output", "/tmp/tree.txt",
            "--config", "custom.toml",
            "--verbose",
        ])
        .unwrap();

        match args.command {
            Command::Walk {
                scope,
                root,
                depth,
                include_private,
                ignore,
                format,
                output,
                config,
                verbose,
                ..
            } => {
                assert_eq!(scope, "shop.models");
                assert_eq!(root, Some(PathBuf::from("./src")));
                assert_eq!(depth, Some(3));
                assert!(include_private);
                assert_eq!(ignore, vec!["legacy".to_string(), "vendor".to_string()]);
                assert_eq!(format, Some(OutputFormat::Text));
                assert_eq!(output, Some(PathBuf::from("/tmp/tree.txt")));
                assert_eq!(config, Some(PathBuf::from("custom.toml")));
                assert!(verbose);
            }
            _ => panic!("Expected Walk command"),
        }
    }

    #[test]
    fn test_walk_with_manifest() {
        let args =
            Args::try_parse_from(["classy-mermaid", "walk", "app", "-m", "scopes.toml"]).unwrap();
        match args.command {
            Command::Walk { manifest, .. } => {
                assert_eq!(manifest, Some(PathBuf::from("scopes.toml")));
            }
            _ => panic!("Expected Walk command"),
        }
    }

    #[test]
    fn test_root_conflicts_with_manifest() {
        let result = Args::try_parse_from([
            "classy-mermaid", "walk", "app", "--root", ".", "--manifest", "m.toml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = Args::try_parse_from(["classy-mermaid", "walk", "app", "--format", "html"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_walk_requires_scope() {
        assert!(Args::try_parse_from(["classy-mermaid", "walk"]).is_err());
    }

    #[test]
    fn test_version_command() {
        let args = Args::try_parse_from(["classy-mermaid", "version"]).unwrap();
        assert!(matches!(args.command, Command::Version));
    }
}
