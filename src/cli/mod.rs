//! CLI module for classy-mermaid

mod args;

pub use args::{Args, Command};

use crate::config::{CliOverrides, Config, OutputFormat, CONFIG_FILE};
use crate::error::Result;
use crate::output::{render_text, WalkReport};
use crate::provider::{MetadataProvider, PythonProvider, StaticProvider};
use crate::tree::{tree_to_graph, ModuleTree, ScopeWalker};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    let verbose = matches!(args.command, Command::Walk { verbose: true, .. });
    init_tracing(verbose);

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` wins unless `--verbose` is given
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn execute(args: Args) -> Result<()> {
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
            verbose: _,
        } => {
            // An explicit config file must load; the default one is optional
            let mut cfg = match &config {
                Some(path) => Config::load(path)?,
                None => Config::load_or_default(Path::new(CONFIG_FILE)),
            };

            cfg.merge_cli(CliOverrides {
                root,
                depth,
                include_private,
                ignore,
                format,
                output,
            });
            cfg.validate()?;

            tracing::debug!(
                scope = %scope,
                max_depth = cfg.walk.max_depth,
                skip_private = cfg.walk.skip_private,
                ignore = ?cfg.walk.ignore,
                "walk settings"
            );

            let tree = match &manifest {
                Some(path) => {
                    let provider = StaticProvider::load(path)?;
                    walk(&provider, &scope, &cfg)?
                }
                None => {
                    let provider = PythonProvider::from_config(&cfg.source)?;
                    tracing::debug!(root = %provider.root().display(), "reading Python sources");
                    walk(&provider, &scope, &cfg)?
                }
            };

            let graph = tree_to_graph(&tree);
            let rendered = match cfg.output.format {
                OutputFormat::Json => WalkReport::new(&cfg.project.name, &tree, &graph).to_json()?,
                OutputFormat::Text => render_text(&tree, &graph),
            };

            match &cfg.output.path {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(path, rendered)?;
                    tracing::info!(path = %path.display(), nodes = tree.len(), "report written");
                }
                None => print!("{}", rendered),
            }

            Ok(())
        }

        Command::Version => {
            println!("classy-mermaid {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn walk<P: MetadataProvider>(provider: &P, scope: &str, cfg: &Config) -> Result<ModuleTree> {
    ScopeWalker::new(provider)
        .with_options(cfg.walk.options())
        .walk(scope)
}
