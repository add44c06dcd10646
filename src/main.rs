//! Autometa CLI application entry point
//!
//! # Usage
//!
//! ```bash
//! # Apply every action to the notes in a vault
//! autometa run vault/ --root vault
//!
//! # Preview changes as JSON without writing
//! autometa run 'vault/projects/*.md' --root vault --dry-run --json
//!
//! # Explain what each action would do to one note
//! autometa check vault/projects/plan.md --root vault
//!
//! # Inspect and validate the registry
//! autometa list
//! autometa show mark-reviewed
//! autometa validate
//!
//! # Quiet mode (only output results)
//! autometa -q run vault/
//! ```
//!
//! # Configuration
//!
//! Settings are read from `~/.config/autometa/config.toml` on Linux and may
//! be overridden with `AUTOMETA_*` environment variables. Library log events
//! are enabled with `RUST_LOG`, e.g. `RUST_LOG=autometa=debug`.

use autometa::{
    AutometaError,
    cli::{Cli, Commands},
    commands::{self, run::RunOptions},
    config::AutometaConfig,
    engine::{Engine, TagStyle},
};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, AutometaError>;

fn init_tracing() {
    // Diagnostics are already printed by the commands.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .with_writer(std::io::stderr)
        .init();
}

/// Engine configured from settings, with a CLI tag style taking precedence
fn build_engine(config: &AutometaConfig, tag_style: Option<TagStyle>) -> Engine {
    let mut options = config.engine_options();
    if let Some(style) = tag_style {
        options.tag_style = style;
    }
    Engine::new(options)
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let config = AutometaConfig::load()?;
    let quiet = cli.quiet || config.quiet;

    match &cli.command {
        Commands::Run {
            paths,
            root,
            dry_run,
            json,
            tag_style,
        } => {
            let (_, registry) = commands::load_registry(cli.registry.as_deref(), &config)?;
            let engine = build_engine(&config, *tag_style);
            let options = RunOptions {
                root: root.clone(),
                dry_run: *dry_run,
                json: *json,
            };
            commands::run(&engine, &registry, paths, &options, quiet)
        }
        Commands::Check { file, root, tag_style } => {
            let (_, registry) = commands::load_registry(cli.registry.as_deref(), &config)?;
            let engine = build_engine(&config, *tag_style);
            commands::check(&engine, &registry, file, root.as_deref(), quiet)
        }
        Commands::List => {
            let (_, registry) = commands::load_registry(cli.registry.as_deref(), &config)?;
            commands::list(&registry, quiet)
        }
        Commands::Show { name } => {
            let (_, registry) = commands::load_registry(cli.registry.as_deref(), &config)?;
            commands::show(&registry, name)
        }
        Commands::Validate => {
            let (path, registry) = commands::load_registry(cli.registry.as_deref(), &config)?;
            commands::validate(&path, &registry, quiet)
        }
        Commands::Config { command } => commands::config(config, command, quiet),
        Commands::Completions { shell } => {
            commands::completions(*shell);
            Ok(())
        }
    }
}
