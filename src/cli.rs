//! Command-line interface definitions and parsing
//!
//! # Commands
//!
//! - **run**: evaluate every action against files and write changes back
//! - **check**: explain what each action would do to one file
//! - **list** / **show**: inspect the action registry
//! - **validate**: report actions disabled by configuration errors
//! - **config**: show or change settings
//! - **completions**: print a shell completion script
//!
//! # Examples
//!
//! ```
//! use autometa::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["autometa", "run", "notes/", "--dry-run"]);
//! assert!(matches!(cli.command, Commands::Run { dry_run: true, .. }));
//! ```

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::engine::TagStyle;

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g., tag_style=frontmatter)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to retrieve (e.g., quiet)
        #[arg(value_name = "KEY")]
        key: String,
    },
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "autometa")]
#[command(about = "Rule-driven metadata automation for markdown notes", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Action registry file (overrides config)
    #[arg(short = 'r', long = "registry", value_name = "FILE", global = true)]
    pub registry: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Evaluate actions against files and write the results back
    Run {
        /// Files, directories or glob patterns (directories expand to **/*.md)
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,

        /// Vault root that folder targets are relative to
        #[arg(long = "root", value_name = "DIR")]
        root: Option<PathBuf>,

        /// Report changes without writing files
        #[arg(short = 'n', long = "dry-run")]
        dry_run: bool,

        /// Print one JSON outcome per file
        #[arg(long = "json")]
        json: bool,

        /// Where added tags are written (overrides config)
        #[arg(long = "tag-style", value_enum)]
        tag_style: Option<TagStyle>,
    },

    /// Explain what each action would do to a file
    #[command(visible_alias = "c")]
    Check {
        /// File to check
        file: PathBuf,

        /// Vault root that folder targets are relative to
        #[arg(long = "root", value_name = "DIR")]
        root: Option<PathBuf>,

        /// Where added tags are written (overrides config)
        #[arg(long = "tag-style", value_enum)]
        tag_style: Option<TagStyle>,
    },

    /// List actions in the registry
    #[command(visible_alias = "ls")]
    List,

    /// Print one action's definition
    Show {
        /// Action name
        name: String,
    },

    /// Validate the registry, failing if any action is disabled
    Validate,

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
