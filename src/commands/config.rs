//! Config command - show and change settings

use crate::{AutometaError, cli::ConfigCommands, config::AutometaConfig};

type Result<T> = std::result::Result<T, AutometaError>;

/// Execute a config subcommand
///
/// # Errors
///
/// Returns `AutometaError` if the setting is invalid, the key is unknown or
/// the configuration cannot be saved.
pub fn execute(mut config: AutometaConfig, command: &ConfigCommands, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            if !quiet {
                println!("# {}", AutometaConfig::config_path()?.display());
            }
            print!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| AutometaError::InvalidInput(e.to_string()))?
            );
        }
        ConfigCommands::Set { setting } => {
            config.set(setting)?;
            config.save()?;
            if !quiet {
                println!("Set {}", setting.trim());
            }
        }
        ConfigCommands::Get { key } => {
            let value = config
                .get(key)
                .ok_or_else(|| AutometaError::InvalidInput(format!("Unknown config key: {key}")))?;
            if quiet {
                println!("{value}");
            } else {
                println!("{key} = {value}");
            }
        }
    }
    Ok(())
}
