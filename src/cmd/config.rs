//! Configuration view and validation commands: `suds config`.

use std::path::Path;

use anyhow::Result;
use suds::config::{CliOverrides, SudsConfig, SudsToml, project_config_path};

use super::super::ConfigCommands;

pub fn cmd_config(project_dir: &Path, overrides: CliOverrides, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            let config = SudsConfig::resolve(project_dir, overrides)?;

            println!();
            println!("Suds Configuration");
            println!("==================");
            println!();
            match &config.source {
                Some(path) => println!("Config file: {}", path.display()),
                None => {
                    println!("No suds.toml found, using defaults.");
                    println!("Run 'suds config init' to create one.");
                }
            }
            println!();

            let toml = &config.toml;
            println!("[api]");
            println!("  base_url = \"{}\"", toml.api.base_url);
            if toml.api.token.is_some() {
                println!("  token = \"********\"");
            }
            if let Some(timeout) = toml.api.timeout_secs {
                println!("  timeout_secs = {}", timeout);
            }
            println!();
            println!("[push]");
            println!("  enabled = {}", toml.push.enabled);
            println!("  reconnect_delay_secs = {}", toml.push.reconnect_delay_secs);
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  base_url = \"{}\" ({})", config.base_url, config.base_url_origin);
            println!("  token = {}", if config.token.is_some() { "set" } else { "not set" });
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let config = SudsConfig::resolve(project_dir, overrides)?;
            if config.source.is_none() {
                println!("No suds.toml found. Using defaults.");
            }

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            let config_path = project_config_path(project_dir);
            if config_path.exists() {
                println!("suds.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            SudsToml::default().save(&config_path)?;

            println!("Created suds.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, token, timeout_secs");
            println!("  - [push] enabled, reconnect_delay_secs");
            println!();
        }
    }

    Ok(())
}
