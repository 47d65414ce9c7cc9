use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use pyg_config::{Config, KNOWN_KEYS, POINTER_FILE};
use pyg_logger as logger;
use std::path::Path;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print every configured value
    Show,
    /// Print one configured value
    Get { key: String },
    Set {
        key: String,
        value: String,
    },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, the CLI will set the config path to that value.
    /// If omitted, the CLI will print the current configuration file path.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: ConfigAction, opts: &GlobalOpts) -> Result<(), String> {
    match action {
        ConfigAction::Show => {
            let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
            Ok(())
        }
        ConfigAction::Get { key } => {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                return Err(unknown_key(&key));
            }
            let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;
            if let Some(value) = config.get(&key) {
                println!("{}", value);
            }
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config =
                Config::load().map_err(|e| format!("Failed to load config: {}", e))?;
            config.set(&key, value.clone()).map_err(|e| match e {
                pyg_config::ConfigError::UnknownKey(_) => unknown_key(&key),
                other => other.to_string(),
            })?;
            config
                .save()
                .map_err(|e| format!("Failed to save config: {}", e))?;
            logger::success(&format!("Set {} = {}", key, value));
            Ok(())
        }
        ConfigAction::Path { new_path } => {
            let config_path = Config::path().map_err(|e| e.to_string())?;
            logger::debug(&format!("Reading config from: {}", config_path.display()));

            // The pointer file lives next to the default config, not the overridden one
            let default_path = Config::default_path().map_err(|e| e.to_string())?;
            let pointer_path = default_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(POINTER_FILE);

            match new_path {
                Some(p) => {
                    if let Some(parent) = pointer_path.parent() {
                        std::fs::create_dir_all(parent)
                            .map_err(|e| format!("Failed to set config path: {}", e))?;
                    }
                    std::fs::write(&pointer_path, p.as_bytes())
                        .map_err(|e| format!("Failed to set config path: {}", e))?;
                    logger::success(&format!("Config path set to {}", p));
                }
                None => {
                    println!("{}", config_path.display());
                    if let Ok(contents) = std::fs::read_to_string(&pointer_path) {
                        let trimmed = contents.trim();
                        if !trimmed.is_empty() {
                            println!("{} {}", "overridden-by".cyan(), trimmed);
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {}. Currently supported keys: {}",
        key,
        KNOWN_KEYS.join(", ")
    )
}
