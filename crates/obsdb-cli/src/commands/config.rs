//! Config command: inspect and edit the configuration file.

use std::path::Path;

use anyhow::Result;

use crate::cli::ConfigAction;
use crate::config::{Config, mask_secret};

pub fn cmd_config(action: ConfigAction, path: &Path, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let mut shown = config.clone();
            shown.api_key = shown.api_key.as_deref().map(mask_secret);
            println!("{}", toml::to_string_pretty(&shown)?);
        }
        ConfigAction::Get { key } => match config.get(key) {
            Some(value) => println!("{}", value),
            None => println!("(not set)"),
        },
        ConfigAction::Set { key, value } => {
            let mut config = config.clone();
            config.set(key, &value)?;
            config.save(path)?;
            println!("Saved {}", path.display());
        }
        ConfigAction::Unset { key } => {
            let mut config = config.clone();
            config.unset(key);
            config.save(path)?;
            println!("Saved {}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Init => {
            if path.exists() {
                println!("Config already exists at {}", path.display());
            } else {
                Config::default().save(path)?;
                println!("Created {}", path.display());
            }
        }
    }
    Ok(())
}
