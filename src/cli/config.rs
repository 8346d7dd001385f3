//
//  bitbucket-insights
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Shows where the configuration lives, prints the effective settings with
//! the token redacted, and writes a starter file.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::{config_exists, Config};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Print the configuration file location
    Path,

    /// Print the effective configuration (file plus environment)
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Path => self.path(global),
            ConfigSubcommand::Show => self.show(global),
            ConfigSubcommand::Init { force } => self.init(*force, global),
        }
    }

    fn path(&self, global: &GlobalOptions) -> Result<()> {
        let path = match &global.config {
            Some(path) => path.clone(),
            None => Config::config_path()?,
        };

        if global.json {
            let result = serde_json::json!({
                "path": path,
                "exists": config_exists(&path),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", path.display());
        }
        Ok(())
    }

    fn show(&self, global: &GlobalOptions) -> Result<()> {
        let mut config = Config::load(global.config.as_deref())?;
        if config.bitbucket.token.is_some() {
            config.bitbucket.token = Some("********".to_string());
        }

        if global.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Ok(())
    }

    fn init(&self, force: bool, global: &GlobalOptions) -> Result<()> {
        let path = match &global.config {
            Some(path) => path.clone(),
            None => Config::config_path()?,
        };

        if config_exists(&path) && !force {
            bail!(
                "{} already exists. Use --force to overwrite it.",
                path.display()
            );
        }

        Config::default().save_to(&path)?;
        eprintln!("{} Wrote {}", style("✓").green().bold(), path.display());
        Ok(())
    }
}
