//
//  bitbucket-insights
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod config;
mod extract;

pub use config::ConfigCommand;
pub use extract::ExtractCommand;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "bbi",
    version,
    about = "Extract pull request and commit history from Bitbucket Server",
    long_about = "bbi clones repositories, reads pull requests and approvals from the \
                  Bitbucket Server REST API and writes them, together with the commit \
                  history, to a JSON export.",
    propagate_version = true,
    after_help = "Use 'bbi <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Options accepted by every command.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, env = "BBI_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract pull requests, approvals and commits from repositories
    #[command(visible_alias = "x")]
    Extract(ExtractCommand),

    /// Inspect the configuration
    Config(ConfigCommand),

    /// Print the version
    Version,
}

/// The command line was syntactically valid but cannot be acted on.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UsageError(pub String);
