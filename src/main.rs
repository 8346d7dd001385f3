//
//  bitbucket-insights
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bitbucket_insights::api::ApiError;
use bitbucket_insights::cli::{Cli, Commands, UsageError};
use bitbucket_insights::exit_codes;

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code_for(&e));
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("BBI_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<UsageError>().is_some() {
        exit_codes::USAGE
    } else if error.downcast_ref::<ApiError>().is_some_and(ApiError::is_auth) {
        exit_codes::AUTH_ERROR
    } else {
        exit_codes::ERROR
    }
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Extract(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await.map(|()| exit_codes::SUCCESS),
        Commands::Version => {
            println!("bbi version {}", bitbucket_insights::VERSION);
            Ok(exit_codes::SUCCESS)
        }
    }
}
