//
//  bitbucket-insights
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # bitbucket-insights
//!
//! A batch extractor for repository analytics. It clones Git repositories,
//! reads pull requests and approvals from the Bitbucket Server REST API
//! (v1.0) and writes them, together with the commit history, to a JSON
//! export document.
//!
//! ## Modules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`api`] | Authenticated, paginated, retry-safe HTTP client |
//! | [`extract`] | Pull requests, approvals and commit counts |
//! | [`context`] | Repository inputs and history source selection |
//! | [`history`] | Cloning and walking git history |
//! | [`output`] | Export document, summary table, status lines |
//! | [`config`] | TOML configuration with environment overrides |
//! | [`auth`] | Basic authentication credentials |
//! | [`cli`] | The `bbi` command line |
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_insights::api::BitbucketClient;
//! use bitbucket_insights::config::Config;
//! use bitbucket_insights::extract::PullRequestExtractor;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load(None)?;
//! let client = BitbucketClient::from_config(&config)?;
//! let extraction = PullRequestExtractor::new(&client)
//!     .get_all_prs_with_approvals("PROJ", "app")
//!     .await?;
//!
//! for pr in &extraction.pull_requests {
//!     println!("#{} {} ({} approvals)", pr.pull_request.id, pr.pull_request.title, pr.approvals.len());
//! }
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
pub mod cli;

/// HTTP client for the Bitbucket Server/Data Center REST API v1.0.
///
/// Handles Basic authentication, pagination, rate limiting and retries.
pub mod api;

/// Basic authentication credentials for the REST API and git.
pub mod auth;

/// Configuration file and environment management.
///
/// The configuration is stored in platform-specific locations:
/// - Linux: `~/.config/bbi/config.toml`
/// - macOS: `~/Library/Application Support/bbi/config.toml`
/// - Windows: `%APPDATA%\bbi\config\config.toml`
pub mod config;

/// Repository input resolution and history source selection.
pub mod context;

/// Pull request and approval extraction.
pub mod extract;

/// Git clone and history walking.
pub mod history;

/// Export document, tables and status output.
pub mod output;

/// Time and string helpers.
pub mod util;

pub use cli::Cli;

pub use config::Config;

pub use context::RepoContext;

/// Application name, used for the binary and the configuration directory.
pub const APP_NAME: &str = "bbi";

/// Application version, taken from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes of the `bbi` binary.
///
/// | Code | Meaning |
/// |------|---------|
/// | `0` | Every repository was extracted |
/// | `1` | The run failed |
/// | `2` | Invalid usage or arguments |
/// | `3` | At least one repository was aborted |
/// | `4` | Authentication was rejected |
///
/// # Example
///
/// ```rust,no_run
/// use bitbucket_insights::exit_codes;
/// use std::process;
///
/// process::exit(exit_codes::AUTH_ERROR);
/// ```
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error. Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// The export was written, but one or more repositories were aborted.
    pub const PARTIAL: i32 = 3;

    /// The server rejected the configured credentials.
    pub const AUTH_ERROR: i32 = 4;
}
