//
//  bitbucket-insights
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Process-wide configuration is built once, from a TOML file plus
//! environment overrides, and then passed explicitly into the API client and
//! the extractor. Nothing reads configuration from global state afterwards.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/bbi/config.toml`
//! - **macOS**: `~/Library/Application Support/bbi/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\bbi\config\config.toml`
//!
//! A different file can be given with `--config`.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [bitbucket]
//! url = "https://bitbucket.example.com"
//! username = "jdoe"
//! token = "NjM0NTY3ODkw..."
//! verify_ssl = false
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 1000
//! page_delay_ms = 100
//!
//! [extract]
//! state = "MERGED"
//! workdir = "repos"
//! output = "bitbucket-insights.json"
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `BITBUCKET_URL` | `bitbucket.url` |
//! | `BITBUCKET_USERNAME` | `bitbucket.username` |
//! | `BITBUCKET_TOKEN` / `BITBUCKET_APP_PASSWORD` | `bitbucket.token` |
//! | `BITBUCKET_VERIFY_SSL` | `bitbucket.verify_ssl` |

mod file;
mod hosts;

pub use file::*;
pub use hosts::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::auth::Credentials;
use crate::extract::StateFilter;

/// Complete configuration for an extraction run.
///
/// All sections use `#[serde(default)]`, so an empty file is valid.
///
/// # Example
///
/// ```rust
/// use bitbucket_insights::config::Config;
///
/// let config: Config = toml::from_str(r#"
///     [bitbucket]
///     url = "https://bitbucket.example.com"
/// "#).unwrap();
///
/// assert!(!config.bitbucket.verify_ssl);
/// assert_eq!(config.retry.max_attempts, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Bitbucket Server connection settings.
    #[serde(default)]
    pub bitbucket: BitbucketConfig,

    /// Retry, backoff and throttling settings.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Extraction defaults.
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Connection settings for one Bitbucket Server/Data Center instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct BitbucketConfig {
    /// Base URL of the instance, e.g. `https://bitbucket.example.com`.
    #[serde(default)]
    pub url: Option<String>,

    /// Username for Basic authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// App password or personal access token.
    #[serde(default)]
    pub token: Option<String>,

    /// Validate the server's TLS certificate.
    ///
    /// Disabled by default so that self-signed internal certificates work.
    /// Transport encryption is unaffected by this flag.
    #[serde(default)]
    pub verify_ssl: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Page size requested from paginated endpoints.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_limit() -> u32 {
    100
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            token: None,
            verify_ssl: false,
            timeout_secs: default_timeout_secs(),
            page_limit: default_page_limit(),
        }
    }
}

impl std::fmt::Debug for BitbucketConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitbucketConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "********"))
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout_secs", &self.timeout_secs)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

impl BitbucketConfig {
    /// Creates a configuration for `url` with the given credentials.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            url: Some(url.into()),
            username: Some(username.into()),
            token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Returns the credentials if both username and token are set.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.token) {
            (Some(user), Some(token)) if !user.is_empty() && !token.is_empty() => {
                Some(Credentials::new(user.clone(), token.clone()))
            }
            _ => None,
        }
    }

    /// Returns the normalized host of the configured URL.
    pub fn host(&self) -> Option<String> {
        self.url.as_deref().and_then(host_of_url)
    }

    /// Returns `true` when URL, username and token are all present.
    pub fn is_complete(&self) -> bool {
        self.host().is_some() && self.credentials().is_some()
    }
}

/// `[retry]` section. Durations are given in milliseconds unless the name
/// says otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_max_rate_limit_retries")]
    pub max_rate_limit_retries: u32,
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "default_pr_delay_ms")]
    pub pr_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_max_rate_limit_retries() -> u32 {
    5
}

fn default_retry_after_secs() -> u64 {
    60
}

fn default_page_delay_ms() -> u64 {
    100
}

fn default_pr_delay_ms() -> u64 {
    50
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_rate_limit_retries: default_max_rate_limit_retries(),
            default_retry_after_secs: default_retry_after_secs(),
            page_delay_ms: default_page_delay_ms(),
            pr_delay_ms: default_pr_delay_ms(),
        }
    }
}

/// `[extract]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Pull-request state requested from the server.
    #[serde(default)]
    pub state: StateFilter,

    /// Directory that receives the local clones.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,

    /// Path of the JSON export document.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_workdir() -> PathBuf {
    PathBuf::from("repos")
}

fn default_output() -> PathBuf {
    PathBuf::from("bitbucket-insights.json")
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            state: StateFilter::default(),
            workdir: default_workdir(),
            output: default_output(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the default location when
    /// `path` is `None`, then applies environment overrides.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::config_path()?;
                if config_exists(&path) {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_with(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parses a configuration file without applying environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = read_config_file(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Writes the configuration as TOML.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_config_file(path, &content)
    }

    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// Empty values are ignored. `BITBUCKET_TOKEN` wins over
    /// `BITBUCKET_APP_PASSWORD`.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = get("BITBUCKET_URL") {
            self.bitbucket.url = Some(url);
        }
        if let Some(username) = get("BITBUCKET_USERNAME") {
            self.bitbucket.username = Some(username);
        }
        if let Some(token) = get("BITBUCKET_TOKEN").or_else(|| get("BITBUCKET_APP_PASSWORD")) {
            self.bitbucket.token = Some(token);
        }
        if let Some(verify) = get("BITBUCKET_VERIFY_SSL") {
            match parse_bool(&verify) {
                Some(value) => self.bitbucket.verify_ssl = value,
                None => tracing::warn!("Ignoring invalid BITBUCKET_VERIFY_SSL value '{}'", verify),
            }
        }
    }

    /// Returns the default configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
