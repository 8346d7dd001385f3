//
//  bitbucket-insights
//  context/strategy.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # History Source Selection
//!
//! Pull-request history is read either from the Bitbucket Server REST API
//! or, when the API cannot be used, from merge commits in the local clone.
//! The choice is made once per repository, before any extraction starts.
//!
//! | Mode | Result |
//! |------|--------|
//! | `auto` | API when the clone host is the configured server and credentials are set |
//! | `api` | Always the API |
//! | `local` | Always local history |

use std::fmt;
use std::str::FromStr;

use super::{HostType, RepoContext};
use crate::config::Config;

/// How the history source is chosen (`--source`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceMode {
    #[default]
    Auto,
    Api,
    Local,
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "api" => Ok(Self::Api),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown source '{}' (expected auto, api or local)", other)),
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Api => "api",
            Self::Local => "local",
        };
        f.write_str(name)
    }
}

/// Where the pull-request history of one repository comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistorySource {
    /// Query the REST API for `project`/`repo`.
    Api { project: String, repo: String },
    /// Derive merged pull requests from local merge commits.
    LocalHistory { reason: String },
}

/// Decides the history source for one repository.
pub fn select_history_source(ctx: &RepoContext, config: &Config, mode: SourceMode) -> HistorySource {
    let api = || HistorySource::Api {
        project: ctx.owner.clone(),
        repo: ctx.repo_slug.clone(),
    };
    let local = |reason: String| HistorySource::LocalHistory { reason };

    match mode {
        SourceMode::Api => return api(),
        SourceMode::Local => return local("local history requested".to_string()),
        SourceMode::Auto => {}
    }

    if ctx.host_type == HostType::Cloud {
        return local(format!("{} is Bitbucket Cloud, not a Server instance", ctx.host));
    }

    let Some(server_host) = config.bitbucket.host() else {
        return local("no Bitbucket Server URL configured".to_string());
    };

    if server_host != ctx.host {
        return local(format!(
            "{} is not the configured server {}",
            ctx.host, server_host
        ));
    }

    if config.bitbucket.credentials().is_none() {
        return local("no Bitbucket credentials configured".to_string());
    }

    api()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BitbucketConfig;

    fn ctx(host: &str, host_type: HostType) -> RepoContext {
        RepoContext {
            host: host.to_string(),
            host_type,
            owner: "PROJ".to_string(),
            repo_slug: "app".to_string(),
            clone_url: format!("https://{}/scm/PROJ/app.git", host),
        }
    }

    fn configured() -> Config {
        Config {
            bitbucket: BitbucketConfig::new("https://bb.example.com", "jdoe", "secret"),
            ..Config::default()
        }
    }

    #[test]
    fn test_auto_uses_api_for_configured_server() {
        let source = select_history_source(&ctx("bb.example.com", HostType::Server), &configured(), SourceMode::Auto);
        assert_eq!(
            source,
            HistorySource::Api {
                project: "PROJ".to_string(),
                repo: "app".to_string()
            }
        );
    }

    #[test]
    fn test_auto_falls_back_for_other_host() {
        let source = select_history_source(&ctx("git.other.com", HostType::Server), &configured(), SourceMode::Auto);
        assert!(matches!(source, HistorySource::LocalHistory { .. }));
    }

    #[test]
    fn test_auto_falls_back_without_credentials() {
        let mut config = configured();
        config.bitbucket.token = None;
        let source = select_history_source(&ctx("bb.example.com", HostType::Server), &config, SourceMode::Auto);
        assert!(matches!(source, HistorySource::LocalHistory { reason } if reason.contains("credentials")));
    }

    #[test]
    fn test_auto_falls_back_for_cloud() {
        let source = select_history_source(&ctx("bitbucket.org", HostType::Cloud), &configured(), SourceMode::Auto);
        assert!(matches!(source, HistorySource::LocalHistory { .. }));
    }

    #[test]
    fn test_forced_modes() {
        let other = ctx("git.other.com", HostType::Server);
        assert!(matches!(
            select_history_source(&other, &Config::default(), SourceMode::Api),
            HistorySource::Api { .. }
        ));
        assert!(matches!(
            select_history_source(&ctx("bb.example.com", HostType::Server), &configured(), SourceMode::Local),
            HistorySource::LocalHistory { .. }
        ));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("API".parse::<SourceMode>().unwrap(), SourceMode::Api);
        assert!("remote".parse::<SourceMode>().is_err());
    }
}
