//
//  bitbucket-insights
//  context/resolver.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Repository Context Resolver
//!
//! Resolves each repository input of a run into a [`RepoContext`].
//!
//! ## Supported Inputs
//!
//! ### Clone URLs
//! - HTTPS SCM: `https://server/scm/PROJECT/repo.git`
//! - SSH: `ssh://git@server:7999/PROJECT/repo.git`
//! - SCP-style SSH: `git@host:owner/repo.git`
//! - HTTPS: `https://host/owner/repo.git`
//!
//! ### Other Inputs
//! - `PROJECT/REPO`: expanded to an SCM clone URL on the configured server
//! - A path to an existing clone: its `origin` remote is parsed
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_insights::config::Config;
//! use bitbucket_insights::context::{ContextResolver, HostType};
//!
//! let config = Config::default();
//! let resolver = ContextResolver::new(&config);
//!
//! let ctx = resolver.parse_remote_url("ssh://git@bb.example.com:7999/PROJ/app.git")?;
//! assert_eq!(ctx.owner, "PROJ");
//! assert_eq!(ctx.host_type, HostType::Server);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{GitContext, HostType, RepoContext};
use crate::config::{is_cloud_host, Config};

static SSH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^git@([^:]+):(.+)/(.+?)(?:\.git)?/?$").expect("valid regex"));

static HTTPS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:[^@/]+@)?([^/:]+)(?::\d+)?/(.+)/(.+?)(?:\.git)?/?$")
        .expect("valid regex")
});

static SERVER_SSH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ssh://(?:[^@/]+@)?([^:/]+)(?::\d+)?/(.+)/(.+?)(?:\.git)?/?$")
        .expect("valid regex")
});

static SERVER_SCM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:[^@/]+@)?([^/:]+)(?::\d+)?/(?:.+/)?scm/([^/]+)/(.+?)(?:\.git)?/?$")
        .expect("valid regex")
});

/// Resolves repository inputs against the run's configuration.
pub struct ContextResolver<'a> {
    config: &'a Config,
}

impl<'a> ContextResolver<'a> {
    /// Creates a resolver using the configured Bitbucket server.
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Resolves one command-line input.
    ///
    /// Existing directories are treated as local clones, values containing
    /// `://` or `@` as clone URLs, and anything else as `PROJECT/REPO`.
    pub fn resolve(&self, input: &str) -> Result<RepoContext> {
        let input = input.trim();
        let path = Path::new(input);

        if path.is_dir() {
            return self.resolve_path(path);
        }
        if input.contains("://") || input.contains('@') {
            return self.parse_remote_url(input);
        }
        self.parse_repo_arg(input)
    }

    /// Resolves an existing clone through its `origin` remote.
    pub fn resolve_path(&self, path: &Path) -> Result<RepoContext> {
        let git = GitContext::open_at(path)?;
        let url = git
            .origin_url()?
            .with_context(|| format!("{} has no origin remote", path.display()))?;
        self.parse_remote_url(&url)
    }

    /// Expands `PROJECT/REPO` into a context on the configured server.
    pub fn parse_repo_arg(&self, repo: &str) -> Result<RepoContext> {
        let parts: Vec<&str> = repo.split('/').collect();
        let [owner, repo_slug] = parts.as_slice() else {
            anyhow::bail!("Invalid repository '{}'. Expected PROJECT/REPO", repo);
        };
        if owner.is_empty() || repo_slug.is_empty() {
            anyhow::bail!("Invalid repository '{}'. Expected PROJECT/REPO", repo);
        }

        let base_url = self
            .config
            .bitbucket
            .url
            .as_deref()
            .context("PROJECT/REPO inputs require bitbucket.url to be configured")?;
        let host = self
            .config
            .bitbucket
            .host()
            .with_context(|| format!("Invalid Bitbucket URL: {}", base_url))?;

        Ok(RepoContext {
            host_type: host_type_of(&host),
            host,
            owner: owner.to_string(),
            repo_slug: repo_slug.to_string(),
            clone_url: RepoContext::clone_url_for(base_url, owner, repo_slug),
        })
    }

    /// Parses a clone URL.
    pub fn parse_remote_url(&self, url: &str) -> Result<RepoContext> {
        let url = url.trim();
        let context = |caps: regex::Captures<'_>, host_type: Option<HostType>| {
            let host = caps[1].to_lowercase();
            RepoContext {
                host_type: host_type.unwrap_or_else(|| host_type_of(&host)),
                host,
                owner: caps[2].to_string(),
                repo_slug: caps[3].to_string(),
                clone_url: url.to_string(),
            }
        };

        if let Some(caps) = SSH_PATTERN.captures(url) {
            return Ok(context(caps, None));
        }

        if let Some(caps) = SERVER_SCM_PATTERN.captures(url) {
            return Ok(context(caps, Some(HostType::Server)));
        }

        if let Some(caps) = SERVER_SSH_PATTERN.captures(url) {
            return Ok(context(caps, None));
        }

        if let Some(caps) = HTTPS_PATTERN.captures(url) {
            return Ok(context(caps, None));
        }

        anyhow::bail!("Could not parse repository URL: {}", url)
    }
}

fn host_type_of(host: &str) -> HostType {
    if is_cloud_host(host) {
        HostType::Cloud
    } else {
        HostType::Server
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BitbucketConfig;

    fn server_config() -> Config {
        Config {
            bitbucket: BitbucketConfig::new("https://bb.example.com/", "jdoe", "t"),
            ..Config::default()
        }
    }

    #[test]
    fn test_parse_cloud_ssh() {
        let config = Config::default();
        let ctx = ContextResolver::new(&config)
            .parse_remote_url("git@bitbucket.org:workspace/repo.git")
            .unwrap();
        assert_eq!(ctx.host, "bitbucket.org");
        assert_eq!(ctx.owner, "workspace");
        assert_eq!(ctx.repo_slug, "repo");
        assert_eq!(ctx.host_type, HostType::Cloud);
    }

    #[test]
    fn test_parse_server_scm() {
        let config = Config::default();
        let ctx = ContextResolver::new(&config)
            .parse_remote_url("https://bitbucket.company.com/scm/PROJ/repo.git")
            .unwrap();
        assert_eq!(ctx.host, "bitbucket.company.com");
        assert_eq!(ctx.owner, "PROJ");
        assert_eq!(ctx.repo_slug, "repo");
        assert_eq!(ctx.host_type, HostType::Server);
    }

    #[test]
    fn test_parse_server_scm_with_user_port_and_context_path() {
        let config = Config::default();
        let ctx = ContextResolver::new(&config)
            .parse_remote_url("https://jdoe@bb.example.com:8443/bitbucket/scm/PROJ/app.git")
            .unwrap();
        assert_eq!(ctx.host, "bb.example.com");
        assert_eq!(ctx.owner, "PROJ");
        assert_eq!(ctx.repo_slug, "app");
    }

    #[test]
    fn test_parse_server_ssh() {
        let config = Config::default();
        let ctx = ContextResolver::new(&config)
            .parse_remote_url("ssh://git@bb.example.com:7999/proj/app.git")
            .unwrap();
        assert_eq!(ctx.host, "bb.example.com");
        assert_eq!(ctx.owner, "proj");
        assert_eq!(ctx.repo_slug, "app");
        assert_eq!(ctx.host_type, HostType::Server);
    }

    #[test]
    fn test_parse_repo_arg_uses_configured_server() {
        let config = server_config();
        let ctx = ContextResolver::new(&config).resolve("PROJ/app").unwrap();
        assert_eq!(ctx.host, "bb.example.com");
        assert_eq!(ctx.clone_url, "https://bb.example.com/scm/PROJ/app.git");
    }

    #[test]
    fn test_parse_repo_arg_requires_url() {
        let config = Config::default();
        assert!(ContextResolver::new(&config).resolve("PROJ/app").is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        let config = server_config();
        let resolver = ContextResolver::new(&config);
        assert!(resolver.parse_repo_arg("just-a-name").is_err());
        assert!(resolver.parse_repo_arg("a/b/c").is_err());
        assert!(resolver.parse_remote_url("ftp://nowhere").is_err());
    }

    #[test]
    fn test_resolve_local_clone() {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        repo.remote("origin", "https://bb.example.com/scm/PROJ/local.git")
            .unwrap();

        let config = Config::default();
        let ctx = ContextResolver::new(&config)
            .resolve(dir.path().to_str().unwrap())
            .unwrap();
        assert_eq!(ctx.full_name(), "PROJ/local");
    }
}
