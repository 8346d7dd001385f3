//
//  bitbucket-insights
//  context/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Repository Context Module
//!
//! Turns the repository inputs of a run (clone URLs, `PROJECT/REPO` pairs or
//! paths to existing clones) into a [`RepoContext`], and decides once per
//! repository where its pull-request history comes from.
//!
//! ## Architecture
//!
//! - [`GitContext`]: Inspects an existing local clone
//! - [`ContextResolver`]: URL parsing and input resolution
//! - [`select_history_source`]: REST API or local git history
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_insights::config::{BitbucketConfig, Config};
//! use bitbucket_insights::context::{select_history_source, ContextResolver, HistorySource, SourceMode};
//!
//! let mut config = Config::default();
//! config.bitbucket = BitbucketConfig::new("https://bb.example.com", "jdoe", "secret");
//!
//! let resolver = ContextResolver::new(&config);
//! let ctx = resolver.parse_remote_url("https://bb.example.com/scm/PROJ/app.git")?;
//!
//! match select_history_source(&ctx, &config, SourceMode::Auto) {
//!     HistorySource::Api { project, repo } => assert_eq!((project.as_str(), repo.as_str()), ("PROJ", "app")),
//!     HistorySource::LocalHistory { reason } => panic!("unexpected fallback: {}", reason),
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

mod git;
mod resolver;
mod strategy;

pub use git::*;
pub use resolver::*;
pub use strategy::*;

/// Resolved information about one repository of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoContext {
    /// Hostname (e.g., "bitbucket.example.com")
    pub host: String,

    /// Whether the host is Bitbucket Cloud or a Server/DC instance
    pub host_type: HostType,

    /// Project key (Server) or workspace (Cloud)
    pub owner: String,

    /// Repository slug
    pub repo_slug: String,

    /// URL the repository is cloned from
    pub clone_url: String,
}

/// Kind of Bitbucket host a repository lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostType {
    Cloud,
    Server,
}

impl RepoContext {
    /// Returns `PROJECT/repo`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo_slug)
    }

    /// Builds the HTTP(S) SCM clone URL of a Server repository.
    ///
    /// ```rust
    /// use bitbucket_insights::context::RepoContext;
    ///
    /// assert_eq!(
    ///     RepoContext::clone_url_for("https://bb.example.com/", "PROJ", "app"),
    ///     "https://bb.example.com/scm/PROJ/app.git"
    /// );
    /// ```
    pub fn clone_url_for(base_url: &str, project: &str, repo: &str) -> String {
        let base = base_url.trim().trim_end_matches('/');
        let base = base.strip_suffix(crate::api::API_PATH).unwrap_or(base);
        format!("{}/scm/{}/{}.git", base, project, repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_url_strips_api_path() {
        assert_eq!(
            RepoContext::clone_url_for("https://bb.example.com/rest/api/1.0", "P", "r"),
            "https://bb.example.com/scm/P/r.git"
        );
    }

    #[test]
    fn test_full_name() {
        let ctx = RepoContext {
            host: "bb.example.com".to_string(),
            host_type: HostType::Server,
            owner: "PROJ".to_string(),
            repo_slug: "app".to_string(),
            clone_url: String::new(),
        };
        assert_eq!(ctx.full_name(), "PROJ/app");
    }
}
