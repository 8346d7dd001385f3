//
//  bitbucket-insights
//  history/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Git History Module
//!
//! Clones repositories and walks their commit history with `git2`.
//!
//! ## Overview
//!
//! - [`clone_or_open`]: Clone over HTTPS/SSH, or reuse an existing clone
//! - [`HistoryWalker::commits`]: Every commit reachable from `HEAD` with
//!   diff statistics against its first parent
//! - [`HistoryWalker::merged_pull_requests`]: Merged pull requests derived
//!   from merge commit messages, used when the REST API is not available
//!
//! ## Recognised Merge Messages
//!
//! | Host | Message |
//! |------|---------|
//! | Server/DC | `Merge pull request #12 in PROJ/app from feature/x to master` |
//! | Cloud | `Merged in feature/x (pull request #12)` |
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use bitbucket_insights::history::{clone_or_open, HistoryWalker};
//!
//! let repo = clone_or_open("https://bb.example.com/scm/PROJ/app.git", Path::new("repos/PROJ/app"), None, false)?;
//! let walker = HistoryWalker::new(repo);
//! for commit in walker.commits()? {
//!     println!("{} +{} -{}", commit.hash, commit.insertions, commit.deletions);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::cell::Cell;
use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use git2::{CertificateCheckStatus, Commit, Cred, CredentialType, Oid, Repository, Sort};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::Credentials;
use crate::extract::{PrState, PullRequestRecord};
use crate::util::seconds_to_datetime;

static SERVER_MERGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Merge pull request #(\d+) in (\S+)/(\S+) from (\S+) to (\S+)")
        .expect("valid regex")
});

static CLOUD_MERGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Merged in (\S+) \(pull request #(\d+)\)").expect("valid regex")
});

/// Attempts libgit2 may make at the credential callback before giving up.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// One commit of the walked history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub committed_at: DateTime<Utc>,
    /// First line of the commit message.
    pub summary: String,
    pub parent_count: usize,
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

/// Clones `url` into `dest`, or opens `dest` if it already holds a clone.
///
/// HTTPS remotes authenticate with `credentials`; SSH remotes use the
/// running SSH agent. With `verify_ssl` off, server certificates are not
/// validated.
///
/// # Errors
///
/// Fails if `dest` exists, is not empty and is not a git repository, or if
/// the clone itself fails.
pub fn clone_or_open(
    url: &str,
    dest: &Path,
    credentials: Option<&Credentials>,
    verify_ssl: bool,
) -> Result<Repository> {
    if dest.exists() {
        if let Ok(repo) = Repository::open(dest) {
            tracing::info!("Reusing existing clone at {}", dest.display());
            return Ok(repo);
        }
        let is_empty = std::fs::read_dir(dest)
            .with_context(|| format!("Failed to read {}", dest.display()))?
            .next()
            .is_none();
        if !is_empty {
            anyhow::bail!(
                "{} exists and is not a git repository",
                dest.display()
            );
        }
    } else if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    tracing::info!("Cloning {} to {}", url, dest.display());

    let attempts = Cell::new(0usize);
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed| {
        attempts.set(attempts.get() + 1);
        if attempts.get() > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication rejected by remote"));
        }

        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(credentials) = credentials {
                return credentials.to_git_cred();
            }
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
        }
        Cred::default()
    });

    if !verify_ssl {
        callbacks.certificate_check(|_cert, host| {
            tracing::debug!("Skipping certificate validation for {}", host);
            Ok(CertificateCheckStatus::CertificateOk)
        });
    }

    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_options);

    builder
        .clone(url, dest)
        .with_context(|| format!("Failed to clone {}", url))
}

/// Reads commit and merge history from a local repository.
pub struct HistoryWalker {
    repo: Repository,
}

impl HistoryWalker {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Opens the repository at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path)
            .with_context(|| format!("{} is not a git repository", path.display()))?;
        Ok(Self::new(repo))
    }

    /// Returns every commit reachable from `HEAD`, newest first.
    ///
    /// An empty repository yields no commits.
    pub fn commits(&self) -> Result<Vec<CommitRecord>> {
        let Some(oids) = self.walk_head()? else {
            return Ok(Vec::new());
        };

        let mut commits = Vec::with_capacity(oids.len());
        for oid in oids {
            let commit = self.repo.find_commit(oid)?;
            commits.push(self.commit_record(&commit)?);
        }

        tracing::debug!("Walked {} commits", commits.len());
        Ok(commits)
    }

    /// Derives merged pull requests from merge commits reachable from
    /// `HEAD`, ordered by pull request id.
    ///
    /// The commit count of each pull request is the number of commits the
    /// merge brought in (reachable from the second parent but not the
    /// first). Approvals are not recorded in git, so none are produced.
    pub fn merged_pull_requests(&self, project: &str, repo: &str) -> Result<Vec<PullRequestRecord>> {
        let Some(oids) = self.walk_head()? else {
            return Ok(Vec::new());
        };

        let head_branch = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.shorthand().map(str::to_string))
            .unwrap_or_else(|| "HEAD".to_string());

        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for oid in oids {
            let commit = self.repo.find_commit(oid)?;
            if commit.parent_count() < 2 {
                continue;
            }

            let message = commit.message().unwrap_or_default();
            let Some(merge) = parse_merge_message(message, &head_branch) else {
                continue;
            };
            if !seen.insert(merge.id) {
                continue;
            }

            let merged_at = git_time(&commit)?;
            let brought_in = self.merged_commits(&commit)?;
            let created_at = brought_in
                .iter()
                .filter_map(|oid| self.repo.find_commit(*oid).ok())
                .filter_map(|c| seconds_to_datetime(c.time().seconds()))
                .min()
                .unwrap_or(merged_at);

            records.push(PullRequestRecord {
                id: merge.id,
                project_key: project.to_string(),
                repo_slug: repo.to_string(),
                title: commit.summary().unwrap_or_default().to_string(),
                source_branch: merge.source,
                destination_branch: merge.destination,
                state: PrState::Merged,
                author: commit.author().name().unwrap_or_default().to_string(),
                created_at,
                updated_at: Some(merged_at),
                merged_at: Some(merged_at),
                commit_count: Some(brought_in.len() as u32),
            });
        }

        records.sort_by_key(|record| record.id);
        tracing::debug!("Found {} merged pull requests in local history", records.len());
        Ok(records)
    }

    /// Object ids reachable from `HEAD`, newest first; `None` when the
    /// repository is empty or `HEAD` is unborn.
    fn walk_head(&self) -> Result<Option<Vec<Oid>>> {
        if self.repo.is_empty()? {
            return Ok(None);
        }
        match self.repo.head() {
            Ok(_) => {}
            Err(e) if matches!(e.code(), git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound) => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        }

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TIME)?;
        walk.push_head()?;

        let oids = walk.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(oids))
    }

    /// Commits reachable from the second parent of `merge` but not from
    /// the first.
    fn merged_commits(&self, merge: &Commit<'_>) -> Result<Vec<Oid>> {
        let mut walk = self.repo.revwalk()?;
        walk.push(merge.parent_id(1)?)?;
        walk.hide(merge.parent_id(0)?)?;
        Ok(walk.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn commit_record(&self, commit: &Commit<'_>) -> Result<CommitRecord> {
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        let stats = diff.stats()?;
        let author = commit.author();

        Ok(CommitRecord {
            hash: commit.id().to_string(),
            author_name: author.name().unwrap_or_default().to_string(),
            author_email: author.email().unwrap_or_default().to_string(),
            committed_at: git_time(commit)?,
            summary: commit.summary().unwrap_or_default().to_string(),
            parent_count: commit.parent_count(),
            files_changed: stats.files_changed(),
            insertions: stats.insertions(),
            deletions: stats.deletions(),
        })
    }
}

fn git_time(commit: &Commit<'_>) -> Result<DateTime<Utc>> {
    let seconds = commit.time().seconds();
    seconds_to_datetime(seconds).with_context(|| format!("Invalid commit time {} on {}", seconds, commit.id()))
}

/// A pull request merge parsed from a commit message.
#[derive(Debug, PartialEq)]
struct MergeMessage {
    id: u64,
    source: String,
    destination: String,
}

/// Parses Server and Cloud merge messages. Cloud messages do not name the
/// destination, so `default_destination` is used.
fn parse_merge_message(message: &str, default_destination: &str) -> Option<MergeMessage> {
    let first_line = message.lines().next()?.trim();

    if let Some(caps) = SERVER_MERGE_PATTERN.captures(first_line) {
        return Some(MergeMessage {
            id: caps[1].parse().ok()?,
            source: caps[4].to_string(),
            destination: caps[5].to_string(),
        });
    }

    if let Some(caps) = CLOUD_MERGE_PATTERN.captures(first_line) {
        return Some(MergeMessage {
            id: caps[2].parse().ok()?,
            source: caps[1].to_string(),
            destination: default_destination.to_string(),
        });
    }

    None
}
