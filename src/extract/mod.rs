//
//  bitbucket-insights
//  extract/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Pull Request Extractor
//!
//! Reads pull requests, their approval events and their commit counts from
//! a Bitbucket Server repository, on top of [`BitbucketClient`].
//!
//! ## Operations
//!
//! | Operation | Endpoint | Result |
//! |-----------|----------|--------|
//! | [`get_pull_requests`](PullRequestExtractor::get_pull_requests) | `pull-requests?state=` | PRs in API order |
//! | [`get_pr_activities`](PullRequestExtractor::get_pr_activities) | `pull-requests/{id}/activities` | approval events only |
//! | [`get_pr_commit_count`](PullRequestExtractor::get_pr_commit_count) | `pull-requests/{id}/commits` | number of commits |
//! | [`get_all_prs_with_approvals`](PullRequestExtractor::get_all_prs_with_approvals) | all of the above | [`RepositoryExtraction`] |
//!
//! ## Failure Policy
//!
//! The combined operation tolerates partial failure. When the activities or
//! commits of one pull request cannot be fetched, that pull request is still
//! returned, with no approvals or an unknown commit count, and an
//! [`ExtractionWarning`] is recorded. Fatal errors (see
//! [`ApiError::is_fatal`]) abort the repository.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_insights::api::BitbucketClient;
//! use bitbucket_insights::config::Config;
//! use bitbucket_insights::extract::{PullRequestExtractor, StateFilter};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load(None)?;
//! let client = BitbucketClient::from_config(&config)?;
//! let extractor = PullRequestExtractor::new(&client).with_state(StateFilter::Merged);
//!
//! let extraction = extractor.get_all_prs_with_approvals("PROJ", "app").await?;
//! println!("{} pull requests", extraction.pull_requests.len());
//! # Ok(())
//! # }
//! ```

pub mod records;

pub use records::*;

use std::collections::HashSet;

use reqwest::Method;
use serde::de::IgnoredAny;

use crate::api::server::{activities_path, commits_path, pull_requests_path, Activity, PullRequest};
use crate::api::{ApiError, BitbucketClient};

/// Pull requests read from a listing, plus what went wrong along the way.
struct Listing {
    records: Vec<PullRequestRecord>,
    warnings: Vec<ExtractionWarning>,
    error: Option<ApiError>,
}

/// Extracts pull-request data from one Bitbucket Server instance.
pub struct PullRequestExtractor<'a> {
    client: &'a BitbucketClient,
    state: StateFilter,
}

impl<'a> PullRequestExtractor<'a> {
    /// Creates an extractor listing pull requests of every state.
    pub fn new(client: &'a BitbucketClient) -> Self {
        Self {
            client,
            state: StateFilter::All,
        }
    }

    /// Sets the state filter used by
    /// [`get_all_prs_with_approvals`](Self::get_all_prs_with_approvals).
    pub fn with_state(mut self, state: StateFilter) -> Self {
        self.state = state;
        self
    }

    /// Lists the pull requests of a repository in API order.
    ///
    /// The state filter is applied by the server; entries that still come
    /// back in another state are dropped. Duplicate ids are dropped too.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised while paging, after the client's retries.
    pub async fn get_pull_requests(
        &self,
        project: &str,
        repo: &str,
        state: StateFilter,
    ) -> Result<Vec<PullRequestRecord>, ApiError> {
        let listing = self.list(project, repo, state).await;
        match listing.error {
            Some(e) => Err(e),
            None => Ok(listing.records),
        }
    }

    /// Returns the approval-type events of a pull request, in API order.
    ///
    /// Comments, rescopes, merges and every other action are discarded.
    pub async fn get_pr_activities(
        &self,
        project: &str,
        repo: &str,
        pr_id: u64,
    ) -> Result<Vec<Approval>, ApiError> {
        let path = activities_path(project, repo, pr_id);
        let mut pages = self.client.paginate::<Activity>(Method::GET, &path, &[]);
        let mut approvals = Vec::new();

        while let Some(activity) = pages.try_next().await? {
            if let Some(approval) = Approval::from_activity(pr_id, &activity) {
                approvals.push(approval);
            }
        }

        Ok(approvals)
    }

    /// Counts the commits of a pull request across every page.
    pub async fn get_pr_commit_count(
        &self,
        project: &str,
        repo: &str,
        pr_id: u64,
    ) -> Result<u32, ApiError> {
        let path = commits_path(project, repo, pr_id);
        self.client
            .paginate::<IgnoredAny>(Method::GET, &path, &[])
            .count()
            .await
    }

    /// Lists pull requests with the configured state filter and attaches
    /// approvals and commit counts to each.
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned: authentication, permission or
    /// not-found failures abort the repository. Everything else becomes an
    /// [`ExtractionWarning`] on the returned [`RepositoryExtraction`].
    pub async fn get_all_prs_with_approvals(
        &self,
        project: &str,
        repo: &str,
    ) -> Result<RepositoryExtraction, ApiError> {
        let listing = self.list(project, repo, self.state).await;
        let mut warnings = listing.warnings;

        if let Some(e) = listing.error {
            if e.is_fatal() {
                return Err(e);
            }
            tracing::warn!(
                "Listing pull requests of {}/{} stopped after {} entries: {}",
                project,
                repo,
                listing.records.len(),
                e
            );
            warnings.push(ExtractionWarning {
                pr_id: None,
                stage: ExtractionStage::Listing,
                message: e.to_string(),
            });
        }

        let mut pull_requests = Vec::with_capacity(listing.records.len());

        for (index, mut record) in listing.records.into_iter().enumerate() {
            if index > 0 {
                self.client.pause(self.client.policy().pr_delay).await;
            }

            let approvals = match self.get_pr_activities(project, repo, record.id).await {
                Ok(approvals) => approvals,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("Skipping approvals of PR #{}: {}", record.id, e);
                    warnings.push(ExtractionWarning {
                        pr_id: Some(record.id),
                        stage: ExtractionStage::Activities,
                        message: e.to_string(),
                    });
                    Vec::new()
                }
            };

            record.commit_count = match self.get_pr_commit_count(project, repo, record.id).await {
                Ok(count) => Some(count),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("Commit count of PR #{} unknown: {}", record.id, e);
                    warnings.push(ExtractionWarning {
                        pr_id: Some(record.id),
                        stage: ExtractionStage::Commits,
                        message: e.to_string(),
                    });
                    None
                }
            };

            pull_requests.push(ExtractedPullRequest {
                pull_request: record,
                approvals,
            });
        }

        tracing::info!(
            "Extracted {} pull requests from {}/{} ({} warnings)",
            pull_requests.len(),
            project,
            repo,
            warnings.len()
        );

        Ok(RepositoryExtraction {
            project_key: project.to_string(),
            repo_slug: repo.to_string(),
            pull_requests,
            warnings,
        })
    }

    /// Pages through the listing, keeping whatever was read before an error.
    async fn list(&self, project: &str, repo: &str, state: StateFilter) -> Listing {
        let path = pull_requests_path(project, repo);
        let query = [("state", state.as_query())];
        let mut pages = self.client.paginate::<PullRequest>(Method::GET, &path, &query);

        let mut seen = HashSet::new();
        let mut listing = Listing {
            records: Vec::new(),
            warnings: Vec::new(),
            error: None,
        };

        loop {
            let pr = match pages.try_next().await {
                Ok(Some(pr)) => pr,
                Ok(None) => break,
                Err(e) => {
                    listing.error = Some(e);
                    break;
                }
            };

            if !seen.insert(pr.id) {
                tracing::debug!("Dropping duplicate PR #{} in {}/{}", pr.id, project, repo);
                continue;
            }

            let record = match PullRequestRecord::from_server(project, repo, &pr) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping PR #{}: {}", pr.id, e);
                    listing.warnings.push(ExtractionWarning {
                        pr_id: Some(pr.id),
                        stage: ExtractionStage::Listing,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if !state.matches(record.state) {
                tracing::warn!(
                    "Server returned PR #{} in state {} for filter {}; dropping it",
                    record.id,
                    record.state,
                    state
                );
                continue;
            }

            listing.records.push(record);
        }

        listing
    }
}
