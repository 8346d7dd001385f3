//
//  bitbucket-insights
//  api/server/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/Data Center API v1.0
//!
//! Wire types for the endpoints consumed by the extractor:
//!
//! ```text
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{id}/activities
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{id}/commits
//! ```
//!
//! ## Notes
//!
//! - Timestamps are Unix milliseconds instead of ISO 8601 strings
//! - Optional fields use `Option<T>` and default to `None` during deserialization

pub mod activities;
pub mod pullrequests;

pub use activities::Activity;
pub use pullrequests::{PrParticipant, PrRef, PullRequest, User};

/// Path of a repository's pull-request collection.
pub fn pull_requests_path(project: &str, repo: &str) -> String {
    format!("/projects/{}/repos/{}/pull-requests", project, repo)
}

/// Path of a pull request's activity log.
pub fn activities_path(project: &str, repo: &str, pr_id: u64) -> String {
    format!("{}/{}/activities", pull_requests_path(project, repo), pr_id)
}

/// Path of a pull request's commit listing.
pub fn commits_path(project: &str, repo: &str, pr_id: u64) -> String {
    format!("{}/{}/commits", pull_requests_path(project, repo), pr_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(
            pull_requests_path("PROJ", "app"),
            "/projects/PROJ/repos/app/pull-requests"
        );
        assert_eq!(
            activities_path("PROJ", "app", 7),
            "/projects/PROJ/repos/app/pull-requests/7/activities"
        );
        assert_eq!(
            commits_path("PROJ", "app", 7),
            "/projects/PROJ/repos/app/pull-requests/7/commits"
        );
    }
}
