//
//  bitbucket-insights
//  api/server/pullrequests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Pull Request Types
//!
//! Pull requests as returned by the `pull-requests` list endpoint. These are
//! raw wire types; the extractor converts them into
//! [`PullRequestRecord`](crate::extract::PullRequestRecord)s.
//!
//! ## Notes
//!
//! - Timestamps (`created_date`, `updated_date`, `closed_date`) are Unix milliseconds
//! - Branch IDs use the full ref path format: "refs/heads/branch-name"

use serde::{Deserialize, Serialize};

/// Represents a pull request in Bitbucket Server/Data Center.
///
/// # Example
///
/// ```rust
/// use bitbucket_insights::api::server::PullRequest;
///
/// let json = r#"{
///     "id": 42,
///     "title": "Add widget",
///     "state": "MERGED",
///     "createdDate": 1700000000000,
///     "updatedDate": 1700003600000,
///     "closedDate": 1700003600000,
///     "fromRef": {"id": "refs/heads/feature/widget", "displayId": "feature/widget"},
///     "toRef": {"id": "refs/heads/master", "displayId": "master"},
///     "author": {"user": {"name": "jdoe", "displayName": "Jane Doe"}, "role": "AUTHOR"}
/// }"#;
///
/// let pr: PullRequest = serde_json::from_str(json).unwrap();
/// assert_eq!(pr.from_ref.display_id, "feature/widget");
/// assert_eq!(pr.author.user.name, "jdoe");
/// ```
///
/// # Notes
///
/// - `state` can be "OPEN", "MERGED", or "DECLINED"
/// - `closed_date` is only present once the PR is merged or declined
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// Numeric identifier, unique within the repository.
    pub id: u64,

    /// Short summary title describing the changes.
    pub title: String,

    /// Detailed description of the changes being proposed.
    #[serde(default)]
    pub description: Option<String>,

    /// Current state of the pull request.
    /// Values: "OPEN", "MERGED", "DECLINED".
    pub state: String,

    /// Unix timestamp in milliseconds when the PR was created.
    #[serde(rename = "createdDate")]
    pub created_date: i64,

    /// Unix timestamp in milliseconds of the last update.
    #[serde(rename = "updatedDate", default)]
    pub updated_date: Option<i64>,

    /// Unix timestamp in milliseconds when the PR was merged or declined.
    #[serde(rename = "closedDate", default)]
    pub closed_date: Option<i64>,

    /// Source branch reference containing the changes to merge.
    #[serde(rename = "fromRef")]
    pub from_ref: PrRef,

    /// Target branch reference where changes will be merged.
    #[serde(rename = "toRef")]
    pub to_ref: PrRef,

    /// The user who created this pull request.
    pub author: PrParticipant,

    /// Users assigned to review this pull request.
    #[serde(default)]
    pub reviewers: Vec<PrParticipant>,
}

/// Branch reference within a pull request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrRef {
    /// Full Git ref path for the branch.
    /// Example: "refs/heads/feature/my-feature".
    pub id: String,

    /// Human-readable short name for the branch.
    #[serde(rename = "displayId", default)]
    pub display_id: String,

    /// SHA hash of the latest commit on this branch.
    #[serde(rename = "latestCommit", default)]
    pub latest_commit: Option<String>,
}

impl PrRef {
    /// Returns the short branch name, falling back to the ref path without
    /// its `refs/heads/` prefix.
    pub fn branch_name(&self) -> &str {
        if self.display_id.is_empty() {
            self.id.strip_prefix("refs/heads/").unwrap_or(&self.id)
        } else {
            &self.display_id
        }
    }
}

/// Represents a participant in a pull request.
///
/// # Notes
///
/// - Role values: "AUTHOR", "REVIEWER", "PARTICIPANT"
/// - Status values: "APPROVED", "UNAPPROVED", "NEEDS_WORK"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrParticipant {
    /// The user who is participating.
    pub user: User,

    /// Role of this participant in the pull request.
    #[serde(default)]
    pub role: Option<String>,

    /// Whether this participant has approved the pull request.
    #[serde(default)]
    pub approved: bool,

    /// Detailed review status from this participant.
    #[serde(default)]
    pub status: Option<String>,
}

/// Represents a user in Bitbucket Server/Data Center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique numeric identifier for the user.
    #[serde(default)]
    pub id: Option<u64>,

    /// Username (login name) for the user.
    pub name: String,

    /// Full display name of the user.
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,

    /// Email address of the user.
    /// May be `None` if hidden by privacy settings.
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,

    /// URL-safe version of the username.
    #[serde(default)]
    pub slug: Option<String>,
}

impl User {
    /// Returns the display name, or the login name when none is set.
    pub fn display(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_name_fallback() {
        let r = PrRef {
            id: "refs/heads/release/1.0".to_string(),
            display_id: String::new(),
            latest_commit: None,
        };
        assert_eq!(r.branch_name(), "release/1.0");
    }

    #[test]
    fn test_open_pr_without_closed_date() {
        let json = r#"{
            "id": 1, "title": "WIP", "state": "OPEN", "createdDate": 1,
            "fromRef": {"id": "refs/heads/a", "displayId": "a"},
            "toRef": {"id": "refs/heads/b", "displayId": "b"},
            "author": {"user": {"name": "x"}}
        }"#;
        let pr: PullRequest = serde_json::from_str(json).unwrap();
        assert!(pr.closed_date.is_none());
        assert_eq!(pr.author.user.display(), "x");
    }
}
