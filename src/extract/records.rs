//
//  bitbucket-insights
//  extract/records.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Extraction Records
//!
//! Normalized records produced by the extractor and handed to the export
//! layer. Unlike the wire types in [`crate::api::server`], these use typed
//! states and `DateTime<Utc>` timestamps, and they carry the project and
//! repository they belong to.
//!
//! ## Record Overview
//!
//! | Record | Source | Cardinality |
//! |--------|--------|-------------|
//! | [`PullRequestRecord`] | `pull-requests` page entry | one per PR |
//! | [`Approval`] | `activities` entry with an approval-type action | many per PR |
//! | [`ExtractionWarning`] | failed non-fatal sub-fetch | many per repository |

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::server::{Activity, PullRequest};
use crate::api::ApiError;
use crate::util::millis_to_datetime;

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrState {
    Open,
    Merged,
    Declined,
}

impl PrState {
    /// Returns the API spelling of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
            Self::Declined => "DECLINED",
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            "DECLINED" => Ok(Self::Declined),
            other => Err(format!("unknown pull request state '{}'", other)),
        }
    }
}

/// Server-side state filter for the pull-request listing.
///
/// # Example
///
/// ```rust
/// use bitbucket_insights::extract::{PrState, StateFilter};
///
/// let filter: StateFilter = "merged".parse().unwrap();
/// assert_eq!(filter.as_query(), "MERGED");
/// assert!(filter.matches(PrState::Merged));
/// assert!(!filter.matches(PrState::Open));
/// assert!(StateFilter::All.matches(PrState::Declined));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateFilter {
    #[default]
    All,
    Open,
    Merged,
    Declined,
}

impl StateFilter {
    /// Value of the `state` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
            Self::Declined => "DECLINED",
        }
    }

    /// Whether a pull request in `state` belongs to this filter.
    pub fn matches(&self, state: PrState) -> bool {
        match self {
            Self::All => true,
            Self::Open => state == PrState::Open,
            Self::Merged => state == PrState::Merged,
            Self::Declined => state == PrState::Declined,
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for StateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            "DECLINED" => Ok(Self::Declined),
            other => Err(format!(
                "unknown state '{}' (expected all, open, merged or declined)",
                other
            )),
        }
    }
}

/// Activity actions that count as approval events.
///
/// Everything else in the activity log (comments, rescopes, merges, ...)
/// is discarded by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalAction {
    Approved,
    Unapproved,
    Reviewed,
}

impl ApprovalAction {
    /// Maps an activity `action` to an approval action, or `None` for
    /// non-approval events.
    pub fn classify(action: &str) -> Option<Self> {
        match action {
            "APPROVED" => Some(Self::Approved),
            "UNAPPROVED" => Some(Self::Unapproved),
            "REVIEWED" => Some(Self::Reviewed),
            _ => None,
        }
    }
}

/// A pull request belonging to one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub id: u64,
    pub project_key: String,
    pub repo_slug: String,
    pub title: String,
    pub source_branch: String,
    pub destination_branch: String,
    pub state: PrState,
    /// Login name of the author.
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Set only for merged pull requests.
    pub merged_at: Option<DateTime<Utc>>,
    /// Number of commits in the PR. `None` when it could not be determined.
    pub commit_count: Option<u32>,
}

impl PullRequestRecord {
    /// Builds a record from a listing entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the state is unknown or the creation
    /// timestamp is out of range.
    pub fn from_server(project: &str, repo: &str, pr: &PullRequest) -> Result<Self, ApiError> {
        let decode_error = |message: String| ApiError::Decode {
            path: format!("{}/{} pull request #{}", project, repo, pr.id),
            message,
        };

        let state: PrState = pr.state.parse().map_err(decode_error)?;
        let created_at = millis_to_datetime(pr.created_date)
            .ok_or_else(|| decode_error(format!("invalid createdDate {}", pr.created_date)))?;

        let merged_at = if state == PrState::Merged {
            pr.closed_date.and_then(millis_to_datetime)
        } else {
            None
        };

        Ok(Self {
            id: pr.id,
            project_key: project.to_string(),
            repo_slug: repo.to_string(),
            title: pr.title.clone(),
            source_branch: pr.from_ref.branch_name().to_string(),
            destination_branch: pr.to_ref.branch_name().to_string(),
            state,
            author: pr.author.user.name.clone(),
            created_at,
            updated_at: pr.updated_date.and_then(millis_to_datetime),
            merged_at,
            commit_count: None,
        })
    }
}

/// An approval-type event on a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub pr_id: u64,
    pub approver: String,
    pub approver_display_name: String,
    pub approved_at: DateTime<Utc>,
    pub action: ApprovalAction,
}

impl Approval {
    /// Converts an activity entry, returning `None` for non-approval actions
    /// and for entries with an unrepresentable timestamp.
    pub fn from_activity(pr_id: u64, activity: &Activity) -> Option<Self> {
        let action = ApprovalAction::classify(&activity.action)?;
        let approved_at = millis_to_datetime(activity.created_date)?;

        Some(Self {
            pr_id,
            approver: activity.user.name.clone(),
            approver_display_name: activity.user.display().to_string(),
            approved_at,
            action,
        })
    }
}

/// Which part of the extraction produced a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionStage {
    Listing,
    Activities,
    Commits,
    /// Cloning or walking the local git history.
    History,
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Listing => "listing",
            Self::Activities => "activities",
            Self::Commits => "commits",
            Self::History => "history",
        };
        f.write_str(name)
    }
}

/// A non-fatal failure recorded while extracting a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    /// The affected pull request, `None` for listing failures.
    pub pr_id: Option<u64>,
    pub stage: ExtractionStage,
    pub message: String,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pr_id {
            Some(id) => write!(f, "PR #{} {}: {}", id, self.stage, self.message),
            None => write!(f, "{}: {}", self.stage, self.message),
        }
    }
}

/// A pull request together with its approval events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPullRequest {
    #[serde(flatten)]
    pub pull_request: PullRequestRecord,
    pub approvals: Vec<Approval>,
}

/// Result of extracting one repository through the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryExtraction {
    pub project_key: String,
    pub repo_slug: String,
    pub pull_requests: Vec<ExtractedPullRequest>,
    pub warnings: Vec<ExtractionWarning>,
}

impl RepositoryExtraction {
    /// Total number of approval events across all pull requests.
    pub fn approval_count(&self) -> usize {
        self.pull_requests.iter().map(|pr| pr.approvals.len()).sum()
    }
}
