//
//  bitbucket-insights
//  output/export.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Export Document
//!
//! The JSON document written at the end of a run and consumed by the
//! persistence layer. One [`RepositoryExport`] per repository input, in input
//! order, including repositories that were aborted.
//!
//! ## Shape
//!
//! ```text
//! {
//!   "generated_at": "2026-10-19T08:00:00Z",
//!   "tool_version": "0.1.0",
//!   "repositories": [
//!     {
//!       "project_key": "PROJ", "repo_slug": "app",
//!       "source": "API",
//!       "pull_requests": [{ "id": 1, ..., "approvals": [...] }],
//!       "commits": [...],
//!       "warnings": [...]
//!     }
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::{ExtractedPullRequest, ExtractionWarning, RepositoryExtraction};
use crate::history::CommitRecord;

/// Where a repository's pull-request history was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Api,
    LocalHistory,
}

/// Everything extracted for one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryExport {
    pub project_key: String,
    pub repo_slug: String,
    pub clone_url: String,
    pub source: SourceKind,
    /// Why local history was used instead of the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(default)]
    pub pull_requests: Vec<ExtractedPullRequest>,
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
    #[serde(default)]
    pub warnings: Vec<ExtractionWarning>,
    /// Set when the repository was aborted; the other fields then hold
    /// whatever was gathered before the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepositoryExport {
    /// Creates an empty export for a repository.
    pub fn new(project_key: &str, repo_slug: &str, clone_url: &str, source: SourceKind) -> Self {
        Self {
            project_key: project_key.to_string(),
            repo_slug: repo_slug.to_string(),
            clone_url: clone_url.to_string(),
            source,
            fallback_reason: None,
            pull_requests: Vec::new(),
            commits: Vec::new(),
            warnings: Vec::new(),
            error: None,
        }
    }

    /// Moves the result of an API extraction into this export.
    pub fn with_extraction(mut self, extraction: RepositoryExtraction) -> Self {
        self.pull_requests = extraction.pull_requests;
        self.warnings.extend(extraction.warnings);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.project_key, self.repo_slug)
    }

    pub fn is_aborted(&self) -> bool {
        self.error.is_some()
    }

    pub fn approval_count(&self) -> usize {
        self.pull_requests.iter().map(|pr| pr.approvals.len()).sum()
    }
}

/// The complete output of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub repositories: Vec<RepositoryExport>,
}

impl ExportDocument {
    pub fn new(repositories: Vec<RepositoryExport>) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: crate::VERSION.to_string(),
            repositories,
        }
    }

    /// Number of repositories that were aborted.
    pub fn aborted_count(&self) -> usize {
        self.repositories.iter().filter(|r| r.is_aborted()).count()
    }
}
