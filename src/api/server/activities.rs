//
//  bitbucket-insights
//  api/server/activities.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Pull Request Activity Types
//!
//! The activity log is a server-maintained, newest-first list of events
//! attached to a pull request: approvals, comments, rescopes, merges. Only
//! the fields the extractor needs are decoded; comment bodies and rescope
//! details are ignored.

use serde::{Deserialize, Serialize};

use super::User;

/// One entry of a pull request's activity log.
///
/// # Example
///
/// ```rust
/// use bitbucket_insights::api::server::Activity;
///
/// let json = r#"{
///     "id": 101,
///     "createdDate": 1700000000000,
///     "user": {"name": "rev", "displayName": "Reviewer"},
///     "action": "APPROVED"
/// }"#;
///
/// let activity: Activity = serde_json::from_str(json).unwrap();
/// assert_eq!(activity.action, "APPROVED");
/// ```
///
/// # Notes
///
/// Known `action` values include "OPENED", "APPROVED", "UNAPPROVED",
/// "REVIEWED", "COMMENTED", "RESCOPED", "UPDATED", "MERGED", "DECLINED" and
/// "REOPENED".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Identifier of the activity entry.
    pub id: u64,

    /// Unix timestamp in milliseconds of the event.
    #[serde(rename = "createdDate")]
    pub created_date: i64,

    /// The user who triggered the event.
    pub user: User,

    /// Free-text action name.
    pub action: String,
}
