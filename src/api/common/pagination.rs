//
//  bitbucket-insights
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Pagination for Bitbucket Server/Data Center list endpoints
//!
//! Bitbucket Server uses offset-based pagination with `start` and `limit`:
//! - Request pages using the `start` parameter (0-indexed)
//! - Check `isLastPage` and `nextPageStart` to determine if more pages exist
//!
//! [`ServerPaginatedResponse`] is the wire shape of a single page and
//! [`Paginator`] walks every page lazily, one entry at a time.
//!
//! # Example
//!
//! ```rust,no_run
//! use bitbucket_insights::api::BitbucketClient;
//! use reqwest::Method;
//!
//! # async fn example(client: &BitbucketClient) -> Result<(), bitbucket_insights::api::ApiError> {
//! let mut pages = client.paginate::<serde_json::Value>(
//!     Method::GET,
//!     "/projects/PROJ/repos/app/pull-requests",
//!     &[("state", "MERGED")],
//! );
//!
//! while let Some(entry) = pages.try_next().await? {
//!     println!("{}", entry["id"]);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::api::BitbucketClient;

/// Paginated response from Bitbucket Server/Data Center API.
///
/// # Fields
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `values` | `Vec<T>` | Array of items in the current page |
/// | `size` | `u32` | Number of items in the current page |
/// | `limit` | `u32` | Maximum items per page (requested) |
/// | `is_last_page` | `bool` | Whether this is the final page |
/// | `next_page_start` | `Option<u32>` | Start index for the next page |
/// | `start` | `u32` | Start index of the current page |
///
/// # Example
///
/// ```rust
/// use bitbucket_insights::api::common::ServerPaginatedResponse;
///
/// let json = r#"{
///     "values": [{"id": 1}],
///     "size": 1,
///     "limit": 25,
///     "isLastPage": false,
///     "nextPageStart": 25,
///     "start": 0
/// }"#;
///
/// let page: ServerPaginatedResponse<serde_json::Value> = serde_json::from_str(json).unwrap();
/// assert_eq!(page.next_start(), Some(25));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerPaginatedResponse<T> {
    /// Array of items in the current page.
    pub values: Vec<T>,

    /// Number of items in the current page.
    #[serde(default)]
    pub size: u32,

    /// Maximum items per page (as requested).
    #[serde(default)]
    pub limit: u32,

    /// Indicates whether this is the last page of results.
    ///
    /// A page without this field is treated as the last one so that a
    /// malformed response can never cause an endless walk.
    #[serde(default = "default_is_last_page", rename = "isLastPage")]
    pub is_last_page: bool,

    /// Start index for the next page of results.
    #[serde(default, rename = "nextPageStart")]
    pub next_page_start: Option<u32>,

    /// Start index of the current page (0-indexed).
    #[serde(default)]
    pub start: u32,
}

fn default_is_last_page() -> bool {
    true
}

impl<T> ServerPaginatedResponse<T> {
    /// Returns the start index for the next page of results, or `None` on the
    /// last page.
    pub fn next_start(&self) -> Option<u32> {
        if self.is_last_page {
            None
        } else {
            self.next_page_start
        }
    }
}

/// Lazy, finite cursor over every entry of a paginated endpoint.
///
/// Pages are requested on demand: a new request is only issued when the
/// entries of the previous page have all been consumed. A fixed delay
/// (`page_delay` of the client's [`RetryPolicy`](crate::api::RetryPolicy)) is
/// inserted before every page after the first.
///
/// The cursor cannot be restarted. Once it returns `Ok(None)` or an error,
/// every further call returns `Ok(None)` without touching the network.
/// Dropping it early stops all further requests.
pub struct Paginator<'a, T> {
    client: &'a BitbucketClient,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    buffer: VecDeque<T>,
    next_start: Option<u32>,
    pages_fetched: u32,
}

impl<'a, T: DeserializeOwned> Paginator<'a, T> {
    pub(crate) fn new(
        client: &'a BitbucketClient,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Self {
        let mut query: Vec<(String, String)> = query
            .iter()
            .filter(|(name, _)| *name != "start")
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        if !query.iter().any(|(name, _)| name == "limit") {
            query.push(("limit".to_string(), client.policy().page_limit.to_string()));
        }

        Self {
            client,
            method,
            path: path.to_string(),
            query,
            buffer: VecDeque::new(),
            next_start: Some(0),
            pages_fetched: 0,
        }
    }

    /// Returns the next entry, fetching the next page when needed.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))` - The next entry in API order
    /// - `Ok(None)` - All pages have been consumed
    /// - `Err(ApiError)` - The page request failed after the client's retries
    pub async fn try_next(&mut self) -> Result<Option<T>, ApiError> {
        loop {
            if let Some(entry) = self.buffer.pop_front() {
                return Ok(Some(entry));
            }

            let Some(start) = self.next_start.take() else {
                return Ok(None);
            };

            if self.pages_fetched > 0 {
                self.client.pause(self.client.policy().page_delay).await;
            }

            let mut query = self.query.clone();
            query.push(("start".to_string(), start.to_string()));

            let page: ServerPaginatedResponse<T> =
                self.client.request(self.method.clone(), &self.path, &query).await?;
            self.pages_fetched += 1;

            tracing::debug!(
                "Fetched page {} of {} (start={}, entries={})",
                self.pages_fetched,
                self.path,
                start,
                page.values.len()
            );

            self.next_start = match page.next_start() {
                Some(next) if next > start => Some(next),
                Some(next) => {
                    tracing::warn!(
                        "Server reported nextPageStart={} at start={} for {}; stopping",
                        next,
                        start,
                        self.path
                    );
                    None
                }
                None => None,
            };
            self.buffer.extend(page.values);
        }
    }

    /// Drains the cursor into a vector.
    pub async fn collect_all(mut self) -> Result<Vec<T>, ApiError> {
        let mut entries = Vec::new();
        while let Some(entry) = self.try_next().await? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Counts the remaining entries without keeping them.
    pub async fn count(mut self) -> Result<u32, ApiError> {
        let mut count = 0;
        while self.try_next().await?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_has_no_next_start() {
        let json = r#"{"values": [1, 2], "isLastPage": true, "nextPageStart": 2}"#;
        let page: ServerPaginatedResponse<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_start(), None);
    }

    #[test]
    fn test_missing_last_page_flag_ends_walk() {
        let json = r#"{"values": []}"#;
        let page: ServerPaginatedResponse<u32> = serde_json::from_str(json).unwrap();
        assert!(page.is_last_page);
        assert_eq!(page.next_start(), None);
    }

    #[test]
    fn test_next_start() {
        let json = r#"{"values": [1], "size": 1, "limit": 1, "isLastPage": false, "nextPageStart": 1, "start": 0}"#;
        let page: ServerPaginatedResponse<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_start(), Some(1));
    }
}
