//
//  bitbucket-insights
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # HTTP Client Wrapper for Bitbucket Server
//!
//! This module provides the HTTP client used for every call to the Bitbucket
//! Server/Data Center REST API (v1.0).
//!
//! ## Features
//!
//! - HTTP Basic authentication with a fixed username and token
//! - Configurable TLS certificate validation
//! - Bounded retries: `Retry-After` honouring for 429, exponential backoff for
//!   connection failures, timeouts and 5xx responses
//! - Immediate failure for 401, 403 and 404
//! - Lazy pagination via [`Paginator`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_insights::api::{BitbucketClient, RetryPolicy};
//! use bitbucket_insights::config::BitbucketConfig;
//!
//! # async fn example() -> Result<(), bitbucket_insights::api::ApiError> {
//! let config = BitbucketConfig::new("https://bitbucket.example.com", "jdoe", "token");
//! let client = BitbucketClient::new(&config, RetryPolicy::default())?;
//!
//! let prs: Vec<serde_json::Value> = client
//!     .paginate(reqwest::Method::GET, "/projects/PROJ/repos/app/pull-requests", &[("state", "MERGED")])
//!     .collect_all()
//!     .await?;
//! println!("{} pull requests", prs.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use super::common::{ApiError, Paginator};
use super::throttle::{RetryPolicy, Sleeper, TokioSleeper};
use crate::auth::Credentials;
use crate::config::{BitbucketConfig, Config};

/// Path of the REST API relative to the server's base URL.
pub const API_PATH: &str = "/rest/api/1.0";

/// Extracts a user-friendly message from a Bitbucket error body.
///
/// Bitbucket Server returns errors in the format:
/// ```json
/// {"errors": [{"message": "Human readable message"}]}
/// ```
///
/// A plain `{"message": "..."}` body is accepted as well. Returns `None`
/// when the body carries neither.
pub fn extract_error_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;

    json.get("errors")
        .and_then(|e| e.as_array())
        .and_then(|arr| arr.first())
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .or_else(|| json.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
}

/// Maps a non-success, non-retryable status to an [`ApiError`].
fn classify_status(status: StatusCode, path: &str, body: &str) -> ApiError {
    let message = extract_error_message(body);

    match status {
        StatusCode::UNAUTHORIZED => ApiError::AuthenticationFailed(
            message.unwrap_or_else(|| "invalid username or token".to_string()),
        ),
        StatusCode::FORBIDDEN => {
            ApiError::Forbidden(message.unwrap_or_else(|| format!("access to {} denied", path)))
        }
        StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
        _ => ApiError::Http {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body.to_string()
                }
            }),
        },
    }
}

/// Parses a `Retry-After` header value.
///
/// Accepts both forms allowed by RFC 9110: a number of seconds, or an HTTP
/// date (a date in the past yields a zero wait). Returns `None` for anything
/// else.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let wait = date.with_timezone(&Utc) - now;
    Some(wait.to_std().unwrap_or(Duration::ZERO))
}

/// The HTTP client for a single Bitbucket Server/Data Center instance.
///
/// One client owns one connection pool and one credential; it is meant to be
/// used by a single logical thread of control, issuing one request at a time.
///
/// # Creating a Client
///
/// ```rust,no_run
/// use bitbucket_insights::api::BitbucketClient;
/// use bitbucket_insights::config::Config;
///
/// let config = Config::load(None)?;
/// let client = BitbucketClient::from_config(&config)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct BitbucketClient {
    /// The underlying HTTP client
    http: Client,
    /// Server base URL without trailing slash (e.g. "https://bitbucket.example.com")
    server_url: String,
    /// Basic authentication credentials
    credentials: Credentials,
    /// Retry and throttling settings
    policy: RetryPolicy,
    /// Where every wait is delegated
    sleeper: Arc<dyn Sleeper>,
}

impl BitbucketClient {
    /// Creates a client from connection settings and a retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when the URL, username or token is
    /// missing, and [`ApiError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &BitbucketConfig, policy: RetryPolicy) -> Result<Self, ApiError> {
        let url = config
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ApiError::Configuration("Bitbucket URL is not set".to_string()))?;

        let credentials = config.credentials().ok_or_else(|| {
            ApiError::Configuration("Bitbucket username and token are required".to_string())
        })?;

        let server_url = url.trim_end_matches('/');
        let server_url = server_url.strip_suffix(API_PATH).unwrap_or(server_url);

        if !config.verify_ssl {
            tracing::debug!("TLS certificate validation disabled for {}", server_url);
        }

        let http = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        Ok(Self {
            http,
            server_url: server_url.to_string(),
            credentials,
            policy,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Creates a client from the complete configuration.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let policy = RetryPolicy::from_config(&config.retry, config.bitbucket.page_limit);
        Self::new(&config.bitbucket, policy)
    }

    /// Replaces the [`Sleeper`] used for every wait.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Returns the base URL for API requests
    /// (`https://<host>/rest/api/1.0`).
    pub fn base_url(&self) -> String {
        format!("{}{}", self.server_url, API_PATH)
    }

    /// Returns the server URL without the API path.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Returns the retry and throttling policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sleeps through the configured [`Sleeper`].
    pub(crate) async fn pause(&self, duration: Duration) {
        self.sleeper.sleep(duration).await;
    }

    /// Waits for the next delay of `delays`, or reports that the attempt
    /// ceiling was reached.
    async fn backoff<I>(&self, delays: &mut I, path: &str, failures: u32, reason: &str) -> bool
    where
        I: Iterator<Item = Duration>,
    {
        let Some(delay) = delays.next() else {
            return false;
        };

        tracing::warn!(
            "Request to {} failed ({}), retrying in {:.1}s (attempt {}/{})",
            path,
            reason,
            delay.as_secs_f64(),
            failures + 1,
            self.policy.max_attempts
        );
        self.sleeper.sleep(delay).await;
        true
    }

    /// Issues an authenticated request and decodes the JSON body.
    ///
    /// # Parameters
    ///
    /// * `method` - HTTP method
    /// * `path` - API path relative to [`base_url`](Self::base_url), e.g.
    ///   `/projects/PROJ/repos/app/pull-requests`
    /// * `query` - Query parameters (state filter, page start, page limit)
    ///
    /// # Errors
    ///
    /// - [`ApiError::AuthenticationFailed`], [`ApiError::Forbidden`],
    ///   [`ApiError::NotFound`] immediately, without retry
    /// - [`ApiError::RateLimited`] after `max_rate_limit_retries` 429 responses
    /// - [`ApiError::Transport`] / [`ApiError::Server`] after `max_attempts`
    /// - [`ApiError::Decode`] if the body is not the expected JSON
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url(), path);
        let mut delays = self.policy.backoff();
        let mut failures = 0u32;
        let mut rate_limited = 0u32;

        loop {
            let request = self
                .credentials
                .apply_to_request(self.http.request(method.clone(), &url).query(query));

            tracing::debug!("{} {} {:?}", method, url, query);

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if e.is_builder() => return Err(ApiError::Client(e)),
                Err(e) => {
                    failures += 1;
                    if self.backoff(&mut delays, path, failures, &e.to_string()).await {
                        continue;
                    }
                    return Err(ApiError::Transport {
                        attempts: failures,
                        message: e.to_string(),
                    });
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| parse_retry_after(value, Utc::now()))
                    .unwrap_or(self.policy.default_retry_after);

                if rate_limited >= self.policy.max_rate_limit_retries {
                    return Err(ApiError::RateLimited {
                        attempts: rate_limited,
                        retry_after_secs: wait.as_secs(),
                    });
                }
                rate_limited += 1;

                tracing::warn!(
                    "Rate limited, waiting {}s before retrying {} ({}/{})",
                    wait.as_secs(),
                    path,
                    rate_limited,
                    self.policy.max_rate_limit_retries
                );
                self.sleeper.sleep(wait).await;
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                let message = extract_error_message(&body).unwrap_or_else(|| status.to_string());
                failures += 1;
                if self.backoff(&mut delays, path, failures, &message).await {
                    continue;
                }
                return Err(ApiError::Server {
                    status: status.as_u16(),
                    attempts: failures,
                    message,
                });
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(classify_status(status, path, &body));
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    failures += 1;
                    if self.backoff(&mut delays, path, failures, &e.to_string()).await {
                        continue;
                    }
                    return Err(ApiError::Transport {
                        attempts: failures,
                        message: e.to_string(),
                    });
                }
            };

            return serde_json::from_str(&body).map_err(|e| ApiError::Decode {
                path: path.to_string(),
                message: e.to_string(),
            });
        }
    }

    /// Convenience wrapper around [`request`](Self::request) for GET calls.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let query: Vec<(String, String)> = query
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.request(Method::GET, path, &query).await
    }

    /// Returns a lazy cursor over every entry of a paginated endpoint.
    ///
    /// Any `start` parameter in `query` is ignored; the cursor manages it.
    /// A `limit` parameter is added from the policy unless present.
    pub fn paginate<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Paginator<'_, T> {
        Paginator::new(self, method, path, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extract_server_error_message() {
        let body = r#"{"errors": [{"context": null, "message": "Project PROJ does not exist."}]}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Project PROJ does not exist.")
        );
        assert_eq!(
            extract_error_message(r#"{"message": "nope"}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(extract_error_message("<html>"), None);
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "/x", ""),
            ApiError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "/x", ""),
            ApiError::NotFound(path) if path == "/x"
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, "/x", r#"{"errors":[{"message":"bad state"}]}"#),
            ApiError::Http { status: 400, message } if message == "bad state"
        ));
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        let now = Utc::now();
        assert_eq!(parse_retry_after("5", now), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_after(" 120 ", now), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after("soon", now), None);
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 27, 30).unwrap();
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", now),
            Some(Duration::from_secs(30))
        );
        // Dates in the past mean "retry now"
        let later = Utc.with_ymd_and_hms(2015, 10, 21, 8, 0, 0).unwrap();
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", later),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_new_requires_url_and_credentials() {
        let mut config = BitbucketConfig::default();
        assert!(matches!(
            BitbucketClient::new(&config, RetryPolicy::default()),
            Err(ApiError::Configuration(_))
        ));

        config.url = Some("https://bb.example.com".to_string());
        assert!(matches!(
            BitbucketClient::new(&config, RetryPolicy::default()),
            Err(ApiError::Configuration(_))
        ));
    }

    #[test]
    fn test_base_url_strips_api_path() {
        let config = BitbucketConfig::new("https://bb.example.com/rest/api/1.0/", "u", "t");
        let client = BitbucketClient::new(&config, RetryPolicy::default()).unwrap();
        assert_eq!(client.base_url(), "https://bb.example.com/rest/api/1.0");
        assert_eq!(client.server_url(), "https://bb.example.com");
    }
}
