//
//  bitbucket-insights
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Common API Types for the Bitbucket Server client
//!
//! This module provides the error taxonomy shared by the HTTP client wrapper
//! and the pull-request extractor, plus the offset-based pagination types.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all API operations
//! - [`ServerPaginatedResponse`] - One page of a Server/DC list endpoint
//! - [`Paginator`] - Lazy cursor over every entry of a list endpoint
//!
//! # Example
//!
//! ```rust
//! use bitbucket_insights::api::common::ApiError;
//!
//! fn describe<T>(result: Result<T, ApiError>) -> &'static str {
//!     match result {
//!         Ok(_) => "ok",
//!         Err(e) if e.is_fatal() => "aborting repository",
//!         Err(_) => "skipping",
//!     }
//! }
//! ```

use thiserror::Error;

mod pagination;

pub use pagination::*;

/// Unified error type for all Bitbucket API operations.
///
/// # Variants
///
/// | Variant | Description | HTTP Status | Retried |
/// |---------|-------------|-------------|---------|
/// | `AuthenticationFailed` | Invalid or expired credentials | 401 | No |
/// | `Forbidden` | Insufficient permissions | 403 | No |
/// | `NotFound` | Project, repository or PR does not exist | 404 | No |
/// | `RateLimited` | Too many requests, retries exhausted | 429 | Yes |
/// | `Server` | Internal server error, retries exhausted | 5xx | Yes |
/// | `Transport` | Timeout or connection failure, retries exhausted | N/A | Yes |
/// | `Http` | Any other non-success status | 4xx | No |
/// | `Decode` | Response body did not match the expected shape | 2xx | No |
/// | `Client` | The HTTP client could not be built | N/A | No |
/// | `Configuration` | URL or credentials missing | N/A | No |
///
/// # Notes
///
/// - Retried variants only surface once the retry ceiling has been hit
/// - Use [`is_fatal`](Self::is_fatal) to decide whether a repository extraction
///   should be aborted or the failing item skipped
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server rejected the configured credentials (HTTP 401).
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The credentials are valid but lack permission (HTTP 403).
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// The requested resource was not found (HTTP 404).
    ///
    /// # Parameters
    ///
    /// - `0` - The API path that was requested
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limiting persisted past the configured number of retries.
    #[error("Rate limit exceeded after {attempts} retries (last Retry-After: {retry_after_secs}s)")]
    RateLimited {
        /// Number of 429 responses absorbed before giving up.
        attempts: u32,
        /// The last wait the server asked for, in seconds.
        retry_after_secs: u64,
    },

    /// The server kept answering with a 5xx status.
    #[error("Server error ({status}) after {attempts} attempts: {message}")]
    Server {
        /// HTTP status code of the last response.
        status: u16,
        /// Number of attempts made.
        attempts: u32,
        /// Error message extracted from the last response body.
        message: String,
    },

    /// Connection or timeout failures persisted past the retry ceiling.
    #[error("Network error after {attempts} attempts: {message}")]
    Transport {
        /// Number of attempts made.
        attempts: u32,
        /// Description of the last transport failure.
        message: String,
    },

    /// A non-success status that is neither fatal nor transient.
    #[error("API error ({status}): {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to parse response from {path}: {message}")]
    Decode {
        /// The API path that was requested.
        path: String,
        /// Decoder error message.
        message: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The connection settings are incomplete or invalid.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Returns `true` for errors that must abort the whole repository
    /// extraction (authentication, permission and not-found failures).
    ///
    /// # Example
    ///
    /// ```rust
    /// use bitbucket_insights::api::common::ApiError;
    ///
    /// assert!(ApiError::NotFound("/projects/X".into()).is_fatal());
    /// assert!(!ApiError::Transport { attempts: 3, message: "timeout".into() }.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_) | Self::Forbidden(_) | Self::NotFound(_)
        )
    }

    /// Returns `true` if this is an authentication failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ApiError::AuthenticationFailed("bad token".into()).is_fatal());
        assert!(ApiError::Forbidden("no access".into()).is_fatal());
        assert!(ApiError::NotFound("/x".into()).is_fatal());

        assert!(!ApiError::RateLimited {
            attempts: 5,
            retry_after_secs: 60
        }
        .is_fatal());
        assert!(!ApiError::Server {
            status: 503,
            attempts: 3,
            message: "down".into()
        }
        .is_fatal());
        assert!(!ApiError::Http {
            status: 400,
            message: "bad".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = ApiError::Transport {
            attempts: 3,
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "Network error after 3 attempts: connection refused"
        );
    }
}
