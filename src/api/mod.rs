//
//  bitbucket-insights
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! HTTP client for the Bitbucket Server/Data Center REST API v1.0.
//!
//! ## Architecture
//!
//! - [`client`]: Authenticated request wrapper with retry and rate-limit handling
//! - [`throttle`]: Retry policy and the [`Sleeper`] seam used for every wait
//! - [`server`]: Wire types of the pull-request, activity and commit endpoints
//! - [`common`]: Error taxonomy and pagination
//!
//! ## Error Handling
//!
//! API errors are returned as [`ApiError`] variants:
//!
//! - `AuthenticationFailed`: 401 Unauthorized (fatal)
//! - `Forbidden`: 403 Forbidden (fatal)
//! - `NotFound`: 404 Not Found (fatal)
//! - `RateLimited`: 429 Too Many Requests, retries exhausted
//! - `Server` / `Transport`: 5xx or network failures, retries exhausted

/// Core HTTP client wrapper for Bitbucket Server.
pub mod client;

/// Retry policy and sleep abstraction.
pub mod throttle;

/// Bitbucket Server/Data Center API v1.0 wire types.
pub mod server;

/// Error types and pagination shared by all endpoints.
pub mod common;

pub use client::{extract_error_message, parse_retry_after, BitbucketClient, API_PATH};
pub use common::{ApiError, Paginator, ServerPaginatedResponse};
pub use throttle::{RetryPolicy, Sleeper, TokioSleeper};
