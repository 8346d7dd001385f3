//
//  bitbucket-insights
//  api/throttle.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Retry and Throttling Policy
//!
//! The client never sleeps directly. Every wait (rate-limit backoff,
//! exponential backoff after a transport failure, the fixed pause between
//! pages and between pull requests) goes through a [`Sleeper`], so tests can
//! record the requested durations instead of waiting on the wall clock.

use std::iter::Take;
use std::time::Duration;

use async_trait::async_trait;
use tokio_retry::strategy::ExponentialBackoff;

use crate::config::RetryConfig;

/// Suspends the calling task for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Waits for `duration` before returning.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Retry, backoff and throttling settings for a [`BitbucketClient`](super::BitbucketClient).
///
/// # Default Values
///
/// | Field | Default |
/// |-------|---------|
/// | `max_attempts` | 3 |
/// | `base_delay` | 1s |
/// | `max_delay` | 30s |
/// | `max_rate_limit_retries` | 5 |
/// | `default_retry_after` | 60s |
/// | `page_delay` | 100ms |
/// | `pr_delay` | 50ms |
/// | `page_limit` | 100 |
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts allowed for a request failing with a transport error or 5xx.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for every further attempt.
    pub base_delay: Duration,
    /// Upper bound for a single backoff delay.
    pub max_delay: Duration,
    /// Number of 429 responses absorbed per request before giving up.
    pub max_rate_limit_retries: u32,
    /// Wait used when a 429 response carries no usable `Retry-After`.
    pub default_retry_after: Duration,
    /// Pause inserted before every page after the first.
    pub page_delay: Duration,
    /// Pause inserted between pull requests by the extractor.
    pub pr_delay: Duration,
    /// Value sent as the `limit` query parameter on paginated calls.
    pub page_limit: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_rate_limit_retries: 5,
            default_retry_after: Duration::from_secs(60),
            page_delay: Duration::from_millis(100),
            pr_delay: Duration::from_millis(50),
            page_limit: 100,
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from the `[retry]` configuration section.
    pub fn from_config(config: &RetryConfig, page_limit: u32) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_rate_limit_retries: config.max_rate_limit_retries,
            default_retry_after: Duration::from_secs(config.default_retry_after_secs),
            page_delay: Duration::from_millis(config.page_delay_ms),
            pr_delay: Duration::from_millis(config.pr_delay_ms),
            page_limit: page_limit.max(1),
        }
    }

    /// Delays between the attempts of one request: `base_delay` doubled
    /// after every failure, capped at `max_delay`, one fewer than
    /// `max_attempts`.
    pub fn backoff(&self) -> Take<ExponentialBackoff> {
        let half_base = (self.base_delay.as_millis() / 2).max(1) as u64;
        ExponentialBackoff::from_millis(2)
            .factor(half_base)
            .max_delay(self.max_delay)
            .take(self.max_attempts.saturating_sub(1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            ..RetryPolicy::default()
        };
        let delays: Vec<Duration> = policy.backoff().collect();
        assert_eq!(
            delays,
            vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 40,
            max_delay: Duration::from_secs(5),
            ..RetryPolicy::default()
        };
        let delays: Vec<Duration> = policy.backoff().collect();
        assert_eq!(delays.len(), 39);
        assert_eq!(delays.last(), Some(&Duration::from_secs(5)));
        assert!(delays.iter().all(|delay| *delay <= Duration::from_secs(5)));
    }

    #[test]
    fn test_single_attempt_has_no_backoff() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff().count(), 0);
    }

    #[test]
    fn test_from_config_clamps_zero_attempts() {
        let config = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        let policy = RetryPolicy::from_config(&config, 0);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.page_limit, 1);
    }
}
