//
//  bitbucket-insights
//  config/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Host Utilities
//!
//! Helpers for comparing hosts across configuration values and clone URLs.
//! The extractor only talks to Bitbucket Server/Data Center, so Bitbucket
//! Cloud hosts are recognised only to route them to local history.
//!
//! ## Usage
//!
//! ```rust
//! use bitbucket_insights::config::{host_of_url, is_cloud_host, normalize_host};
//!
//! assert!(is_cloud_host("bitbucket.org"));
//! assert_eq!(normalize_host("https://BITBUCKET.example.com/"), "bitbucket.example.com");
//! assert_eq!(host_of_url("https://bb.example.com:8443/context").as_deref(), Some("bb.example.com"));
//! ```

use url::Url;

/// Hostname of Bitbucket Cloud.
pub const BITBUCKET_CLOUD: &str = "bitbucket.org";

/// API hostname of Bitbucket Cloud.
pub const BITBUCKET_API: &str = "api.bitbucket.org";

/// Returns `true` for Bitbucket Cloud hostnames.
pub fn is_cloud_host(host: &str) -> bool {
    let host = normalize_host(host);
    host == BITBUCKET_CLOUD || host == BITBUCKET_API
}

/// Strips scheme and trailing slash and lowercases a host string.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host.strip_prefix("https://").unwrap_or(host);
    let host = host.strip_prefix("http://").unwrap_or(host);
    let host = host.strip_suffix('/').unwrap_or(host);
    host.to_lowercase()
}

/// Extracts the lowercase host name (without port) from a URL.
///
/// Returns `None` when the value is not an absolute URL with a host.
pub fn host_of_url(value: &str) -> Option<String> {
    Url::parse(value.trim())
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("https://Bitbucket.Example.com/"), "bitbucket.example.com");
        assert_eq!(normalize_host("bitbucket.org"), "bitbucket.org");
    }

    #[test]
    fn test_host_of_url() {
        assert_eq!(host_of_url("https://bb.example.com/rest").as_deref(), Some("bb.example.com"));
        assert_eq!(host_of_url("http://127.0.0.1:1234").as_deref(), Some("127.0.0.1"));
        assert_eq!(host_of_url("not a url"), None);
    }

    #[test]
    fn test_is_cloud_host() {
        assert!(is_cloud_host("bitbucket.org"));
        assert!(is_cloud_host("https://api.bitbucket.org/"));
        assert!(!is_cloud_host("bitbucket.example.com"));
    }
}
