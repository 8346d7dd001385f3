//
//  bitbucket-insights
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Bitbucket Server/Data Center accepts HTTP Basic authentication with a
//! username and either a password, an app password or a personal access
//! token. The extractor uses one fixed credential for the lifetime of a
//! client, both for REST calls and for cloning over HTTPS.
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_insights::auth::Credentials;
//!
//! let credentials = Credentials::new("jdoe", "NjM0NTY3ODkw");
//! assert_eq!(credentials.username(), "jdoe");
//! // The secret never shows up in debug output
//! assert!(!format!("{:?}", credentials).contains("NjM0NTY3ODkw"));
//! ```

use std::fmt;

use reqwest::RequestBuilder;

/// Username and secret token used for HTTP Basic authentication.
///
/// # Notes
///
/// - The `Debug` implementation redacts the token
/// - Credentials are immutable once constructed
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    token: String,
}

impl Credentials {
    /// Creates a new credential pair.
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the secret token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Applies Basic authentication to an HTTP request.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use bitbucket_insights::auth::Credentials;
    /// use reqwest::Client;
    ///
    /// let credentials = Credentials::new("jdoe", "secret");
    /// let request = credentials.apply_to_request(Client::new().get("https://bitbucket.example.com"));
    /// ```
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.token))
    }

    /// Returns a git2 credential for cloning over HTTPS.
    pub fn to_git_cred(&self) -> Result<git2::Cred, git2::Error> {
        git2::Cred::userpass_plaintext(&self.username, &self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"********")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let credentials = Credentials::new("jdoe", "super-secret");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("jdoe"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_accessors() {
        let credentials = Credentials::new("jdoe", "tok");
        assert_eq!(credentials.username(), "jdoe");
        assert_eq!(credentials.token(), "tok");
    }
}
