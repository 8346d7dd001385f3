//
//  bitbucket-insights
//  context/git.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Local Clone Inspection
//!
//! Read-only access to an existing clone given on the command line, used to
//! find out which Bitbucket repository it was cloned from.
//!
//! ```rust,no_run
//! use bitbucket_insights::context::GitContext;
//! use std::path::Path;
//!
//! let git = GitContext::open_at(Path::new("repos/PROJ/app"))?;
//! if let Some(url) = git.origin_url()? {
//!     println!("cloned from {}", url);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use git2::Repository;

/// Wraps an opened local repository.
pub struct GitContext {
    repo: Repository,
}

impl GitContext {
    /// Opens the repository at `path` (working tree or bare).
    pub fn open_at(path: &Path) -> Result<Self> {
        let repo = Repository::open(path)
            .with_context(|| format!("{} is not a git repository", path.display()))?;
        Ok(Self { repo })
    }

    /// Returns the URL of the named remote, or `None` if it does not exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(|s| s.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the URL of the `origin` remote.
    pub fn origin_url(&self) -> Result<Option<String>> {
        self.remote_url("origin")
    }

    /// Returns the working directory, `None` for bare repositories.
    pub fn root_dir(&self) -> Option<&Path> {
        self.repo.workdir()
    }
}
