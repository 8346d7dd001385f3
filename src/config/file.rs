//
//  bitbucket-insights
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O Module
//!
//! Low-level file operations used by [`Config`](super::Config).
//!
//! ## Notes
//!
//! - All functions accept `&Path` to support both `Path` and `PathBuf`
//! - Write operations automatically create parent directories

use std::path::Path;

use anyhow::Result;

/// Reads a configuration file into a string.
pub fn read_config_file(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// Writes a configuration file, creating parent directories as needed.
pub fn write_config_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Checks whether a configuration file exists.
pub fn config_exists(path: &Path) -> bool {
    path.is_file()
}
