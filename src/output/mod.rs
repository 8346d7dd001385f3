//
//  bitbucket-insights
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Everything a run hands to the outside world:
//!
//! - **Export document**: the JSON file consumed by the persistence layer
//! - **Summary table**: a human-readable overview on stdout
//! - **Status lines**: progress, fallbacks and aborts on stderr
//!
//! ## Architecture
//!
//! - [`export`]: The [`ExportDocument`] and [`RepositoryExport`] types
//! - [`json`]: JSON serialization using `serde_json`
//! - [`table`]: Table formatting using `comfy_table`
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_insights::output::{OutputWriter, OutputFormat};
//!
//! let writer = OutputWriter::new(OutputFormat::Table);
//! writer.write_warning("PROJ/app: falling back to local history");
//! writer.write_success("Extracted 3 repositories");
//! ```

pub mod export;
pub mod json;
pub mod table;

pub use export::*;
pub use json::*;
pub use table::*;

use console::style;

/// How the run's result is presented on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum OutputFormat {
    /// Summary table.
    #[default]
    Table,
    /// The full export document.
    Json,
}

/// Writes results and status messages.
///
/// Status messages always go to stderr so that `--json` output on stdout
/// stays machine-readable.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled_stderr(),
        }
    }

    /// Writes the run's result in the configured format.
    pub fn write_document(&self, document: &ExportDocument) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(document),
            OutputFormat::Table => {
                print_summary(&document.repositories, console::colors_enabled());
                Ok(())
            }
        }
    }

    pub fn write_error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {}", style("error:").red().bold(), msg);
        } else {
            eprintln!("error: {}", msg);
        }
    }

    pub fn write_warning(&self, msg: &str) {
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    pub fn write_info(&self, msg: &str) {
        eprintln!("{}", msg);
    }

    pub fn write_success(&self, msg: &str) {
        if self.color {
            eprintln!("{} {}", style("✓").green().bold(), msg);
        } else {
            eprintln!("✓ {}", msg);
        }
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}
