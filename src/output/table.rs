//
//  bitbucket-insights
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Table Output Formatting
//!
//! Terminal tables rendered with `comfy_table`, used for the end-of-run
//! summary.
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_insights::output::{summary_table, RepositoryExport, SourceKind};
//!
//! let repo = RepositoryExport::new("PROJ", "app", "", SourceKind::Api);
//! let rendered = summary_table(&[repo], false).to_string();
//! assert!(rendered.contains("PROJ/app"));
//! ```

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use super::{RepositoryExport, SourceKind};
use crate::util::{format_date, truncate};

/// Creates a table with the standard preset and dynamic width.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Builder for terminal tables.
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    /// Enables or disables colored headers.
    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(|s| s.into()).collect();
        if self.color {
            let cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
            self.table.set_header(cells);
        } else {
            self.table.set_header(headers);
        }
        self
    }

    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            let row: Vec<String> = row.into_iter().map(|s| s.into()).collect();
            self.table.add_row(row);
        }
        self
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Colors a repository status word.
pub fn format_status(status: &str, color: bool) -> String {
    if !color {
        return status.to_string();
    }

    use console::style;
    match status {
        "ok" => style(status).green().to_string(),
        "partial" => style(status).yellow().to_string(),
        "aborted" => style(status).red().to_string(),
        _ => status.to_string(),
    }
}

fn status_of(repository: &RepositoryExport) -> &'static str {
    if repository.is_aborted() {
        "aborted"
    } else if repository.warnings.is_empty() {
        "ok"
    } else {
        "partial"
    }
}

/// Builds the per-repository summary table.
pub fn summary_table(repositories: &[RepositoryExport], color: bool) -> Table {
    let rows = repositories.iter().map(|repo| {
        let source = match repo.source {
            SourceKind::Api => "API",
            SourceKind::LocalHistory => "local",
        };
        let newest = repo
            .pull_requests
            .iter()
            .map(|pr| pr.pull_request.created_at)
            .max()
            .map(|created| format_date(&created))
            .unwrap_or_else(|| "-".to_string());
        vec![
            truncate(&repo.full_name(), 40),
            source.to_string(),
            repo.pull_requests.len().to_string(),
            newest,
            repo.approval_count().to_string(),
            repo.commits.len().to_string(),
            repo.warnings.len().to_string(),
            format_status(status_of(repo), color),
        ]
    });

    TableBuilder::new()
        .color(color)
        .headers(["Repository", "Source", "PRs", "Newest PR", "Approvals", "Commits", "Warnings", "Status"])
        .rows(rows)
        .build()
}

/// Prints the per-repository summary table.
pub fn print_summary(repositories: &[RepositoryExport], color: bool) {
    println!("{}", summary_table(repositories, color));
}
