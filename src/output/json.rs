//
//  bitbucket-insights
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # JSON Output
//!
//! Serializes the [`ExportDocument`] to a file or to stdout, and reads it
//! back.
//!
//! | Function | Destination |
//! |----------|-------------|
//! | [`write_json`] | stdout, pretty-printed |
//! | [`write_json_to`] | any `Write` |
//! | [`write_export`] | file, created along with its parent directories |
//! | [`read_export`] | reads a previously written file |

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::ExportDocument;

/// Prints a value as pretty JSON on stdout.
pub fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Writes a value as pretty JSON, followed by a newline.
pub fn write_json_to<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Writes the export document to `path`.
pub fn write_export(path: &Path, document: &ExportDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_json_to(&mut writer, document)?;
    writer.flush()?;

    tracing::debug!("Wrote export to {}", path.display());
    Ok(())
}

/// Reads an export document from `path`.
pub fn read_export(path: &Path) -> Result<ExportDocument> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse export file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{
        Approval, ApprovalAction, ExtractedPullRequest, ExtractionStage, ExtractionWarning, PrState,
        PullRequestRecord,
    };
    use crate::output::{RepositoryExport, SourceKind};
    use chrono::TimeZone;

    fn pull_request(id: u64, state: PrState, commit_count: Option<u32>) -> ExtractedPullRequest {
        let created = chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        ExtractedPullRequest {
            pull_request: PullRequestRecord {
                id,
                project_key: "PROJ".to_string(),
                repo_slug: "app".to_string(),
                title: format!("PR {}", id),
                source_branch: "feature".to_string(),
                destination_branch: "main".to_string(),
                state,
                author: "jdoe".to_string(),
                created_at: created,
                updated_at: None,
                merged_at: None,
                commit_count,
            },
            approvals: vec![Approval {
                pr_id: id,
                approver: "rev".to_string(),
                approver_display_name: "Reviewer".to_string(),
                approved_at: created,
                action: ApprovalAction::Approved,
            }],
        }
    }

    #[test]
    fn test_export_round_trip_keeps_pull_request_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("export.json");

        let mut repository = RepositoryExport::new("PROJ", "app", "https://bb/scm/PROJ/app.git", SourceKind::Api);
        repository.pull_requests = vec![
            pull_request(1, PrState::Merged, Some(4)),
            pull_request(2, PrState::Open, None),
        ];
        repository.warnings.push(ExtractionWarning {
            pr_id: Some(2),
            stage: ExtractionStage::Commits,
            message: "timeout".to_string(),
        });
        let document = ExportDocument::new(vec![repository]);

        write_export(&path, &document).unwrap();
        let loaded = read_export(&path).unwrap();

        let prs = &loaded.repositories[0].pull_requests;
        assert_eq!(prs[0].pull_request.id, 1);
        assert_eq!(prs[0].pull_request.state, PrState::Merged);
        assert_eq!(prs[0].pull_request.commit_count, Some(4));
        assert_eq!(prs[1].pull_request.commit_count, None);
        assert_eq!(loaded, document);
    }

    #[test]
    fn test_pull_request_fields_are_flattened() {
        let value = serde_json::to_value(pull_request(3, PrState::Declined, Some(1))).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["state"], "DECLINED");
        assert_eq!(value["approvals"][0]["action"], "APPROVED");
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_export(&dir.path().join("missing.json")).is_err());
    }
}
