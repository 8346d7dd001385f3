//
//  bitbucket-insights
//  cli/extract.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Batch extraction command
//!
//! Processes every repository input in order. For each one the history
//! source is chosen once, the repository is cloned (or an existing clone is
//! opened), its pull requests are read and the result is appended to the
//! export document. A repository that fails fatally is recorded as aborted
//! and the run moves on to the next one.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use crate::api::BitbucketClient;
use crate::auth::Credentials;
use crate::config::Config;
use crate::context::{select_history_source, ContextResolver, HistorySource, RepoContext, SourceMode};
use crate::exit_codes;
use crate::extract::{
    ExtractedPullRequest, ExtractionStage, ExtractionWarning, PullRequestExtractor,
    PullRequestRecord, StateFilter,
};
use crate::history::{clone_or_open, CommitRecord, HistoryWalker};
use crate::output::{
    write_export, ExportDocument, OutputFormat, OutputWriter, RepositoryExport, SourceKind,
};
use crate::util::format_duration;

use super::{GlobalOptions, UsageError};

#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// Clone URLs, PROJECT/REPO pairs or paths to existing clones
    #[arg(value_name = "REPOSITORY")]
    pub repositories: Vec<String>,

    /// Repository on the configured server (repeatable)
    #[arg(long = "repo", short = 'r', value_name = "PROJECT/REPO")]
    pub repos: Vec<String>,

    /// File with one repository per line ('#' starts a comment)
    #[arg(long, value_name = "FILE")]
    pub repos_file: Option<PathBuf>,

    /// Pull request state to extract: all, open, merged or declined
    #[arg(long, short = 's')]
    pub state: Option<StateFilter>,

    /// Where pull request history comes from: auto, api or local
    #[arg(long, default_value = "auto")]
    pub source: SourceMode,

    /// Directory clones are placed in
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Export file to write
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Do not clone or walk commit history for API repositories
    #[arg(long)]
    pub no_history: bool,
}

/// One resolved repository input.
struct Target {
    context: RepoContext,
    /// Set when the input was an existing clone.
    local_path: Option<PathBuf>,
}

/// What the local history walk produced.
struct WalkedHistory {
    commits: Vec<CommitRecord>,
    merged: Vec<PullRequestRecord>,
}

impl ExtractCommand {
    /// Runs the extraction and returns the process exit code.
    pub async fn run(&self, global: &GlobalOptions) -> Result<i32> {
        let started = Instant::now();
        let config = Config::load(global.config.as_deref())?;
        let writer = OutputWriter::new(if global.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        });

        let targets = self.resolve_targets(&config)?;
        let state = self.state.unwrap_or(config.extract.state);
        let workdir = self.workdir.clone().unwrap_or_else(|| config.extract.workdir.clone());
        let output = self.output.clone().unwrap_or_else(|| config.extract.output.clone());

        let client = match BitbucketClient::from_config(&config) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::debug!("REST API unavailable: {}", e);
                None
            }
        };

        let mut repositories = Vec::with_capacity(targets.len());
        let mut auth_failed = false;

        for target in &targets {
            let name = target.context.full_name();
            let source = select_history_source(&target.context, &config, self.source);
            let (export, auth) = self
                .process(target, source, client.as_ref(), state, &workdir, &config, &writer)
                .await;

            if export.is_aborted() {
                writer.write_error(&format!(
                    "{}: aborting repository: {}",
                    name,
                    export.error.as_deref().unwrap_or_default()
                ));
            }
            auth_failed |= auth;
            repositories.push(export);
        }

        let document = ExportDocument::new(repositories);
        write_export(&output, &document)?;
        writer.write_document(&document)?;

        let aborted = document.aborted_count();
        writer.write_success(&format!(
            "Extracted {} of {} repositories in {}, export written to {}",
            document.repositories.len() - aborted,
            document.repositories.len(),
            format_duration(started.elapsed()),
            output.display()
        ));

        Ok(if auth_failed {
            exit_codes::AUTH_ERROR
        } else if aborted > 0 {
            exit_codes::PARTIAL
        } else {
            exit_codes::SUCCESS
        })
    }

    /// Gathers inputs from arguments, `--repo` and `--repos-file`, and
    /// resolves all of them before any work starts.
    fn resolve_targets(&self, config: &Config) -> Result<Vec<Target>> {
        let mut inputs: Vec<String> = self.repositories.clone();
        inputs.extend(self.repos.iter().cloned());

        if let Some(file) = &self.repos_file {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            inputs.extend(parse_repos_file(&content));
        }

        if inputs.is_empty() {
            return Err(UsageError(
                "No repositories given. Pass clone URLs, --repo PROJECT/REPO or --repos-file."
                    .to_string(),
            )
            .into());
        }

        let resolver = ContextResolver::new(config);
        inputs
            .iter()
            .map(|input| {
                let context = resolver
                    .resolve(input)
                    .map_err(|e| UsageError(format!("{}: {:#}", input, e)))?;
                let path = Path::new(input.trim());
                Ok(Target {
                    context,
                    local_path: path.is_dir().then(|| path.to_path_buf()),
                })
            })
            .collect()
    }

    /// Extracts one repository. Returns its export and whether it was
    /// aborted by an authentication failure.
    #[allow(clippy::too_many_arguments)]
    async fn process(
        &self,
        target: &Target,
        source: HistorySource,
        client: Option<&BitbucketClient>,
        state: StateFilter,
        workdir: &Path,
        config: &Config,
        writer: &OutputWriter,
    ) -> (RepositoryExport, bool) {
        let ctx = &target.context;
        let name = ctx.full_name();

        match source {
            HistorySource::Api { project, repo } => {
                let mut export = RepositoryExport::new(&project, &repo, &ctx.clone_url, SourceKind::Api);

                let Some(client) = client else {
                    export.error = Some(
                        "REST API requested but bitbucket.url, username or token is missing"
                            .to_string(),
                    );
                    return (export, false);
                };

                tracing::info!("{}: reading pull requests from {}", name, client.base_url());
                let extractor = PullRequestExtractor::new(client).with_state(state);
                match extractor.get_all_prs_with_approvals(&project, &repo).await {
                    Ok(extraction) => export = export.with_extraction(extraction),
                    Err(e) => {
                        let auth = e.is_auth();
                        export.error = Some(e.to_string());
                        return (export, auth);
                    }
                }

                if !self.no_history {
                    match self.walk_history(target, workdir, config, false).await {
                        Ok(history) => export.commits = history.commits,
                        Err(e) => {
                            writer.write_warning(&format!("{}: commit history unavailable: {:#}", name, e));
                            export.warnings.push(ExtractionWarning {
                                pr_id: None,
                                stage: ExtractionStage::History,
                                message: format!("{:#}", e),
                            });
                        }
                    }
                }

                (export, false)
            }
            HistorySource::LocalHistory { reason } => {
                let mut export = RepositoryExport::new(
                    &ctx.owner,
                    &ctx.repo_slug,
                    &ctx.clone_url,
                    SourceKind::LocalHistory,
                );

                if self.source == SourceMode::Local {
                    writer.write_info(&format!("{}: using local history", name));
                } else {
                    writer.write_warning(&format!("{}: falling back to local history ({})", name, reason));
                }
                export.fallback_reason = Some(reason);

                if self.no_history {
                    export.error = Some("local history is disabled by --no-history".to_string());
                    return (export, false);
                }

                match self.walk_history(target, workdir, config, true).await {
                    Ok(history) => {
                        export.commits = history.commits;
                        export.pull_requests = history
                            .merged
                            .into_iter()
                            .filter(|pr| state.matches(pr.state))
                            .map(|pull_request| ExtractedPullRequest {
                                pull_request,
                                approvals: Vec::new(),
                            })
                            .collect();
                    }
                    Err(e) => export.error = Some(format!("{:#}", e)),
                }

                (export, false)
            }
        }
    }

    /// Clones or opens the repository on a blocking thread and walks it.
    async fn walk_history(
        &self,
        target: &Target,
        workdir: &Path,
        config: &Config,
        with_merges: bool,
    ) -> Result<WalkedHistory> {
        let ctx = &target.context;
        let dest = target
            .local_path
            .clone()
            .unwrap_or_else(|| workdir.join(&ctx.owner).join(&ctx.repo_slug));
        let url = ctx.clone_url.clone();
        let credentials = credentials_for(ctx, config);
        let verify_ssl = config.bitbucket.verify_ssl;
        let (project, repo) = (ctx.owner.clone(), ctx.repo_slug.clone());

        tokio::task::spawn_blocking(move || {
            let repository = clone_or_open(&url, &dest, credentials.as_ref(), verify_ssl)?;
            let walker = HistoryWalker::new(repository);
            let commits = walker.commits()?;
            let merged = if with_merges {
                walker.merged_pull_requests(&project, &repo)?
            } else {
                Vec::new()
            };
            Ok::<_, anyhow::Error>(WalkedHistory { commits, merged })
        })
        .await
        .context("History walk panicked")?
    }
}

/// Credentials are only sent to the configured server.
fn credentials_for(ctx: &RepoContext, config: &Config) -> Option<Credentials> {
    match config.bitbucket.host() {
        Some(host) if host == ctx.host => config.bitbucket.credentials(),
        _ => None,
    }
}

fn parse_repos_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repos_file() {
        let content = "\n# server repos\nPROJ/app\n  https://bb.example.com/scm/PROJ/lib.git  # lib\n\n";
        assert_eq!(
            parse_repos_file(content),
            vec!["PROJ/app", "https://bb.example.com/scm/PROJ/lib.git"]
        );
    }

    #[test]
    fn test_credentials_only_for_configured_host() {
        let mut config = Config::default();
        config.bitbucket = crate::config::BitbucketConfig::new("https://bb.example.com", "u", "t");
        let resolver = ContextResolver::new(&config);

        let own = resolver.parse_remote_url("https://bb.example.com/scm/P/r.git").unwrap();
        let other = resolver.parse_remote_url("https://git.other.com/P/r.git").unwrap();

        assert!(credentials_for(&own, &config).is_some());
        assert!(credentials_for(&other, &config).is_none());
    }
}
