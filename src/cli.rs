//! # Pipeline Archiver CLI
//!
//! Command-line trigger surface for the archiver and the values aggregator.
//!
//! ## Usage
//!
//! ```bash
//! # Archive the artifact declared by a finished step
//! pipeline-archiver archive --context step-context.yaml --workspace /workspace
//!
//! # Merge values files from a configured codehost (later files win)
//! pipeline-archiver values --codehost-id 1 --owner acme --repo charts --branch main \
//!     --values-paths base/values.yaml,overlays/prod.yaml --output values.yaml
//!
//! # Merge values files from a direct repository link
//! pipeline-archiver values --repo-link https://github.com/acme/charts \
//!     --values-paths values.yaml
//! ```

use crate::archive::{ArchiveOutcome, Archiver};
use crate::config::{ArchiverConfig, CodehostRegistry, ConfigError};
use crate::model::{ArchivalContext, ValuesRequest};
use crate::runtime::CommandError;
use crate::source::HttpSourceFetcher;
use crate::storage::S3StoreFactory;
use crate::values::ValuesAggregator;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Archive pipeline step artifacts and merge remote values files
#[derive(Debug, Parser)]
#[command(name = "pipeline-archiver", version)]
#[command(about = "Archive pipeline step artifacts and merge remote values files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Write Prometheus metrics to this file when the command finishes
    #[arg(long, global = true)]
    pub metrics_file: Option<PathBuf>,

    /// Tracing filter, e.g. `pipeline_archiver=debug`
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload the artifact a pipeline step declared
    Archive {
        /// Archival context file (YAML or JSON)
        #[arg(long)]
        context: PathBuf,

        /// Workspace root that file artifact locations are relative to
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Fetch values files and print the merged document
    Values(ValuesArgs),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Archive { .. } => "archive",
            Commands::Values(_) => "values",
        }
    }
}

#[derive(Debug, Args)]
pub struct ValuesArgs {
    /// Configured codehost to fetch from (0 = use --repo-link)
    #[arg(long, default_value_t = 0)]
    pub codehost_id: u64,

    #[arg(long, default_value = "")]
    pub owner: String,

    #[arg(long, default_value = "")]
    pub repo: String,

    #[arg(long, default_value = "")]
    pub branch: String,

    /// Direct repository link, used when no codehost id is given
    #[arg(long)]
    pub repo_link: Option<String>,

    /// Comma-separated paths; later files override earlier ones
    #[arg(long, default_value = "")]
    pub values_paths: String,

    /// Write the merged document here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Codehost registry file
    #[arg(long)]
    pub codehost_config: Option<PathBuf>,
}

impl ValuesArgs {
    pub fn to_request(&self) -> ValuesRequest {
        ValuesRequest {
            codehost_id: self.codehost_id,
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            repo_link: self.repo_link.clone(),
            values_paths: self.values_paths.clone(),
        }
    }
}

impl Cli {
    /// Apply flags on top of environment configuration
    pub fn apply_to(&self, config: &mut ArchiverConfig) {
        if let Some(path) = &self.metrics_file {
            config.metrics_file = Some(path.clone());
        }
        if let Some(filter) = &self.log_level {
            config.log_filter_override = Some(filter.clone());
        }
        match &self.command {
            Commands::Archive {
                workspace: Some(workspace),
                ..
            } => config.workspace_root = workspace.clone(),
            Commands::Values(ValuesArgs {
                codehost_config: Some(path),
                ..
            }) => config.codehost_config = Some(path.clone()),
            _ => {}
        }
    }
}

/// Run the selected command
pub async fn run(cli: &Cli, config: &ArchiverConfig) -> Result<(), CommandError> {
    match &cli.command {
        Commands::Archive { context, .. } => run_archive(context, config).await,
        Commands::Values(args) => run_values(args, config).await,
    }
}

async fn run_archive(context_path: &Path, config: &ArchiverConfig) -> Result<(), CommandError> {
    let ctx = load_context(context_path)?;
    let archiver = Archiver::new(
        config.workspace_root.clone(),
        S3StoreFactory::new(config.storage_region.clone()),
    );

    match archiver.archive(&ctx).await? {
        ArchiveOutcome::Uploaded { key, .. } => {
            // Printed so the pipeline runner can record where the artifact went
            println!("{key}");
        }
        ArchiveOutcome::Skipped { local_path } => {
            info!("Nothing archived: {} was not produced", local_path.display());
        }
        ArchiveOutcome::NoOp => {
            info!("Nothing archived: no storage destination or artifact declared");
        }
    }
    Ok(())
}

async fn run_values(args: &ValuesArgs, config: &ArchiverConfig) -> Result<(), CommandError> {
    let registry = match &config.codehost_config {
        Some(path) => CodehostRegistry::load(path)?,
        None => CodehostRegistry::default(),
    };
    info!("Loaded {} codehost(s)", registry.len());

    let fetcher = HttpSourceFetcher::new(registry, &config.user_agent)
        .context("Failed to build HTTP client")?;
    let merged = ValuesAggregator::new(fetcher)
        .aggregate_request(args.to_request())
        .await?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, merged.as_bytes())
                .await
                .with_context(|| format!("Failed to write merged values to {}", path.display()))?;
            info!("Wrote merged values to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(merged.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write merged values to stdout")?;
        }
    }
    Ok(())
}

/// Load an archival context from a YAML or JSON file
pub fn load_context(path: &Path) -> Result<ArchivalContext, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    // JSON is valid YAML, so one parser covers both formats
    let ctx: ArchivalContext =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Context {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    if ctx.pipeline_name.trim().is_empty() {
        return Err(ConfigError::Context {
            path: path.to_path_buf(),
            message: "pipelineName is required".to_string(),
        });
    }
    Ok(ctx)
}
