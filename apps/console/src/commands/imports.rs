//! Workbook import jobs.

use anyhow::Context;
use chrono::FixedOffset;
use clap::Subcommand;
use showroom_client::AppContext;
use showroom_core::format::{format_date_time, import_progress_label};
use showroom_core::status::{status_label, status_tone};
use showroom_core::{ImportJob, ImportUpload};
use std::path::PathBuf;
use tracing::info;

use super::{now, or_dash, signed_in};
use crate::error::{CommandError, CommandResult};

#[derive(Subcommand, Debug)]
pub enum ImportCommand {
    /// List import jobs
    List,

    /// Upload a workbook as a new import job
    Upload {
        file: PathBuf,
        #[arg(long)]
        branch: Option<i64>,
        #[arg(long)]
        sheet: Option<String>,
    },
}

pub async fn run(ctx: &AppContext, cmd: ImportCommand) -> CommandResult<Vec<String>> {
    signed_in(ctx).await?;

    match cmd {
        ImportCommand::List => {
            let jobs = ctx.api.import_jobs().await?;
            Ok(render_jobs(&jobs, *now().offset()))
        }
        ImportCommand::Upload { file, branch, sheet } => {
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| CommandError::invalid_argument(format!("not a file: {}", file.display())))?;
            let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            info!(file = %file_name, bytes = bytes.len(), "Uploading workbook");

            let job = ctx
                .api
                .upload_import(ImportUpload {
                    file_name,
                    bytes,
                    branch_id: branch,
                    sheet_name: sheet,
                })
                .await?;
            Ok(vec![format!(
                "Queued import job #{} for {} ({})",
                job.id,
                job.source_filename,
                status_label(&job.status)
            )])
        }
    }
}

pub fn render_jobs(jobs: &[ImportJob], offset: FixedOffset) -> Vec<String> {
    if jobs.is_empty() {
        return vec!["No import jobs".to_string()];
    }
    jobs.iter()
        .map(|job| {
            format!(
                "#{:<5} {} | {} [{:?}] | rows {} | sheet {} | {}",
                job.id,
                job.source_filename,
                status_label(&job.status),
                status_tone(&job.status),
                import_progress_label(job),
                or_dash(job.sheet_name.as_deref()),
                format_date_time(Some(&job.created_at), offset)
            )
        })
        .collect()
}
