//! `bulkdl download` command implementation
//!
//! Loads the options for a selection, applies `--field` values, and creates
//! the download through the dispatcher.

use crate::api::ApiClient;
use crate::commands::{build_selection, open_dialog, parse_field_arg, Context};
use crate::dialog::{BulkDownloadDialog, CreateStatus};
use crate::dispatcher::{CreationDispatcher, CreationOutcome};
use crate::error::{CliError, Result};
use crate::sinks::{FileCsvSink, TracingAnalytics};
use crate::SelectionArgs;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

pub async fn run(
    ctx: &Context,
    args: &SelectionArgs,
    download_type: &str,
    fields: &[String],
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = ctx.config()?;
    let client = ApiClient::from_config(&config)?;
    let selection = build_selection(args, &config)?;
    let mut dialog = open_dialog(&config, &client, selection).await?;

    apply_field_args(&mut dialog, download_type, fields)?;
    dialog
        .select_download_type(download_type)
        .map_err(CliError::invalid_input)?;

    let csv = FileCsvSink::new(output_dir.unwrap_or_else(|| config.output_dir.clone()));
    let analytics = TracingAnalytics;
    let dispatcher = CreationDispatcher::new(&client, &csv, &analytics)
        .with_authenticity_token(client.auth_token());

    info!(download_type, session = %dialog.session_id(), "Submitting bulk download");
    match dialog.submit(&dispatcher).await {
        CreateStatus::Success(CreationOutcome::GenerationStarted { download_id }) => {
            match download_id {
                Some(id) => println!("{} Download {} is being generated.", "✓".green(), id.bold()),
                None => println!("{} Your download is being generated.", "✓".green()),
            }
            println!("  Check the downloads page on the platform when it is ready.");
            Ok(())
        }
        CreateStatus::Success(CreationOutcome::Saved { path }) => {
            println!("{} Saved {}", "✓".green(), path.display());
            Ok(())
        }
        CreateStatus::Error(message) => Err(CliError::api(message.clone())),
        status => Err(CliError::api(format!("Download was not created ({:?})", status))),
    }
}

/// Apply `--field` arguments to the given download type's selections.
pub fn apply_field_args(
    dialog: &mut BulkDownloadDialog,
    download_type: &str,
    fields: &[String],
) -> Result<()> {
    for raw in fields {
        let arg = parse_field_arg(raw)?;
        dialog.select_field(download_type, &arg.name, Some(arg.value), arg.display_name);
    }
    Ok(())
}
