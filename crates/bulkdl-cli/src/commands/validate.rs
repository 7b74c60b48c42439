//! `bulkdl validate` command implementation
//!
//! Shows which selected objects can be downloaded and what the current user
//! is allowed to request for them.

use crate::api::ApiClient;
use crate::commands::{build_selection, open_dialog, Context};
use crate::dialog::BulkDownloadDialog;
use crate::error::Result;
use bulkdl_common::EntityId;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

/// Machine-readable validation report
#[derive(Debug, Serialize)]
pub struct ValidationReport<'a> {
    pub workflow: String,
    pub workflow_entity: String,
    pub valid_ids: &'a [EntityId],
    pub invalid_sample_names: Vec<&'a str>,
    pub error: Option<&'a str>,
    pub all_objects_owned_by_current_user: bool,
    pub collaborator_on_all_samples: bool,
    pub mass_normalized_backgrounds_available: Option<bool>,
    pub checked_at: DateTime<Utc>,
}

impl<'a> ValidationReport<'a> {
    pub fn from_dialog(dialog: &'a BulkDownloadDialog) -> Self {
        let permissions = dialog.permissions();
        Self {
            workflow: dialog.selection().workflow.to_string(),
            workflow_entity: dialog.selection().workflow_entity.to_string(),
            valid_ids: dialog.valid_ids(),
            invalid_sample_names: dialog.invalid_sample_names(),
            error: dialog.validation_error(),
            all_objects_owned_by_current_user: permissions.uploaded_all_objects,
            collaborator_on_all_samples: permissions.collaborator_on_all_samples,
            mass_normalized_backgrounds_available: dialog.mass_normalized_available(),
            checked_at: Utc::now(),
        }
    }
}

pub async fn run(ctx: &Context, args: &crate::SelectionArgs, json: bool) -> Result<()> {
    let config = ctx.config()?;
    let client = ApiClient::from_config(&config)?;
    let selection = build_selection(args, &config)?;
    let dialog = open_dialog(&config, &client, selection).await?;

    let report = ValidationReport::from_dialog(&dialog);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let label = dialog.selection().workflow.object_label();
    println!("{}", "Validation:".cyan().bold());
    println!(
        "  {} {} valid of {} selected",
        "✓".green(),
        report.valid_ids.len(),
        dialog.selection().ids.len()
    );

    if report.valid_ids.is_empty() {
        println!("  {} No valid {}s to download data from.", "✗".red(), label);
    }

    if !report.invalid_sample_names.is_empty() {
        println!(
            "  {} Excluded because they either failed or are still processing:",
            "!".yellow()
        );
        for name in &report.invalid_sample_names {
            println!("      {}", name);
        }
    }

    if let Some(error) = report.error {
        println!(
            "  {} An error occurred when verifying your selected {}s: {}",
            "✗".red(),
            label,
            error
        );
    }

    println!();
    println!("{}", "Permissions:".cyan().bold());
    println!(
        "  {:<32} {}",
        "Uploaded all selected objects:", report.all_objects_owned_by_current_user
    );
    println!(
        "  {:<32} {}",
        "Collaborator on all samples:", report.collaborator_on_all_samples
    );
    if let Some(available) = report.mass_normalized_backgrounds_available {
        println!("  {:<32} {}", "Mass-normalized backgrounds:", available);
    }

    Ok(())
}
