//! `bulkdl types` command implementation
//!
//! Lists the download types offered for a selection, grouped by category,
//! with their fields and the reason a type is unavailable.

use crate::api::ApiClient;
use crate::api::types::DownloadTypeCatalogEntry;
use crate::commands::{build_selection, open_dialog, Context};
use crate::dialog::BulkDownloadDialog;
use crate::error::Result;
use crate::options::visible_download_types;
use crate::SelectionArgs;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

pub async fn run(ctx: &Context, args: &SelectionArgs) -> Result<()> {
    let config = ctx.config()?;
    let client = ApiClient::from_config(&config)?;
    let selection = build_selection(args, &config)?;
    let dialog = open_dialog(&config, &client, selection).await?;

    let groups = visible_download_types(dialog.download_types());
    if groups.is_empty() {
        println!("No download types available for this selection.");
        return Ok(());
    }

    println!(
        "{} {} selected",
        dialog.selection().ids.len(),
        dialog.selection().workflow.object_label()
    );

    for (category, entries) in groups {
        println!();
        if let Some(category) = category {
            println!("{}", category.cyan().bold());
        }
        println!("{}", render_table(&dialog, &entries));
    }

    Ok(())
}

fn render_table(dialog: &BulkDownloadDialog, entries: &[&DownloadTypeCatalogEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Type", "Name", "Fields", "Available"]);

    for entry in entries {
        let fields = entry
            .fields
            .iter()
            .map(|f| match &f.default_value {
                Some(default) => format!("{} (default: {})", f.field_type, default.display_name),
                None => f.field_type.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n");

        let available = match dialog.disabled_reason(entry) {
            Some(reason) => reason,
            None if entry.admin_only => "yes (admin only)".to_string(),
            None => "yes".to_string(),
        };

        table.add_row(vec![
            entry.type_name.clone(),
            entry.display_name.clone(),
            if fields.is_empty() { "-".to_string() } else { fields },
            available,
        ]);
    }

    table
}
