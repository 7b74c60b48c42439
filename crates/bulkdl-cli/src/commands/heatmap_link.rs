//! `bulkdl heatmap-link` command implementation

use crate::api::ApiClient;
use crate::commands::download::apply_field_args;
use crate::commands::{build_selection, open_dialog, Context};
use crate::error::Result;
use crate::options::BIOM_FORMAT;
use crate::sinks::{BrowserOpener, PrintOpener, UrlOpener};
use crate::SelectionArgs;

/// Print, or open, the heatmap matching the `biom_format` options.
pub async fn run(ctx: &Context, args: &SelectionArgs, fields: &[String], open: bool) -> Result<()> {
    let config = ctx.config()?;
    let client = ApiClient::from_config(&config)?;
    let selection = build_selection(args, &config)?;
    let mut dialog = open_dialog(&config, &client, selection).await?;

    apply_field_args(&mut dialog, BIOM_FORMAT, fields)?;

    let opener: &dyn UrlOpener = if open { &BrowserOpener } else { &PrintOpener };
    dialog.open_heatmap(client.base_url(), opener)
}
