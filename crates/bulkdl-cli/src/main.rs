//! bulkdl CLI - Main entry point

use bulkdl_cli::commands::{self, Context};
use bulkdl_cli::{Cli, Commands, ConfigCommand};
use bulkdl_common::logging::{init_logging, LogConfig};
use clap::{CommandFactory, Parser};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    let Some(command) = &cli.command else {
        let _ = Cli::command().print_help();
        process::exit(2);
    };

    // Environment variables take precedence over the verbose flag
    let log_config = match LogConfig::for_cli(cli.verbose).merge_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring invalid logging environment: {}", e);
            LogConfig::for_cli(cli.verbose)
        }
    };

    // CLI should work without logging
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(&cli, command).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli, command: &Commands) -> bulkdl_cli::Result<()> {
    let ctx = Context::new(cli.config.clone(), cli.server_url.clone());

    match command {
        Commands::Types { selection } => commands::types::run(&ctx, selection).await,

        Commands::Validate { selection, json } => {
            commands::validate::run(&ctx, selection, *json).await
        }

        Commands::Download {
            download_type,
            selection,
            fields,
            output_dir,
        } => commands::download::run(&ctx, selection, download_type, fields, output_dir.clone()).await,

        Commands::HeatmapLink {
            selection,
            fields,
            open,
        } => commands::heatmap_link::run(&ctx, selection, fields, *open).await,

        Commands::Config { command } => match command {
            ConfigCommand::Show => commands::config::show(&ctx).await,
            ConfigCommand::Path => commands::config::path(&ctx).await,
        },
    }
}
