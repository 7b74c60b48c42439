//! `bulkdl config` command implementation

use crate::commands::Context;
use crate::config::default_config_path;
use crate::error::Result;
use colored::Colorize;

/// Show the effective configuration with the auth token masked
pub async fn show(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;

    println!("{}", "bulkdl configuration:".cyan().bold());
    println!();
    print!("{}", config.redacted().to_toml()?);
    println!();
    println!("{}", "Environment Variables:".cyan());
    println!("  BULKDL_SERVER_URL        - Platform URL");
    println!("  BULKDL_GRAPHQL_PATH      - Federated GraphQL path");
    println!("  BULKDL_AUTH_TOKEN        - Authenticity token");
    println!("  BULKDL_USER_ID           - Signed-in user ID");
    println!("  BULKDL_OUTPUT_DIR        - Directory for saved CSV files");
    println!("  BULKDL_API_TIMEOUT_SECS  - Request timeout");

    Ok(())
}

/// Print the config file in use, or where one would be read from
pub async fn path(ctx: &Context) -> Result<()> {
    match ctx.config_path.clone().or_else(default_config_path) {
        Some(path) if path.exists() => println!("{}", path.display()),
        Some(path) => println!("{} (not present, using defaults)", path.display()),
        None => println!("No config directory available, using defaults"),
    }
    Ok(())
}
