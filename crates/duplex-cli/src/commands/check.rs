//! Check command: resolve the configuration and print it.

use crate::cli::CheckArgs;
use crate::commands::load_config;
use crate::error::Result;
use crate::ui;

/// Resolve and validate the configuration, then print it as JSON on stdout.
pub async fn execute(args: CheckArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    println!("{}", serde_json::to_string_pretty(&config)?);

    ui::success(&format!("Configuration is valid ({} mode)", config.mode));
    Ok(())
}
