//! Build command: one project build with the duplex plugins registered.

use std::sync::Arc;
use std::time::Instant;

use duplex_core::{BuildPlan, ReentrancyFlag, plugins_for};
use duplex_rolldown::{RolldownHost, top_level_config};
use tracing::info;

use crate::cli::BuildArgs;
use crate::commands::load_config;
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the build command.
///
/// The configuration is resolved up front so that configuration errors are
/// reported before anything is written.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start = Instant::now();
    let config = load_config(&args.config)?;
    let mode = config.mode;
    let server_out = config.server_config.out_dir.clone();
    let client_out = config.client_config.out_dir.clone();

    ui::info(&format!("Building {} ({mode})", config.server_entry));

    let plugins = plugins_for(
        Arc::new(BuildPlan::from_config(config)),
        ReentrancyFlag::process(),
    );
    let root = std::fs::canonicalize(&args.config.root)?;
    let host = RolldownHost::new(root, plugins);
    let summary = host.run(top_level_config()).await.map_err(CliError::Build)?;

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "build finished");

    if mode.is_skip() {
        ui::success(&format!(
            "Project build written to {} ({} files)",
            summary.out_dir.display(),
            summary.files.len()
        ));
    } else {
        ui::success("Server and client bundles built");
        ui::detail(&format!("server: {}", server_out.display()));
        ui::detail(&format!("client: {}", client_out.display()));
    }
    ui::detail(&format!("done in {:.2}s", start.elapsed().as_secs_f64()));
    Ok(())
}
