//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod process;
mod search;
mod serve;
mod videos;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use process::run_process;
pub use search::run_search;
pub use serve::run_serve;
pub use videos::{run_trending, run_videos};

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;

/// Run pre-flight checks, pointing at `doctor` on failure.
async fn preflight(operation: Operation, settings: &Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(operation, settings).await {
        Output::error(&format!("{}", e));
        Output::info("Run 'focustube doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    Ok(())
}
