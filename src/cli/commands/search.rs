//! Search command implementation.

use super::preflight;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::{search_transcript, SubprocessFetcher, TranscriptFetcher};
use crate::youtube::extract_video_id;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(url: &str, query: &str, settings: Settings) -> Result<()> {
    preflight(Operation::TranscriptSearch, &settings).await?;

    let video_id = extract_video_id(url)?;
    let fetcher = SubprocessFetcher::from_settings(&settings.transcript);

    let spinner = Output::spinner("Fetching transcript...");
    let transcript = fetcher.fetch(&video_id).await;
    spinner.finish_and_clear();

    let found = search_transcript(query, &transcript?)?;
    if found.results.is_empty() {
        Output::warning("No sentences match your query.");
        return Ok(());
    }

    Output::success(&format!(
        "{} matching sentences, showing {}",
        found.total_matches,
        found.results.len()
    ));
    for (i, hit) in found.results.iter().enumerate() {
        Output::search_hit(i + 1, hit.relevance_score, &hit.text);
    }

    Ok(())
}
