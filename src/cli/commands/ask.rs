//! Ask command implementation.

use super::preflight;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::TranscriptPipeline;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    url: &str,
    question: &str,
    title: Option<String>,
    settings: Settings,
) -> Result<()> {
    preflight(Operation::Transcript, &settings).await?;

    let pipeline = TranscriptPipeline::from_settings(&settings)?;

    let spinner = Output::spinner("Fetching transcript...");
    let transcript = pipeline.transcript(url).await;
    spinner.finish_and_clear();
    let (video_id, transcript) = transcript?;

    let spinner = Output::spinner("Asking the tutor...");
    let answer = pipeline
        .answer(question, &transcript, title.as_deref().unwrap_or(&video_id))
        .await;
    spinner.finish_and_clear();

    match answer {
        Ok(answer) => {
            println!("\n{}\n", answer);
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
