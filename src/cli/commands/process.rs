//! Process command: transcript summary and study questions.

use super::preflight;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::{ProcessedVideo, TranscriptPipeline};
use anyhow::Result;

/// Run the process command.
pub async fn run_process(
    url: &str,
    title: Option<String>,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    preflight(Operation::Transcript, &settings).await?;

    let pipeline = TranscriptPipeline::from_settings(&settings)?;

    let spinner = Output::spinner("Fetching and analyzing transcript...");
    let result = pipeline.process(url, title.as_deref()).await;
    spinner.finish_and_clear();

    let processed = match result {
        Ok(processed) => processed,
        Err(e) => {
            Output::error(&format!("Processing failed: {}", e));
            return Err(e.into());
        }
    };

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&processed)?;
            std::fs::write(&path, json)?;
            Output::success(&format!(
                "Wrote summary and {} questions to {}",
                processed.questions.len(),
                path
            ));
        }
        None => print_processed(&processed),
    }

    Ok(())
}

fn print_processed(processed: &ProcessedVideo) {
    let summary = &processed.summary;

    Output::success(&format!(
        "Processed {} ({} characters of transcript)",
        processed.video_id, processed.transcript_length
    ));

    let sections = [
        ("Main Points", &summary.main_points),
        ("Key Concepts", &summary.key_concepts),
        ("Prerequisites", &summary.prerequisites),
        ("Applications", &summary.applications),
        ("Follow-up Topics", &summary.follow_up_topics),
    ];
    for (heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        Output::header(heading);
        for item in items {
            Output::list_item(item);
        }
    }

    if !summary.detailed_explanation.is_empty() {
        Output::header("Explanation");
        println!("{}", summary.detailed_explanation);
    }

    if !processed.questions.is_empty() {
        Output::header("Questions");
        for (i, question) in processed.questions.iter().enumerate() {
            Output::question(i + 1, question);
        }
    }
}
