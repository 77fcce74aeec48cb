//! Video search and trending commands.

use super::preflight;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::youtube::{DurationFilter, Level, Video, VideoQuery, YoutubeClient};
use anyhow::Result;

/// Run the videos command.
pub async fn run_videos(
    query: &str,
    subject: Option<String>,
    duration: Option<DurationFilter>,
    level: Option<Level>,
    channel: Option<String>,
    settings: Settings,
) -> Result<()> {
    preflight(Operation::Videos, &settings).await?;

    let client = YoutubeClient::new(&settings.youtube)?;
    let query = VideoQuery {
        q: query.to_string(),
        subject,
        duration,
        level,
        channels: channel,
    };

    let spinner = Output::spinner("Searching YouTube...");
    let videos = client.search(&query).await;
    spinner.finish_and_clear();

    print_videos(videos?);
    Ok(())
}

/// Run the trending command.
pub async fn run_trending(seed: usize, settings: Settings) -> Result<()> {
    preflight(Operation::Videos, &settings).await?;

    let client = YoutubeClient::new(&settings.youtube)?;
    if let Some(topic) = client.trending_query(seed) {
        Output::info(&format!("Trending in \"{}\"", topic));
    }

    let spinner = Output::spinner("Fetching trending videos...");
    let videos = client.trending(seed).await;
    spinner.finish_and_clear();

    print_videos(videos?);
    Ok(())
}

fn print_videos(videos: Vec<Video>) {
    if videos.is_empty() {
        Output::warning("No videos found.");
        return;
    }

    Output::success(&format!("Found {} videos", videos.len()));
    for video in &videos {
        Output::video(video);
    }
}
