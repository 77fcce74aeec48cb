//! Serve command: run the HTTP API.

use super::preflight;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::server::{self, AppState};
use anyhow::Result;
use std::sync::Arc;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> Result<()> {
    preflight(Operation::Serve, &settings).await?;

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let state = Arc::new(AppState::from_settings(&settings).await?);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("FocusTube API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Storage", &settings.storage.provider.to_string());
    Output::kv("Acting as", &settings.server.demo_user);
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /api/health");
    Output::kv("Videos", "GET  /api/videos/search, /api/videos/trending, /api/channels");
    Output::kv("Library", "/api/bookmarks, /api/study-sessions, /api/study-time/total");
    Output::kv("Planner", "/api/notes, /api/tasks, /api/flashcards, /api/goals, /api/schedules");
    Output::kv("AI", "POST /api/ai/{recommendations,video-summary,generate-quiz,moderate}");
    Output::kv("Transcript", "POST /api/transcript/{process,ask,search}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::serve(listener, state, settings.server.cors_permissive).await?;

    Ok(())
}
