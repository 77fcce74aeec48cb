//! Transcript processing, tutoring and keyword search.
//!
//! Request and response bodies here are snake_case.

use super::error::{ApiError, ApiJson, ApiResult};
use super::SharedState;
use crate::transcript::{search_transcript, ProcessedVideo, SearchHit};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/transcript/process", post(process))
        .route("/api/transcript/ask", post(ask))
        .route("/api/transcript/search", post(search))
}

fn required(value: &str, message: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, message));
    }
    Ok(())
}

#[derive(Deserialize)]
struct ProcessRequest {
    #[serde(default)]
    video_url: String,
    video_title: Option<String>,
}

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    video_title: String,
}

#[derive(Serialize)]
struct AskResponse {
    success: bool,
    question: String,
    answer: String,
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    transcript: String,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    query: String,
    results: Vec<SearchHit>,
    total_matches: usize,
}

async fn process(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<ProcessRequest>,
) -> ApiResult<Json<ProcessedVideo>> {
    required(&request.video_url, "Video URL is required")?;
    let processed = state
        .pipeline()?
        .process(&request.video_url, request.video_title.as_deref())
        .await?;
    Ok(Json(processed))
}

async fn ask(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
    required(&request.question, "Question and transcript are required")?;
    required(&request.transcript, "Question and transcript are required")?;

    let answer = state
        .pipeline()?
        .answer(&request.question, &request.transcript, &request.video_title)
        .await?;
    Ok(Json(AskResponse {
        success: true,
        question: request.question,
        answer,
    }))
}

/// Pure keyword search; works without any API key.
async fn search(ApiJson(request): ApiJson<SearchRequest>) -> ApiResult<Json<SearchResponse>> {
    required(&request.query, "Query and transcript are required")?;
    required(&request.transcript, "Query and transcript are required")?;

    let found = search_transcript(&request.query, &request.transcript)?;
    Ok(Json(SearchResponse {
        success: true,
        query: found.query,
        results: found.results,
        total_matches: found.total_matches,
    }))
}

#[cfg(test)]
mod tests {
    use crate::error::{FocusTubeError, Result};
    use crate::server::testing::*;
    use crate::transcript::TranscriptFetcher;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use std::sync::Arc;

    const TRANSCRIPT: &str = "Entropy measures disorder. Heat flows from hot to cold. \
        The second law says entropy never decreases in an isolated system. \
        Engines convert heat into work.";

    struct CannedFetcher;

    #[async_trait]
    impl TranscriptFetcher for CannedFetcher {
        async fn fetch(&self, video_id: &str) -> Result<String> {
            match video_id {
                "dQw4w9WgXcQ" => Ok(TRANSCRIPT.to_string()),
                _ => Err(FocusTubeError::TranscriptUnavailable(
                    "Subtitles are disabled for this video".to_string(),
                )),
            }
        }
    }

    async fn post(server: &TestServer, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = server.http.post(server.url(path)).json(&body).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_search_needs_no_keys() {
        let server = spawn(TestDeps::default()).await;

        let (status, body) = post(
            &server,
            "/api/transcript/search",
            json!({ "query": "entropy", "transcript": TRANSCRIPT }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["total_matches"], 2);
        assert_eq!(body["results"][0]["relevance_score"], 1);

        let (status, _) = post(
            &server,
            "/api/transcript/search",
            json!({ "query": " ", "transcript": TRANSCRIPT }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_process_and_ask() {
        let analysis = r#"{
            "summary": {"main_points": ["Entropy"], "detailed_explanation": "Thermodynamics"},
            "questions": [
                {"question": "Entropy in an isolated system?", "options": ["decreases", "never decreases"], "correct_answer": 1, "type": "conceptual"}
            ]
        }"#;
        let server = spawn(TestDeps {
            pipeline: Some((
                Arc::new(CannedFetcher),
                scripted(&[analysis, "Because of the second law."]),
            )),
            ..Default::default()
        })
        .await;

        let (status, processed) = post(
            &server,
            "/api/transcript/process",
            json!({ "video_url": "https://youtu.be/dQw4w9WgXcQ", "video_title": "Thermo 101" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(processed["video_id"], "dQw4w9WgXcQ");
        assert_eq!(processed["transcript_length"], TRANSCRIPT.chars().count());
        assert_eq!(processed["questions"][0]["type"], "conceptual");

        let (status, answer) = post(
            &server,
            "/api/transcript/ask",
            json!({ "question": "Why does heat flow?", "transcript": TRANSCRIPT }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(answer["answer"], "Because of the second law.");
        assert_eq!(answer["question"], "Why does heat flow?");
    }

    #[tokio::test]
    async fn test_process_errors() {
        let server = spawn(TestDeps {
            pipeline: Some((Arc::new(CannedFetcher), scripted(&[]))),
            ..Default::default()
        })
        .await;

        let (status, body) = post(&server, "/api/transcript/process", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Video URL is required");

        let (status, _) = post(
            &server,
            "/api/transcript/process",
            json!({ "video_url": "https://vimeo.com/1234" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post(
            &server,
            "/api/transcript/process",
            json!({ "video_url": "aaaaaaaaaaa" }),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Subtitles are disabled"));
    }

    #[tokio::test]
    async fn test_pipeline_missing_is_unavailable() {
        let server = spawn(TestDeps::default()).await;

        let (status, _) = post(
            &server,
            "/api/transcript/ask",
            json!({ "question": "What?", "transcript": TRANSCRIPT }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
