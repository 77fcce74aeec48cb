//! AI curator endpoints.

use super::error::{ApiError, ApiJson, ApiResult};
use super::SharedState;
use crate::ai::{Quiz, RecommendationRequest, Recommendations, VideoSummary};
use crate::youtube::Video;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/ai/recommendations", post(recommendations))
        .route("/api/ai/video-summary", post(video_summary))
        .route("/api/ai/generate-quiz", post(generate_quiz))
        .route("/api/ai/moderate", post(moderate))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoRequest {
    video: Option<Video>,
    question_count: Option<usize>,
}

impl VideoRequest {
    fn video(&self) -> ApiResult<&Video> {
        self.video
            .as_ref()
            .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Video data is required"))
    }
}

#[derive(Deserialize)]
struct ModerationRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModerationResponse {
    is_educational: bool,
}

async fn recommendations(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<RecommendationRequest>,
) -> ApiResult<Json<Recommendations>> {
    Ok(Json(state.curator()?.recommendations(&request).await?))
}

async fn video_summary(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<VideoRequest>,
) -> ApiResult<Json<VideoSummary>> {
    let video = request.video()?;
    Ok(Json(state.curator()?.video_summary(video).await?))
}

async fn generate_quiz(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<VideoRequest>,
) -> ApiResult<Json<Quiz>> {
    let video = request.video()?;
    Ok(Json(state.curator()?.quiz(video, request.question_count).await?))
}

async fn moderate(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<ModerationRequest>,
) -> ApiResult<Json<ModerationResponse>> {
    let is_educational = state
        .curator()?
        .moderate(&request.title, &request.description)
        .await?;
    Ok(Json(ModerationResponse { is_educational }))
}

#[cfg(test)]
mod tests {
    use crate::server::testing::*;
    use reqwest::StatusCode;
    use serde_json::{json, Value};

    fn video() -> Value {
        json!({
            "id": "dQw4w9WgXcQ",
            "title": "Newton's laws of motion",
            "description": "Force, mass and acceleration",
            "channel": "Physics Girl"
        })
    }

    async fn post(server: &TestServer, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = server.http.post(server.url(path)).json(&body).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_curator_missing_is_unavailable() {
        let server = spawn(TestDeps::default()).await;

        let (status, body) =
            post(&server, "/api/ai/recommendations", json!({ "query": "algebra" })).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn test_recommendations() {
        let server = spawn(TestDeps {
            curator: Some(scripted(&[
                r#"{"recommendations": ["linear equations"], "explanation": "start simple", "suggestedSearchTerms": ["algebra basics"]}"#,
            ])),
            ..Default::default()
        })
        .await;

        let (status, body) = post(
            &server,
            "/api/ai/recommendations",
            json!({ "query": "algebra", "userLevel": "beginner" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"][0], "linear equations");
        assert_eq!(body["suggestedSearchTerms"][0], "algebra basics");

        let (status, body) = post(&server, "/api/ai/recommendations", json!({ "query": "" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Query is required");
    }

    #[tokio::test]
    async fn test_quiz_and_summary() {
        let server = spawn(TestDeps {
            curator: Some(scripted(&[
                r#"{"questions": [{"question": "F = ?", "options": ["ma", "mv"], "correctAnswer": 0, "explanation": "Newton II"}], "topic": "Dynamics"}"#,
                "I cannot help with that",
            ])),
            ..Default::default()
        })
        .await;

        let (status, quiz) = post(
            &server,
            "/api/ai/generate-quiz",
            json!({ "video": video(), "questionCount": 3 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["topic"], "Dynamics");
        assert_eq!(quiz["questions"][0]["correctAnswer"], 0);

        // Unparsable replies fall back to a templated summary.
        let (status, summary) =
            post(&server, "/api/ai/video-summary", json!({ "video": video() })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["difficulty"], "intermediate");
        assert!(summary["summary"].as_str().unwrap().contains("Newton's laws of motion"));

        let (status, body) = post(&server, "/api/ai/video-summary", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Video data is required");
    }

    #[tokio::test]
    async fn test_moderate() {
        let server = spawn(TestDeps {
            curator: Some(scripted(&["TRUE"])),
            ..Default::default()
        })
        .await;

        let (status, body) = post(
            &server,
            "/api/ai/moderate",
            json!({ "title": "Cell biology", "description": "Organelles explained" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isEducational"], true);

        let (status, _) = post(&server, "/api/ai/moderate", json!({ "title": "Cell biology" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
