//! Bookmarks and study time tracking.

use super::error::{ApiJson, ApiPath, ApiResult};
use super::SharedState;
use crate::store::{Bookmark, NewBookmark, NewStudySession, StudySession};
use axum::extract::State;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/bookmarks", get(list_bookmarks).post(add_bookmark))
        .route("/api/bookmarks/{video_id}", delete(remove_bookmark))
        .route("/api/bookmarks/{video_id}/status", get(bookmark_status))
        .route(
            "/api/study-sessions",
            get(list_study_sessions).post(add_study_session),
        )
        .route("/api/study-time/total", get(total_study_time))
}

async fn list_bookmarks(State(state): State<SharedState>) -> ApiResult<Json<Vec<Bookmark>>> {
    Ok(Json(state.store.list_bookmarks(state.user_id).await?))
}

async fn add_bookmark(
    State(state): State<SharedState>,
    ApiJson(bookmark): ApiJson<NewBookmark>,
) -> ApiResult<Json<Bookmark>> {
    Ok(Json(state.store.add_bookmark(state.user_id, bookmark).await?))
}

/// Idempotent: succeeds whether or not the bookmark existed.
async fn remove_bookmark(
    State(state): State<SharedState>,
    ApiPath(video_id): ApiPath<String>,
) -> ApiResult<Json<Value>> {
    state.store.remove_bookmark(state.user_id, &video_id).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkStatus {
    is_bookmarked: bool,
}

async fn bookmark_status(
    State(state): State<SharedState>,
    ApiPath(video_id): ApiPath<String>,
) -> ApiResult<Json<BookmarkStatus>> {
    let is_bookmarked = state.store.is_bookmarked(state.user_id, &video_id).await?;
    Ok(Json(BookmarkStatus { is_bookmarked }))
}

async fn list_study_sessions(
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<StudySession>>> {
    Ok(Json(state.store.list_study_sessions(state.user_id).await?))
}

async fn add_study_session(
    State(state): State<SharedState>,
    ApiJson(session): ApiJson<NewStudySession>,
) -> ApiResult<Json<StudySession>> {
    Ok(Json(state.store.add_study_session(state.user_id, session).await?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TotalStudyTime {
    /// Minutes.
    total_time: i64,
}

async fn total_study_time(State(state): State<SharedState>) -> ApiResult<Json<TotalStudyTime>> {
    let total_time = state.store.total_study_minutes(state.user_id).await?;
    Ok(Json(TotalStudyTime { total_time }))
}

#[cfg(test)]
mod tests {
    use crate::server::testing::*;
    use reqwest::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_bookmark_lifecycle() {
        let server = spawn(TestDeps::default()).await;
        let bookmark = json!({
            "videoId": "dQw4w9WgXcQ",
            "title": "Fourier series",
            "channel": "3Blue1Brown",
            "duration": "PT20M"
        });

        let created: Value = server
            .http
            .post(server.url("/api/bookmarks"))
            .json(&bookmark)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(created["videoId"], "dQw4w9WgXcQ");
        assert_eq!(created["thumbnail"], "");

        let status: Value = server
            .http
            .get(server.url("/api/bookmarks/dQw4w9WgXcQ/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["isBookmarked"], true);

        let listed: Vec<Value> = server
            .http
            .get(server.url("/api/bookmarks"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        for _ in 0..2 {
            let resp = server
                .http
                .delete(server.url("/api/bookmarks/dQw4w9WgXcQ"))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = resp.json().await.unwrap();
            assert_eq!(body["success"], true);
        }

        let status: Value = server
            .http
            .get(server.url("/api/bookmarks/dQw4w9WgXcQ/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["isBookmarked"], false);
    }

    #[tokio::test]
    async fn test_bookmark_requires_title() {
        let server = spawn(TestDeps::default()).await;

        let resp = server
            .http
            .post(server.url("/api/bookmarks"))
            .json(&json!({ "videoId": "dQw4w9WgXcQ", "title": "  " }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "title is required");

        let resp = server
            .http
            .post(server.url("/api/bookmarks"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_study_time_total() {
        let server = spawn(TestDeps::default()).await;

        for minutes in [25, 35] {
            let resp = server
                .http
                .post(server.url("/api/study-sessions"))
                .json(&json!({ "duration": minutes, "subject": "Chemistry" }))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let total: Value = server
            .http
            .get(server.url("/api/study-time/total"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(total["totalTime"], 60);

        let sessions: Vec<Value> = server
            .http
            .get(server.url("/api/study-sessions"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0]["subject"], "Chemistry");
    }
}
