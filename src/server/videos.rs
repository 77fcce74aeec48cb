//! Video search, trending listing and the trusted channel list.

use super::error::{ApiQuery, ApiResult};
use super::SharedState;
use crate::config::TrustedChannel;
use crate::youtube::{Video, VideoQuery};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/videos/search", get(search))
        .route("/api/videos/trending", get(trending))
        .route("/api/channels", get(channels))
}

#[derive(Serialize)]
struct VideosResponse {
    videos: Vec<Video>,
}

async fn search(
    State(state): State<SharedState>,
    ApiQuery(query): ApiQuery<VideoQuery>,
) -> ApiResult<Json<VideosResponse>> {
    let videos = state.youtube.search(&query).await?;
    Ok(Json(VideosResponse { videos }))
}

async fn trending(State(state): State<SharedState>) -> ApiResult<Json<VideosResponse>> {
    let videos = state.youtube.trending(state.next_trending_seed()).await?;
    Ok(Json(VideosResponse { videos }))
}

async fn channels(State(state): State<SharedState>) -> Json<Vec<TrustedChannel>> {
    Json(state.youtube.trusted_channels().to_vec())
}
