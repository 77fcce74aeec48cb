//! HTTP JSON API.
//!
//! Every request acts on behalf of the configured demo user. AI and transcript
//! routes answer 503 when their API key is missing; the rest of the API keeps
//! working.

mod ai;
mod error;
mod library;
mod study;
mod transcript;
mod videos;

pub use error::{ApiError, ApiResult};

use crate::ai::Curator;
use crate::config::Settings;
use crate::error::{FocusTubeError, Result};
use crate::store::{self, Storage};
use crate::transcript::TranscriptPipeline;
use crate::youtube::YoutubeClient;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    store: Arc<dyn Storage>,
    user_id: i64,
    youtube: YoutubeClient,
    curator: Option<Curator>,
    pipeline: Option<TranscriptPipeline>,
    trending_calls: AtomicUsize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Storage>,
        user_id: i64,
        youtube: YoutubeClient,
        curator: Option<Curator>,
        pipeline: Option<TranscriptPipeline>,
    ) -> Self {
        Self {
            store,
            user_id,
            youtube,
            curator,
            pipeline,
            trending_calls: AtomicUsize::new(0),
        }
    }

    /// Build everything the server needs from configuration.
    ///
    /// Missing LLM keys leave the matching component disabled.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let store = store::open(settings)?;
        let user = store::ensure_user(store.as_ref(), &settings.server.demo_user).await?;
        let youtube = YoutubeClient::new(&settings.youtube)?;

        let curator = match Curator::from_settings(settings) {
            Ok(curator) => Some(curator),
            Err(FocusTubeError::Config(msg)) => {
                warn!("AI curator disabled: {}", msg);
                None
            }
            Err(e) => return Err(e),
        };

        let pipeline = match TranscriptPipeline::from_settings(settings) {
            Ok(pipeline) => Some(pipeline),
            Err(FocusTubeError::Config(msg)) => {
                warn!("Transcript analysis disabled: {}", msg);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self::new(store, user.id, youtube, curator, pipeline))
    }

    fn curator(&self) -> Result<&Curator> {
        self.curator.as_ref().ok_or_else(|| {
            FocusTubeError::Config("AI curator is not configured: API key not set".to_string())
        })
    }

    fn pipeline(&self) -> Result<&TranscriptPipeline> {
        self.pipeline.as_ref().ok_or_else(|| {
            FocusTubeError::Config(
                "Transcript analysis is not configured: API key not set".to_string(),
            )
        })
    }

    /// Rotates through the trending queries across calls.
    fn next_trending_seed(&self) -> usize {
        self.trending_calls.fetch_add(1, Ordering::Relaxed)
    }
}

type SharedState = Arc<AppState>;

/// Build the API router.
pub fn router(state: SharedState, cors_permissive: bool) -> Router {
    let router = Router::new()
        .route("/api/health", get(health))
        .merge(videos::routes())
        .merge(library::routes())
        .merge(study::routes())
        .merge(ai::routes())
        .merge(transcript::routes())
        .layer(TraceLayer::new_for_http());

    let router = if cors_permissive {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}

/// Serve the API on an already bound listener until the process stops.
pub async fn serve(listener: TcpListener, state: SharedState, cors_permissive: bool) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("FocusTube API listening on http://{}", addr);
    axum::serve(listener, router(state, cors_permissive)).await?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    youtube_configured: bool,
    curator_configured: bool,
    transcript_configured: bool,
    storage: &'static str,
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "focustube",
        youtube_configured: state.youtube.is_configured(),
        curator_configured: state.curator.is_some(),
        transcript_configured: state.pipeline.is_some(),
        storage: state.store.name(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::ai::testing::ScriptedChat;
    use crate::ai::ChatModel;
    use crate::config::YoutubeSettings;
    use crate::store::{MemoryStore, DEMO_USERNAME};
    use crate::transcript::{PipelineOptions, TranscriptFetcher};
    use crate::youtube::testing::unconfigured_client;

    /// A running server and a client pointed at it.
    pub struct TestServer {
        pub base: String,
        pub http: reqwest::Client,
    }

    impl TestServer {
        pub fn url(&self, path: &str) -> String {
            format!("{}{}", self.base, path)
        }
    }

    /// Optional AI pieces for a test server.
    #[derive(Default)]
    pub struct TestDeps {
        pub youtube: Option<YoutubeSettings>,
        pub curator: Option<Arc<dyn ChatModel>>,
        pub pipeline: Option<(Arc<dyn TranscriptFetcher>, Arc<dyn ChatModel>)>,
    }

    pub async fn spawn(deps: TestDeps) -> TestServer {
        let store: Arc<dyn Storage> = Arc::new(MemoryStore::new());
        let user = store.get_user_by_username(DEMO_USERNAME).await.unwrap().unwrap();

        let youtube = match deps.youtube {
            Some(settings) => YoutubeClient::new(&settings).unwrap(),
            None => unconfigured_client(),
        };

        let curator = deps.curator.map(Curator::new);
        let pipeline = deps.pipeline.map(|(fetcher, model)| {
            TranscriptPipeline::new(fetcher, model, PipelineOptions::default())
        });

        let state = Arc::new(AppState::new(store, user.id, youtube, curator, pipeline));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(serve(listener, state, true));

        TestServer {
            base,
            http: reqwest::Client::new(),
        }
    }

    pub fn scripted(replies: &[&str]) -> Arc<dyn ChatModel> {
        Arc::new(ScriptedChat::new(
            replies.iter().map(|r| Ok(r.to_string())).collect(),
        ))
    }
}
