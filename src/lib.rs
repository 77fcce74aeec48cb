//! FocusTube - Distraction-free Educational Video Portal
//!
//! Backend for a video portal that only surfaces educational YouTube content and
//! keeps a learner's study records next to it.
//!
//! # Overview
//!
//! FocusTube allows you to:
//! - Search YouTube for educational videos, filtered by subject, length and level
//! - Keep bookmarks, study sessions, notes, tasks, flashcards, goals and a schedule
//! - Get AI recommendations, summaries, quizzes and moderation verdicts
//! - Summarize a video's transcript, ask questions about it and search inside it
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `youtube` - YouTube Data API client and search shaping
//! - `store` - Study records storage (in-memory or SQLite)
//! - `ai` - Curator: recommendations, summaries, quizzes, moderation
//! - `transcript` - Transcript fetching, analysis, tutoring and keyword search
//! - `server` - HTTP API
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use focustube::config::Settings;
//! use focustube::server::{self, AppState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let state = AppState::from_settings(&settings).await?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     server::serve(listener, Arc::new(state), true).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod server;
pub mod store;
pub mod transcript;
pub mod youtube;

pub use error::{FocusTubeError, Result};
