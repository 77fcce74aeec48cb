//! LLM access and the educational curator.
//!
//! Everything that talks to a chat-completion endpoint goes through the
//! [`ChatModel`] trait so the curator and transcript pipeline can be driven
//! by scripted models in tests.

mod client;
mod curator;
mod models;

pub use client::OpenAIChat;
pub use curator::{Curator, DEFAULT_QUIZ_QUESTIONS, MAX_QUIZ_QUESTIONS};
pub use models::{
    Quiz, QuizQuestion, RecommendationRequest, Recommendations, VideoSummary,
};

use crate::error::{FocusTubeError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// A single chat completion request.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub user: String,
    /// Overrides the model's default temperature.
    pub temperature: Option<f32>,
    /// Overrides the model's default token budget.
    pub max_tokens: Option<u32>,
    /// Ask the endpoint for a JSON object reply.
    pub json_output: bool,
}

impl ChatRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn json(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion and return the reply text.
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    /// Name of the underlying model.
    fn model_name(&self) -> &str;
}

/// Parse the outermost JSON object in an LLM reply.
///
/// Models wrap JSON in markdown fences or prose often enough that the reply
/// is trimmed to the first `{` and last `}` before deserializing.
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let json_start = reply.find('{');
    let json_end = reply.rfind('}');

    let json_str = match (json_start, json_end) {
        (Some(start), Some(end)) if end > start => &reply[start..=end],
        _ => reply,
    };

    serde_json::from_str(json_str).map_err(|e| {
        FocusTubeError::Ai(format!(
            "Failed to parse model reply: {}. Reply was: {}",
            e,
            truncate_chars(reply, 500)
        ))
    })
}

/// Take at most `max` characters, respecting char boundaries.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Chat model that replays canned replies and records requests.
    pub struct ScriptedChat {
        replies: Mutex<VecDeque<Result<String>>>,
        pub requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedChat {
        pub fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(reply: &str) -> Self {
            Self::new(vec![Ok(reply.to_string())])
        }

        pub fn last_request(&self) -> ChatRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedChat {
        async fn complete(&self, request: ChatRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FocusTubeError::Ai("no scripted reply left".to_string())))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }
}
