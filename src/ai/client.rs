//! `ChatModel` backed by an OpenAI-compatible endpoint.

use super::{ChatModel, ChatRequest};
use crate::config::LlmEndpointSettings;
use crate::error::{FocusTubeError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat completions through `async-openai` (OpenAI, OpenRouter, ...).
pub struct OpenAIChat {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIChat {
    /// Create a chat model for the endpoint; fails when its API key is unset.
    pub fn new(endpoint: &LlmEndpointSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(endpoint)?,
            model: endpoint.model.clone(),
            temperature: endpoint.temperature,
            max_tokens: endpoint.max_tokens,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChat {
    #[instrument(skip(self, request), fields(model = %self.model, json = request.json_output))]
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);

        if let Some(system) = request.system {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| FocusTubeError::Ai(e.to_string()))?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user)
                .build()
                .map_err(|e| FocusTubeError::Ai(e.to_string()))?
                .into(),
        );

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(messages)
            .temperature(request.temperature.unwrap_or(self.temperature));

        set_max_tokens(&mut builder, request.max_tokens.unwrap_or(self.max_tokens));

        if request.json_output {
            builder.response_format(ResponseFormat::JsonObject);
        }

        let chat_request = builder
            .build()
            .map_err(|e| FocusTubeError::Ai(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| FocusTubeError::OpenAI(format!("Chat completion failed: {}", e)))?;

        let reply = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        debug!("Received {} chars from {}", reply.len(), self.model);
        Ok(reply)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// OpenRouter models only understand the classic max_tokens field.
#[allow(deprecated)]
fn set_max_tokens(builder: &mut CreateChatCompletionRequestArgs, max_tokens: u32) {
    builder.max_tokens(max_tokens);
}
