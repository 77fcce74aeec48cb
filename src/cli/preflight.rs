//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and API keys are available before starting
//! operations that would otherwise fail midway.

use crate::config::{LlmEndpointSettings, Settings};
use crate::error::{FocusTubeError, Result};
use crate::transcript::SubprocessFetcher;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Video search requires a YouTube API key.
    Videos,
    /// Transcript analysis and tutoring require the interpreter and an LLM key.
    Transcript,
    /// Transcript search only requires the interpreter.
    TranscriptSearch,
    /// The server starts without keys; missing ones disable features.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub async fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Videos => {
            check_youtube_key(settings)?;
        }
        Operation::Transcript => {
            check_api_key(&settings.transcript.llm)?;
            check_interpreter(settings).await?;
        }
        Operation::TranscriptSearch => {
            check_interpreter(settings).await?;
        }
        Operation::Serve => {
            // Missing keys only disable the matching endpoints.
        }
    }
    Ok(())
}

fn check_youtube_key(settings: &Settings) -> Result<()> {
    match settings.youtube.resolve_api_key() {
        Some(_) => Ok(()),
        None => Err(FocusTubeError::Config(
            "YOUTUBE_API_KEY not set. Set it with: export YOUTUBE_API_KEY='...' \
             (or youtube.api_key in the config file)"
                .to_string(),
        )),
    }
}

/// Check that an LLM endpoint has its API key.
fn check_api_key(endpoint: &LlmEndpointSettings) -> Result<()> {
    match endpoint.api_key() {
        Some(_) => Ok(()),
        None => Err(FocusTubeError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            endpoint.api_key_env, endpoint.api_key_env
        ))),
    }
}

async fn check_interpreter(settings: &Settings) -> Result<()> {
    SubprocessFetcher::from_settings(&settings.transcript)
        .check()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serve_has_no_requirements() {
        assert!(check(Operation::Serve, &Settings::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_llm_key() {
        let mut settings = Settings::default();
        settings.transcript.llm.api_key_env = "FOCUSTUBE_PREFLIGHT_KEY_NEVER_SET".to_string();

        let result = check(Operation::Transcript, &settings).await;
        assert!(
            matches!(result, Err(FocusTubeError::Config(msg)) if msg.contains("FOCUSTUBE_PREFLIGHT_KEY_NEVER_SET"))
        );
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let mut settings = Settings::default();
        settings.transcript.python = "focustube-no-such-python".to_string();

        let result = check(Operation::TranscriptSearch, &settings).await;
        assert!(matches!(result, Err(FocusTubeError::ToolNotFound(_))));
    }
}
