//! Transcript retrieval through the `youtube_transcript_api` Python package.

use crate::config::TranscriptSettings;
use crate::error::{FocusTubeError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Prints the caption fragments of `argv[1]` as a JSON array of strings.
///
/// Tries the default transcript first, then an explicit English one. Works with
/// both the classic static API and the 1.x instance API of the package.
const FETCH_SCRIPT: &str = r#"
import json
import sys
from youtube_transcript_api import YouTubeTranscriptApi

video_id = sys.argv[1]

def fetch(**kwargs):
    if hasattr(YouTubeTranscriptApi, "get_transcript"):
        return [e["text"] for e in YouTubeTranscriptApi.get_transcript(video_id, **kwargs)]
    return [s.text for s in YouTubeTranscriptApi().fetch(video_id, **kwargs)]

try:
    fragments = fetch()
except Exception:
    try:
        fragments = fetch(languages=["en"])
    except Exception as e:
        print(f"Could not fetch transcript: {e}", file=sys.stderr)
        sys.exit(1)

print(json.dumps(fragments))
"#;

static ANNOTATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[.*?\]").expect("annotation regex is valid"));

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch the cleaned transcript text of a video.
    async fn fetch(&self, video_id: &str) -> Result<String>;
}

/// Fetches transcripts by running a Python interpreter.
pub struct SubprocessFetcher {
    python: String,
    timeout: Duration,
}

impl SubprocessFetcher {
    pub fn new(python: impl Into<String>, timeout: Duration) -> Self {
        Self {
            python: python.into(),
            timeout,
        }
    }

    /// Fetcher using the configured interpreter and timeout.
    pub fn from_settings(settings: &TranscriptSettings) -> Self {
        Self::new(
            settings.python.clone(),
            Duration::from_secs(settings.fetch_timeout_seconds),
        )
    }

    /// Check that the interpreter runs and can import the transcript package.
    pub async fn check(&self) -> Result<()> {
        let output = self
            .run(&["-c", "import youtube_transcript_api"])
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(FocusTubeError::ToolFailed(format!(
                "{} cannot import youtube_transcript_api (pip install youtube-transcript-api)",
                self.python
            )))
        }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        let child = Command::new(&self.python)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FocusTubeError::ToolNotFound(self.python.clone()))
            }
            Ok(Err(e)) => Err(FocusTubeError::ToolFailed(format!(
                "{} execution failed: {e}",
                self.python
            ))),
            Err(_) => Err(FocusTubeError::ToolFailed(format!(
                "{} timed out after {}s",
                self.python,
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl TranscriptFetcher for SubprocessFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<String> {
        info!("Fetching transcript");
        let output = self.run(&["-c", FETCH_SCRIPT, video_id]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => "Failed to fetch transcript".to_string(),
                s => s.to_string(),
            };
            return Err(FocusTubeError::TranscriptUnavailable(message));
        }

        let fragments: Vec<String> = serde_json::from_slice(&output.stdout).map_err(|e| {
            FocusTubeError::TranscriptUnavailable(format!("Unexpected fetcher output: {e}"))
        })?;
        debug!("Received {} caption fragments", fragments.len());

        // An annotation-only transcript cleans to "" and is left to the length check.
        Ok(clean_transcript(&fragments[..]))
    }
}

/// Join caption fragments, drop bracketed annotations and normalise whitespace.
pub fn clean_transcript<S: AsRef<str>>(fragments: &[S]) -> String {
    let joined = fragments
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<&str>>()
        .join(" ");

    ANNOTATION_REGEX
        .replace_all(&joined, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_transcript() {
        let fragments = [
            "[Music]",
            "welcome back  everyone",
            "today\nwe cover [Applause] limits",
            "",
        ];
        assert_eq!(
            clean_transcript(&fragments[..]),
            "welcome back everyone today we cover limits"
        );
    }

    #[test]
    fn test_clean_transcript_empty() {
        let fragments: [&str; 2] = ["[Music]", "  "];
        assert_eq!(clean_transcript(&fragments[..]), "");
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let fetcher = SubprocessFetcher::new(
            "focustube-no-such-python-interpreter",
            Duration::from_secs(5),
        );
        let result = fetcher.fetch("dQw4w9WgXcQ").await;
        assert!(matches!(result, Err(FocusTubeError::ToolNotFound(_))));
    }

    // `sh` stands in for a broken interpreter: it rejects the Python source.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_tool_is_unavailable() {
        let fetcher = SubprocessFetcher::new("sh", Duration::from_secs(5));
        let result = fetcher.fetch("dQw4w9WgXcQ").await;
        assert!(matches!(
            result,
            Err(FocusTubeError::TranscriptUnavailable(msg)) if !msg.is_empty()
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_annotation_only_transcript_is_empty() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-python");
        std::fs::write(&script, "#!/bin/sh\necho '[\"[Music]\", \"[Applause]\"]'\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let fetcher = SubprocessFetcher::new(script.to_string_lossy(), Duration::from_secs(5));
        assert_eq!(fetcher.fetch("dQw4w9WgXcQ").await.unwrap(), "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_check_without_package() {
        let fetcher = SubprocessFetcher::new("sh", Duration::from_secs(5));
        assert!(matches!(fetcher.check().await, Err(FocusTubeError::ToolFailed(_))));
    }
}
