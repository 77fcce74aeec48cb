//! YouTube integration: video identifiers, video metadata and the Data API client.

mod data_api;

pub use data_api::YoutubeClient;
#[cfg(test)]
pub(crate) use data_api::testing;

use crate::error::{FocusTubeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Matches the URL shapes YouTube hands out plus bare 11-character IDs.
static VIDEO_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|embed/|v/)|youtu\.be/)",
        r"([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
        r"|^([A-Za-z0-9_-]{11})$",
    ))
    .expect("video id regex is valid")
});

/// Extract the 11-character video ID from a YouTube URL or bare ID.
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    VIDEO_ID_REGEX
        .captures(input)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            FocusTubeError::InvalidInput(format!("Invalid YouTube URL or video ID: {}", input))
        })
}

/// Watch URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// A video as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub published_at: String,
    /// ISO-8601 duration, e.g. `PT12M3S`.
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default = "default_view_count")]
    pub view_count: String,
}

pub(crate) fn default_duration() -> String {
    "PT0M0S".to_string()
}

pub(crate) fn default_view_count() -> String {
    "0".to_string()
}

/// YouTube's coarse duration buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationFilter {
    /// Under 4 minutes.
    Short,
    /// 4 to 20 minutes.
    Medium,
    /// Over 20 minutes.
    Long,
}

impl DurationFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationFilter::Short => "short",
            DurationFilter::Medium => "medium",
            DurationFilter::Long => "long",
        }
    }
}

impl std::str::FromStr for DurationFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(DurationFilter::Short),
            "medium" => Ok(DurationFilter::Medium),
            "long" => Ok(DurationFilter::Long),
            _ => Err(format!("Unknown duration filter: {}", s)),
        }
    }
}

/// Learner level used to bias searches and recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Beginner => write!(f, "beginner"),
            Level::Intermediate => write!(f, "intermediate"),
            Level::Advanced => write!(f, "advanced"),
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            _ => Err(format!("Unknown level: {}", s)),
        }
    }
}

/// Parameters for an educational video search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoQuery {
    #[serde(default)]
    pub q: String,
    pub subject: Option<String>,
    pub duration: Option<DurationFilter>,
    pub level: Option<Level>,
    /// Restrict to a single channel ID.
    pub channels: Option<String>,
}

impl VideoQuery {
    /// Build the free-text query sent to YouTube.
    pub fn search_text(&self, educational_keywords: &str) -> String {
        let subject = self.subject.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let level = self.level.map(|l| l.to_string());

        [Some(self.q.trim()), subject, level.as_deref(), Some(educational_keywords.trim())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let cases = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=42",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "http://youtube.com/v/dQw4w9WgXcQ",
            "www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123",
            "dQw4w9WgXcQ",
            "  dQw4w9WgXcQ\n",
        ];

        for case in cases {
            assert_eq!(extract_video_id(case).unwrap(), "dQw4w9WgXcQ", "input: {case}");
        }
    }

    #[test]
    fn test_extract_video_id_rejects_invalid() {
        let cases = [
            "",
            "not-a-video-id",
            "dQw4w9WgXc",
            "https://vimeo.com/123456789",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQxyz",
        ];

        for case in cases {
            assert!(
                matches!(extract_video_id(case), Err(FocusTubeError::InvalidInput(_))),
                "input: {case}"
            );
        }
    }

    #[test]
    fn test_search_text() {
        let query = VideoQuery {
            q: " derivatives ".to_string(),
            subject: Some("Mathematics".to_string()),
            level: Some(Level::Beginner),
            ..Default::default()
        };
        assert_eq!(
            query.search_text("tutorial lecture"),
            "derivatives Mathematics beginner tutorial lecture"
        );

        let empty = VideoQuery {
            subject: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(empty.search_text("tutorial"), "tutorial");
    }

    #[test]
    fn test_video_defaults_when_fields_missing() {
        let video: Video = serde_json::from_str(r#"{"id": "abc", "title": "Limits"}"#).unwrap();
        assert_eq!(video.duration, "PT0M0S");
        assert_eq!(video.view_count, "0");
        assert!(video.description.is_empty());
    }
}
