//! Transcript pipeline data types.
//!
//! These keep snake_case field names on the wire.

use serde::{Deserialize, Serialize};

/// Study notes derived from a transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSummary {
    pub main_points: Vec<String>,
    pub key_concepts: Vec<String>,
    pub prerequisites: Vec<String>,
    pub applications: Vec<String>,
    pub detailed_explanation: String,
    pub follow_up_topics: Vec<String>,
}

/// A multiple-choice comprehension question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
    /// Beginner, Intermediate or Advanced.
    #[serde(default)]
    pub difficulty: String,
    /// conceptual, application, analysis or synthesis.
    #[serde(rename = "type", default)]
    pub question_type: String,
}

impl TranscriptQuestion {
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty() && self.correct_answer < self.options.len()
    }
}

/// Summary and questions for one transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptAnalysis {
    pub summary: TranscriptSummary,
    pub questions: Vec<TranscriptQuestion>,
}

/// Result of running the whole pipeline on a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedVideo {
    pub success: bool,
    pub video_id: String,
    pub transcript: String,
    pub summary: TranscriptSummary,
    pub questions: Vec<TranscriptQuestion>,
    /// Transcript length in characters.
    pub transcript_length: usize,
}
