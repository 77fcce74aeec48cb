//! Request and response shapes for the curator.

use serde::{Deserialize, Serialize};

/// Input for search recommendations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub query: String,
    pub subject: Option<String>,
    pub user_level: Option<String>,
    /// IDs of videos the learner already watched.
    pub previous_videos: Option<Vec<String>>,
}

/// Search terms suggested by the curator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendations {
    pub recommendations: Vec<String>,
    pub explanation: String,
    pub suggested_search_terms: Vec<String>,
}

/// Study notes for a video, produced from its metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoSummary {
    pub summary: String,
    pub key_points: Vec<String>,
    pub difficulty: String,
    pub suggested_follow_up: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_world_applications: Option<Vec<String>>,
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl QuizQuestion {
    /// A question is usable when it has text, options and an in-range answer.
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() >= 2
            && self.correct_answer < self.options.len()
    }
}

/// A generated quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<Vec<String>>,
}
