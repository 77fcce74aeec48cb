//! Educational curator: search recommendations, video summaries, quizzes and moderation.

use super::models::{Quiz, QuizQuestion, RecommendationRequest, Recommendations, VideoSummary};
use super::{parse_json_reply, truncate_chars, ChatModel, ChatRequest, OpenAIChat};
use crate::config::{Prompts, Settings};
use crate::error::{FocusTubeError, Result};
use crate::youtube::Video;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Questions generated when the caller does not ask for a count.
pub const DEFAULT_QUIZ_QUESTIONS: usize = 5;
/// Upper bound on generated questions.
pub const MAX_QUIZ_QUESTIONS: usize = 20;

const SUMMARY_DESCRIPTION_CHARS: usize = 800;
const MODERATION_DESCRIPTION_CHARS: usize = 300;

/// LLM-backed curator for educational content.
pub struct Curator {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl Curator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Curator backed by the configured endpoint.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let model = OpenAIChat::new(&settings.curator)?;
        Ok(Self::new(Arc::new(model)).with_prompts(Prompts::from_settings(settings)?))
    }

    /// Suggest search terms for a learning request.
    #[instrument(skip(self, request), fields(query = %request.query))]
    pub async fn recommendations(&self, request: &RecommendationRequest) -> Result<Recommendations> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(FocusTubeError::InvalidInput("Query is required".to_string()));
        }

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        vars.insert(
            "subject".to_string(),
            non_empty(request.subject.as_deref()).unwrap_or("General").to_string(),
        );
        vars.insert(
            "level".to_string(),
            non_empty(request.user_level.as_deref()).unwrap_or("intermediate").to_string(),
        );
        vars.insert(
            "watched_count".to_string(),
            request.previous_videos.as_ref().map_or(0, Vec::len).to_string(),
        );

        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.curator.recommendations, &vars);
        let reply = self.model.complete(ChatRequest::new(prompt)).await?;

        match parse_json_reply::<Recommendations>(&reply) {
            Ok(parsed) if !parsed.recommendations.is_empty() => {
                info!("Generated {} recommendations", parsed.recommendations.len());
                Ok(parsed)
            }
            Ok(_) => {
                warn!("Recommendations reply had no search terms, using fallback");
                Ok(fallback_recommendations(query))
            }
            Err(e) => {
                warn!("Recommendations fallback: {}", e);
                Ok(fallback_recommendations(query))
            }
        }
    }

    /// Write study notes for a video from its metadata.
    #[instrument(skip(self, video), fields(video_id = %video.id))]
    pub async fn video_summary(&self, video: &Video) -> Result<VideoSummary> {
        require_title(video)?;

        let mut vars = video_vars(video, SUMMARY_DESCRIPTION_CHARS);
        vars.insert("duration".to_string(), video.duration.clone());

        let prompt = self.prompts.render_with_custom(&self.prompts.curator.summary, &vars);
        let reply = self.model.complete(ChatRequest::new(prompt)).await?;

        match parse_json_reply::<VideoSummary>(&reply) {
            Ok(summary) if !summary.summary.trim().is_empty() => Ok(summary),
            Ok(_) => {
                warn!("Summary reply was empty, using fallback");
                Ok(fallback_summary(video))
            }
            Err(e) => {
                warn!("Summary fallback: {}", e);
                Ok(fallback_summary(video))
            }
        }
    }

    /// Generate a multiple-choice quiz for a video.
    ///
    /// `question_count` defaults to [`DEFAULT_QUIZ_QUESTIONS`] and is clamped to
    /// `1..=MAX_QUIZ_QUESTIONS`.
    #[instrument(skip(self, video), fields(video_id = %video.id))]
    pub async fn quiz(&self, video: &Video, question_count: Option<usize>) -> Result<Quiz> {
        require_title(video)?;
        let count = question_count
            .unwrap_or(DEFAULT_QUIZ_QUESTIONS)
            .clamp(1, MAX_QUIZ_QUESTIONS);

        let mut vars = video_vars(video, SUMMARY_DESCRIPTION_CHARS);
        vars.insert("question_count".to_string(), count.to_string());

        let prompt = self.prompts.render_with_custom(&self.prompts.curator.quiz, &vars);
        let reply = self.model.complete(ChatRequest::new(prompt)).await?;

        let raw = match parse_json_reply::<RawQuiz>(&reply) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Quiz fallback: {}", e);
                return Ok(fallback_quiz(video));
            }
        };

        let offered = raw.questions.len();
        let questions: Vec<QuizQuestion> = raw
            .questions
            .into_iter()
            .filter_map(|q| serde_json::from_value::<QuizQuestion>(q).ok())
            .filter(QuizQuestion::is_valid)
            .collect();

        if questions.len() < offered {
            debug!("Dropped {} malformed questions", offered - questions.len());
        }
        if questions.is_empty() {
            warn!("Quiz reply had no usable questions, using fallback");
            return Ok(fallback_quiz(video));
        }

        Ok(Quiz {
            questions,
            topic: if raw.topic.trim().is_empty() {
                video.title.clone()
            } else {
                raw.topic
            },
            learning_objectives: raw.learning_objectives,
        })
    }

    /// Decide whether content is educational and appropriate for students.
    #[instrument(skip(self, description))]
    pub async fn moderate(&self, title: &str, description: &str) -> Result<bool> {
        if title.trim().is_empty() || description.trim().is_empty() {
            return Err(FocusTubeError::InvalidInput(
                "Title and description are required".to_string(),
            ));
        }

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), title.to_string());
        vars.insert(
            "description".to_string(),
            truncate_chars(description, MODERATION_DESCRIPTION_CHARS).to_string(),
        );

        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.curator.moderation, &vars);
        let reply = self.model.complete(ChatRequest::new(prompt)).await?;

        Ok(reply.trim().to_lowercase().contains("true"))
    }
}

/// Quiz as replied by the model, before per-question validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawQuiz {
    questions: Vec<serde_json::Value>,
    topic: String,
    learning_objectives: Option<Vec<String>>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn require_title(video: &Video) -> Result<()> {
    if video.title.trim().is_empty() {
        return Err(FocusTubeError::InvalidInput("Video data is required".to_string()));
    }
    Ok(())
}

fn video_vars(video: &Video, description_chars: usize) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("title".to_string(), video.title.clone());
    vars.insert("channel".to_string(), video.channel.clone());
    vars.insert(
        "description".to_string(),
        truncate_chars(&video.description, description_chars).to_string(),
    );
    vars
}

fn fallback_recommendations(query: &str) -> Recommendations {
    Recommendations {
        recommendations: vec![query.to_string()],
        explanation: "AI response could not be parsed, using original query".to_string(),
        suggested_search_terms: vec![format!("{} tutorial", query), format!("{} explained", query)],
    }
}

fn fallback_summary(video: &Video) -> VideoSummary {
    VideoSummary {
        summary: format!(
            "This educational video \"{}\" by {} covers important concepts in its field. \
             It provides structured learning content with explanations and examples \
             that students can apply in practice.",
            video.title, video.channel
        ),
        key_points: [
            "Introduction to core concepts and terminology",
            "Step-by-step explanation of key processes",
            "Practical examples and case studies",
            "Common misconceptions and how to avoid them",
            "Best practices and expert recommendations",
            "Real-world applications and use cases",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        difficulty: "intermediate".to_string(),
        suggested_follow_up: [
            "Advanced topics in the same subject area",
            "Related practical applications",
            "Historical context and development",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        prerequisites: None,
        real_world_applications: None,
    }
}

fn fallback_quiz(video: &Video) -> Quiz {
    let question = |text: String, options: [&str; 4], correct: usize, explanation: &str| QuizQuestion {
        question: text,
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct,
        explanation: explanation.to_string(),
        question_type: None,
        difficulty: None,
    };

    Quiz {
        questions: vec![
            question(
                format!(
                    "Based on the concepts presented in \"{}\", which principle is most fundamental to understanding the topic?",
                    video.title
                ),
                [
                    "The foundational concept that underlies all other principles",
                    "A secondary principle that supports the main idea",
                    "An advanced application that requires prerequisite knowledge",
                    "A common misconception that students often have",
                ],
                0,
                "The foundational concept provides the framework for every related principle and application.",
            ),
            question(
                "How would you apply the knowledge from this video to solve a real-world problem?"
                    .to_string(),
                [
                    "By following the exact steps shown without modification",
                    "By adapting the principles to fit the specific context and constraints",
                    "By memorizing the examples and repeating them exactly",
                    "By ignoring the theoretical aspects and focusing only on practical steps",
                ],
                1,
                "Real-world problems require adapting principles to their context rather than repeating examples.",
            ),
        ],
        topic: video.title.clone(),
        learning_objectives: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedChat;

    fn video() -> Video {
        Video {
            id: "dQw4w9WgXcQ".to_string(),
            title: "Photosynthesis Explained".to_string(),
            description: "x".repeat(2000),
            thumbnail: String::new(),
            channel: "Crash Course".to_string(),
            published_at: String::new(),
            duration: "PT10M".to_string(),
            view_count: "10".to_string(),
        }
    }

    fn curator(chat: &Arc<ScriptedChat>) -> Curator {
        Curator::new(chat.clone() as Arc<dyn ChatModel>)
    }

    #[tokio::test]
    async fn test_recommendations_parsed() {
        let chat = Arc::new(ScriptedChat::replying(
            r#"```json
{"recommendations": ["cell biology basics", "chloroplast structure"],
 "explanation": "Builds the foundations",
 "suggestedSearchTerms": ["plant biology"]}
```"#,
        ));

        let request = RecommendationRequest {
            query: "photosynthesis".to_string(),
            previous_videos: Some(vec!["a".into(), "b".into()]),
            ..Default::default()
        };
        let result = curator(&chat).recommendations(&request).await.unwrap();

        assert_eq!(result.recommendations.len(), 2);
        assert_eq!(result.suggested_search_terms, vec!["plant biology"]);

        let prompt = chat.last_request().user;
        assert!(prompt.contains("\"photosynthesis\""));
        assert!(prompt.contains("Subject: General"));
        assert!(prompt.contains("Learner level: intermediate"));
        assert!(prompt.contains("Videos already watched: 2"));
    }

    #[tokio::test]
    async fn test_recommendations_fallback() {
        let chat = Arc::new(ScriptedChat::replying("Here are some ideas: study more."));
        let request = RecommendationRequest {
            query: "fractions".to_string(),
            ..Default::default()
        };

        let result = curator(&chat).recommendations(&request).await.unwrap();
        assert_eq!(result.recommendations, vec!["fractions"]);
        assert_eq!(
            result.suggested_search_terms,
            vec!["fractions tutorial", "fractions explained"]
        );
    }

    #[tokio::test]
    async fn test_recommendations_require_query() {
        let chat = Arc::new(ScriptedChat::new(vec![]));
        let result = curator(&chat)
            .recommendations(&RecommendationRequest::default())
            .await;

        assert!(matches!(result, Err(FocusTubeError::InvalidInput(_))));
        assert!(chat.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_truncates_description() {
        let chat = Arc::new(ScriptedChat::replying(
            r#"{"summary": "Plants make sugar.", "keyPoints": ["light"], "difficulty": "beginner", "suggestedFollowUp": []}"#,
        ));

        let summary = curator(&chat).video_summary(&video()).await.unwrap();
        assert_eq!(summary.summary, "Plants make sugar.");
        assert_eq!(summary.difficulty, "beginner");
        assert!(summary.prerequisites.is_none());

        let prompt = chat.last_request().user;
        assert!(prompt.contains(&"x".repeat(800)));
        assert!(!prompt.contains(&"x".repeat(801)));
    }

    #[tokio::test]
    async fn test_summary_fallback() {
        let chat = Arc::new(ScriptedChat::replying("not json"));
        let summary = curator(&chat).video_summary(&video()).await.unwrap();

        assert!(summary.summary.contains("Photosynthesis Explained"));
        assert!(summary.summary.contains("Crash Course"));
        assert_eq!(summary.key_points.len(), 6);
        assert_eq!(summary.difficulty, "intermediate");
    }

    #[tokio::test]
    async fn test_quiz_drops_invalid_questions() {
        let chat = Arc::new(ScriptedChat::replying(
            r#"{
  "questions": [
    {"question": "Where does photosynthesis happen?", "options": ["Chloroplast", "Nucleus", "Ribosome", "Wall"], "correctAnswer": 0, "explanation": "Chloroplasts hold chlorophyll."},
    {"question": "Broken index", "options": ["a", "b", "c", "d"], "correctAnswer": 7, "explanation": ""},
    {"question": "Missing answer", "options": ["a", "b"]}
  ],
  "topic": "Photosynthesis"
}"#,
        ));

        let quiz = curator(&chat).quiz(&video(), Some(3)).await.unwrap();
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].correct_answer, 0);
        assert_eq!(quiz.topic, "Photosynthesis");
        assert!(chat.last_request().user.contains("3-question"));
    }

    #[tokio::test]
    async fn test_quiz_count_is_clamped() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Ok("{}".to_string()),
            Ok("{}".to_string()),
            Ok("{}".to_string()),
        ]));
        let curator = curator(&chat);

        curator.quiz(&video(), None).await.unwrap();
        assert!(chat.last_request().user.contains("5-question"));

        curator.quiz(&video(), Some(0)).await.unwrap();
        assert!(chat.last_request().user.contains("1-question"));

        // Nothing usable comes back, so the fallback quiz is returned.
        let quiz = curator.quiz(&video(), Some(500)).await.unwrap();
        assert!(chat.last_request().user.contains("20-question"));
        assert_eq!(quiz.questions.len(), 2);
        assert_eq!(quiz.topic, "Photosynthesis Explained");
    }

    #[tokio::test]
    async fn test_moderate() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Ok("True".to_string()),
            Ok("false".to_string()),
        ]));
        let curator = curator(&chat);

        assert!(curator.moderate("Algebra 101", "Solving equations").await.unwrap());
        assert!(!curator.moderate("Prank compilation", "lol").await.unwrap());

        let result = curator.moderate("Algebra", "  ").await;
        assert!(matches!(result, Err(FocusTubeError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_model_errors_propagate() {
        let chat = Arc::new(ScriptedChat::new(vec![Err(FocusTubeError::OpenAI(
            "401".to_string(),
        ))]));
        let result = curator(&chat).video_summary(&video()).await;
        assert!(matches!(result, Err(FocusTubeError::OpenAI(_))));
    }
}
