//! Transcript pipeline: fetch, analyze and answer questions about a video.

use super::models::{ProcessedVideo, TranscriptAnalysis, TranscriptQuestion, TranscriptSummary};
use super::{SubprocessFetcher, TranscriptFetcher};
use crate::ai::{parse_json_reply, truncate_chars, ChatModel, ChatRequest, OpenAIChat};
use crate::config::{Prompts, Settings, TranscriptSettings};
use crate::error::{FocusTubeError, Result};
use crate::youtube::extract_video_id;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const FALLBACK_EXCERPT_CHARS: usize = 300;

/// Limits applied by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub analysis_max_tokens: u32,
    pub answer_max_tokens: u32,
    pub analysis_questions: usize,
    pub min_transcript_chars: usize,
}

impl From<&TranscriptSettings> for PipelineOptions {
    fn from(settings: &TranscriptSettings) -> Self {
        Self {
            analysis_max_tokens: settings.analysis_max_tokens,
            answer_max_tokens: settings.answer_max_tokens,
            analysis_questions: settings.analysis_questions,
            min_transcript_chars: settings.min_transcript_chars,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&TranscriptSettings::default())
    }
}

/// Turns a video URL into study material.
pub struct TranscriptPipeline {
    fetcher: Arc<dyn TranscriptFetcher>,
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
    options: PipelineOptions,
}

impl TranscriptPipeline {
    pub fn new(
        fetcher: Arc<dyn TranscriptFetcher>,
        model: Arc<dyn ChatModel>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            fetcher,
            model,
            prompts: Prompts::default(),
            options,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Build the configured pipeline: subprocess fetcher plus the transcript LLM endpoint.
    ///
    /// Fails with a configuration error when the endpoint's API key is not set.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let model = OpenAIChat::new(&settings.transcript.llm)?;
        let fetcher = SubprocessFetcher::from_settings(&settings.transcript);

        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(model),
            PipelineOptions::from(&settings.transcript),
        )
        .with_prompts(Prompts::from_settings(settings)?))
    }

    /// Fetch just the transcript of a video URL or ID.
    pub async fn transcript(&self, video_url: &str) -> Result<(String, String)> {
        let video_id = extract_video_id(video_url)?;
        let transcript = self.fetcher.fetch(&video_id).await?;

        if transcript.chars().count() < self.options.min_transcript_chars {
            return Err(FocusTubeError::InvalidInput(
                "Transcript too short or unavailable".to_string(),
            ));
        }

        Ok((video_id, transcript))
    }

    /// Run the full pipeline on a video.
    #[instrument(skip(self))]
    pub async fn process(&self, video_url: &str, video_title: Option<&str>) -> Result<ProcessedVideo> {
        let (video_id, transcript) = self.transcript(video_url).await?;
        let transcript_length = transcript.chars().count();
        info!("Transcript for {} has {} chars", video_id, transcript_length);

        let analysis = self
            .analyze(&transcript, video_title.unwrap_or_default())
            .await?;

        Ok(ProcessedVideo {
            success: true,
            video_id,
            transcript,
            summary: analysis.summary,
            questions: analysis.questions,
            transcript_length,
        })
    }

    /// Summarize a transcript and write comprehension questions.
    #[instrument(skip(self, transcript), fields(chars = transcript.len()))]
    pub async fn analyze(&self, transcript: &str, video_title: &str) -> Result<TranscriptAnalysis> {
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), video_title.to_string());
        vars.insert("transcript".to_string(), transcript.to_string());
        vars.insert(
            "question_count".to_string(),
            self.options.analysis_questions.to_string(),
        );

        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.transcript.analysis, &vars);
        let request = ChatRequest::new(prompt)
            .with_system(self.prompts.transcript.analysis_system.clone())
            .with_max_tokens(self.options.analysis_max_tokens)
            .json();

        let reply = self.model.complete(request).await?;

        let raw = match parse_json_reply::<RawAnalysis>(&reply) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Transcript analysis fallback: {}", e);
                return Ok(fallback_analysis(transcript, video_title));
            }
        };

        let offered = raw.questions.len();
        let questions: Vec<TranscriptQuestion> = raw
            .questions
            .into_iter()
            .filter_map(|q| serde_json::from_value::<TranscriptQuestion>(q).ok())
            .filter(TranscriptQuestion::is_valid)
            .collect();
        debug!("Kept {} of {} questions", questions.len(), offered);

        Ok(TranscriptAnalysis {
            summary: raw.summary,
            questions,
        })
    }

    /// Answer a student's question from the transcript.
    #[instrument(skip(self, transcript))]
    pub async fn answer(&self, question: &str, transcript: &str, video_title: &str) -> Result<String> {
        if question.trim().is_empty() || transcript.trim().is_empty() {
            return Err(FocusTubeError::InvalidInput(
                "question and transcript are required".to_string(),
            ));
        }

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), video_title.to_string());
        vars.insert("question".to_string(), question.trim().to_string());
        vars.insert("transcript".to_string(), transcript.to_string());

        let prompt = self.prompts.render_with_custom(&self.prompts.transcript.tutor, &vars);
        let request = ChatRequest::new(prompt)
            .with_system(self.prompts.transcript.tutor_system.clone())
            .with_max_tokens(self.options.answer_max_tokens);

        let answer = self.model.complete(request).await?;
        if answer.trim().is_empty() {
            return Err(FocusTubeError::Ai(
                "No response content received from the model".to_string(),
            ));
        }

        Ok(answer)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    summary: TranscriptSummary,
    questions: Vec<serde_json::Value>,
}

/// Minimal study material used when the model reply cannot be parsed.
fn fallback_analysis(transcript: &str, video_title: &str) -> TranscriptAnalysis {
    let title = if video_title.trim().is_empty() {
        "this video"
    } else {
        video_title.trim()
    };
    let excerpt = truncate_chars(transcript, FALLBACK_EXCERPT_CHARS);

    TranscriptAnalysis {
        summary: TranscriptSummary {
            main_points: vec![format!("Overview of {}", title)],
            key_concepts: Vec::new(),
            prerequisites: Vec::new(),
            applications: Vec::new(),
            detailed_explanation: format!(
                "An automated analysis of {} could not be produced. The video opens with: {}...",
                title, excerpt
            ),
            follow_up_topics: vec![format!("Rewatch {} and take notes", title)],
        },
        questions: vec![TranscriptQuestion {
            question: format!("What is the main topic of {}?", title),
            options: vec![
                "The subject introduced at the start of the video".to_string(),
                "An unrelated topic".to_string(),
                "A product advertisement".to_string(),
                "None of the above".to_string(),
            ],
            correct_answer: 0,
            explanation: "The opening of the transcript introduces the main topic.".to_string(),
            difficulty: "Beginner".to_string(),
            question_type: "conceptual".to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedChat;
    use async_trait::async_trait;

    const TRANSCRIPT: &str = "Welcome to this lesson on photosynthesis. Plants convert light into chemical energy. Chlorophyll absorbs light.";

    struct StaticFetcher(Result<String>);

    #[async_trait]
    impl TranscriptFetcher for StaticFetcher {
        async fn fetch(&self, video_id: &str) -> Result<String> {
            assert_eq!(video_id, "dQw4w9WgXcQ");
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(FocusTubeError::TranscriptUnavailable(e.to_string())),
            }
        }
    }

    fn pipeline(fetched: Result<String>, chat: &Arc<ScriptedChat>) -> TranscriptPipeline {
        TranscriptPipeline::new(
            Arc::new(StaticFetcher(fetched)),
            chat.clone() as Arc<dyn ChatModel>,
            PipelineOptions::default(),
        )
    }

    const ANALYSIS_REPLY: &str = r#"{
  "summary": {
    "main_points": ["Plants make sugar from light"],
    "key_concepts": ["chlorophyll"],
    "prerequisites": [],
    "applications": ["agriculture"],
    "detailed_explanation": "Photosynthesis turns light into chemical energy.",
    "follow_up_topics": ["cellular respiration"]
  },
  "questions": [
    {"question": "What absorbs light?", "options": ["A. Chlorophyll", "B. Water", "C. Soil", "D. Air"], "correct_answer": 0, "explanation": "Chlorophyll is the pigment.", "difficulty": "Beginner", "type": "conceptual"},
    {"question": "Out of range", "options": ["A", "B"], "correct_answer": 4, "explanation": "", "difficulty": "Beginner", "type": "conceptual"}
  ]
}"#;

    #[tokio::test]
    async fn test_process() {
        let chat = Arc::new(ScriptedChat::replying(ANALYSIS_REPLY));
        let pipeline = pipeline(Ok(TRANSCRIPT.to_string()), &chat);

        let processed = pipeline
            .process("https://youtu.be/dQw4w9WgXcQ", Some("Photosynthesis"))
            .await
            .unwrap();

        assert!(processed.success);
        assert_eq!(processed.video_id, "dQw4w9WgXcQ");
        assert_eq!(processed.transcript_length, TRANSCRIPT.len());
        assert_eq!(processed.summary.key_concepts, vec!["chlorophyll"]);
        assert_eq!(processed.questions.len(), 1);
        assert_eq!(processed.questions[0].question_type, "conceptual");

        let request = chat.last_request();
        assert!(request.json_output);
        assert_eq!(request.max_tokens, Some(4000));
        assert!(request.system.is_some());
        assert!(request.user.contains("Video Title: Photosynthesis"));
        assert!(request.user.contains("Chlorophyll absorbs light."));
    }

    #[tokio::test]
    async fn test_process_rejects_short_transcript() {
        let chat = Arc::new(ScriptedChat::new(vec![]));
        let pipeline = pipeline(Ok("too short".to_string()), &chat);

        let result = pipeline.process("dQw4w9WgXcQ", None).await;
        assert!(matches!(result, Err(FocusTubeError::InvalidInput(msg)) if msg.contains("too short")));
        assert!(chat.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_rejects_annotation_only_transcript() {
        let chat = Arc::new(ScriptedChat::new(vec![]));
        // What the fetcher yields once "[Music]" style fragments are stripped.
        let pipeline = pipeline(Ok(String::new()), &chat);

        let err = pipeline.process("dQw4w9WgXcQ", None).await.unwrap_err();
        assert!(matches!(&err, FocusTubeError::InvalidInput(msg) if msg.contains("too short")));
        assert_eq!(
            crate::server::ApiError::from(err).status(),
            axum::http::StatusCode::BAD_REQUEST
        );
        assert!(chat.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_rejects_bad_url() {
        let chat = Arc::new(ScriptedChat::new(vec![]));
        let pipeline = pipeline(Ok(TRANSCRIPT.to_string()), &chat);

        let result = pipeline.process("https://vimeo.com/1234", None).await;
        assert!(matches!(result, Err(FocusTubeError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let chat = Arc::new(ScriptedChat::new(vec![]));
        let pipeline = pipeline(
            Err(FocusTubeError::TranscriptUnavailable("disabled".to_string())),
            &chat,
        );

        let result = pipeline.process("dQw4w9WgXcQ", None).await;
        assert!(matches!(result, Err(FocusTubeError::TranscriptUnavailable(_))));
    }

    #[tokio::test]
    async fn test_analysis_fallback() {
        let chat = Arc::new(ScriptedChat::replying("I'm sorry, I can't produce JSON today."));
        let pipeline = pipeline(Ok(TRANSCRIPT.to_string()), &chat);

        let analysis = pipeline.analyze(TRANSCRIPT, "Photosynthesis").await.unwrap();
        assert_eq!(analysis.summary.main_points, vec!["Overview of Photosynthesis"]);
        assert!(analysis
            .summary
            .detailed_explanation
            .contains("Welcome to this lesson"));
        assert_eq!(analysis.questions.len(), 1);
        assert!(analysis.questions[0].is_valid());
    }

    #[tokio::test]
    async fn test_answer() {
        let chat = Arc::new(ScriptedChat::replying("Chlorophyll absorbs the light."));
        let pipeline = pipeline(Ok(TRANSCRIPT.to_string()), &chat);

        let answer = pipeline
            .answer("What absorbs light?", TRANSCRIPT, "Photosynthesis")
            .await
            .unwrap();
        assert_eq!(answer, "Chlorophyll absorbs the light.");

        let request = chat.last_request();
        assert!(!request.json_output);
        assert_eq!(request.max_tokens, Some(1000));
        assert!(request.user.contains("Student Question: What absorbs light?"));
    }

    #[tokio::test]
    async fn test_answer_requires_inputs() {
        let chat = Arc::new(ScriptedChat::new(vec![]));
        let pipeline = pipeline(Ok(TRANSCRIPT.to_string()), &chat);

        let result = pipeline.answer(" ", TRANSCRIPT, "").await;
        assert!(matches!(result, Err(FocusTubeError::InvalidInput(_))));
        let result = pipeline.answer("Why?", "", "").await;
        assert!(matches!(result, Err(FocusTubeError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_empty_answer_is_error() {
        let chat = Arc::new(ScriptedChat::replying("   "));
        let pipeline = pipeline(Ok(TRANSCRIPT.to_string()), &chat);

        let result = pipeline.answer("Why?", TRANSCRIPT, "").await;
        assert!(matches!(result, Err(FocusTubeError::Ai(_))));
    }
}
