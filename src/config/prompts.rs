//! Prompt templates for FocusTube.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub curator: CuratorPrompts,
    pub transcript: TranscriptPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the video curator (recommendations, summaries, quizzes, moderation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorPrompts {
    pub recommendations: String,
    pub summary: String,
    pub quiz: String,
    pub moderation: String,
}

impl Default for CuratorPrompts {
    fn default() -> Self {
        Self {
            recommendations: r#"You curate educational videos for FocusTube, a distraction-free learning platform.
Suggest YouTube searches that will surface high-quality lessons for this request: "{{query}}"

Context:
- Subject: {{subject}}
- Learner level: {{level}}
- Videos already watched: {{watched_count}}

Prefer material from established educators (Khan Academy, Crash Course, MIT OpenCourseWare and similar).

Respond with a JSON object only:
{
  "recommendations": ["3 to 5 focused search terms"],
  "explanation": "one or two sentences on why these fit",
  "suggestedSearchTerms": ["2 or 3 broader alternatives"]
}"#
            .to_string(),

            summary: r#"You write study notes for students. Summarize this educational video from its metadata.

Title: {{title}}
Channel: {{channel}}
Duration: {{duration}}
Description:
{{description}}

Cover what the video teaches, the key concepts, and what a student should take away.

Respond with a JSON object only:
{
  "summary": "several paragraphs of study notes",
  "keyPoints": ["8 to 12 specific learning points"],
  "difficulty": "beginner|intermediate|advanced",
  "suggestedFollowUp": ["5 to 7 follow-up topics"],
  "prerequisites": ["what to know beforehand"],
  "realWorldApplications": ["where the ideas are used"]
}"#
            .to_string(),

            quiz: r#"Write a {{question_count}}-question multiple-choice quiz for this educational video.

Title: {{title}}
Channel: {{channel}}
Description:
{{description}}

Mix conceptual, application, analysis and synthesis questions. Every question has exactly 4 plausible options.
"correctAnswer" is the zero-based index of the right option. Explanations say why the answer is right and the others are not.

Respond with a JSON object only:
{
  "questions": [
    {
      "question": "...",
      "options": ["A", "B", "C", "D"],
      "correctAnswer": 0,
      "explanation": "...",
      "questionType": "conceptual|application|analysis|synthesis",
      "difficulty": "easy|medium|hard"
    }
  ],
  "topic": "the specific topic of the video",
  "learningObjectives": ["..."]
}"#
            .to_string(),

            moderation: r#"Decide whether this video belongs on a learning platform for students.

Title: {{title}}
Description:
{{description}}

It belongs if it is educational, focused on teaching or learning, and appropriate for students.
Answer with the single word "true" or "false"."#
                .to_string(),
        }
    }
}

/// Prompts for transcript analysis and tutoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptPrompts {
    pub analysis_system: String,
    pub analysis: String,
    pub tutor_system: String,
    pub tutor: String,
}

impl Default for TranscriptPrompts {
    fn default() -> Self {
        Self {
            analysis_system: "You are an expert educational content creator. Build accurate study material from video transcripts. Always respond with valid JSON.".to_string(),

            analysis: r#"Analyze this YouTube video transcript.

Video Title: {{title}}

Transcript:
{{transcript}}

Produce:
1. A thorough summary: main points, key concepts, prerequisites, real-world applications, a detailed explanation of at least 300 words, and follow-up topics.
2. {{question_count}} multiple-choice questions spread across conceptual, application, analysis and synthesis levels, each with 4 options, the zero-based index of the correct option, a short explanation, a difficulty (Beginner/Intermediate/Advanced) and a type.

Respond with a JSON object:
{
  "summary": {
    "main_points": ["..."],
    "key_concepts": ["..."],
    "prerequisites": ["..."],
    "applications": ["..."],
    "detailed_explanation": "...",
    "follow_up_topics": ["..."]
  },
  "questions": [
    {
      "question": "...",
      "options": ["A. ...", "B. ...", "C. ...", "D. ..."],
      "correct_answer": 0,
      "explanation": "...",
      "difficulty": "Beginner",
      "type": "conceptual"
    }
  ]
}"#
            .to_string(),

            tutor_system: "You are a helpful AI tutor. Give clear, educational answers grounded in the video content.".to_string(),

            tutor: r#"A student is studying a YouTube video and has a question.

Video Title: {{title}}
Student Question: {{question}}

Video Transcript:
{{transcript}}

Answer directly, point to the relevant part of the video, add explanation where it helps, and mention related concepts worth knowing.
If the transcript does not answer the question, say so and suggest what information would be needed."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let curator_path = custom_path.join("curator.toml");
            if curator_path.exists() {
                let content = std::fs::read_to_string(&curator_path)?;
                prompts.curator = toml::from_str(&content)?;
            }

            let transcript_path = custom_path.join("transcript.toml");
            if transcript_path.exists() {
                let content = std::fs::read_to_string(&transcript_path)?;
                prompts.transcript = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Load prompts as configured in `settings.prompts`.
    pub fn from_settings(settings: &super::Settings) -> crate::error::Result<Self> {
        Self::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.curator.recommendations.contains("{{query}}"));
        assert!(prompts.transcript.analysis.contains("{{transcript}}"));
        assert!(prompts.transcript.tutor.contains("{{question}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("school".to_string(), "Springfield".to_string());
        prompts.variables.insert("title".to_string(), "ignored".to_string());

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), "Fractions".to_string());

        let result = prompts.render_with_custom("{{title}} at {{school}}", &vars);
        assert_eq!(result, "Fractions at Springfield");
    }

    #[test]
    fn test_load_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("curator.toml"),
            "moderation = \"Is {{title}} educational?\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.curator.moderation, "Is {{title}} educational?");
        // Fields missing from the override file keep their defaults.
        assert!(prompts.curator.quiz.contains("{{question_count}}"));
        assert_eq!(
            prompts.transcript.tutor_system,
            TranscriptPrompts::default().tutor_system
        );
    }
}
