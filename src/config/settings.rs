//! Configuration settings for FocusTube.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub youtube: YoutubeSettings,
    pub curator: LlmEndpointSettings,
    pub transcript: TranscriptSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.focustube".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Username every request acts on behalf of.
    pub demo_user: String,
    /// Allow any origin, method and header.
    pub cors_permissive: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            demo_user: "demo".to_string(),
            cors_permissive: true,
        }
    }
}

/// Storage backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    /// In-process maps, lost on restart.
    #[default]
    Memory,
    /// SQLite database file.
    Sqlite,
}

impl std::str::FromStr for StorageProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageProvider::Memory),
            "sqlite" => Ok(StorageProvider::Sqlite),
            _ => Err(format!("Unknown storage provider: {}", s)),
        }
    }
}

impl std::fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageProvider::Memory => write!(f, "memory"),
            StorageProvider::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Study record storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub provider: StorageProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Memory,
            sqlite_path: "~/.focustube/focustube.db".to_string(),
        }
    }
}

/// An educational channel allowed through channel filters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustedChannel {
    pub id: String,
    pub name: String,
}

impl TrustedChannel {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// YouTube Data API key. `YOUTUBE_API_KEY` in the environment takes precedence.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Page size for searches.
    pub max_results: u32,
    /// Page size for the trending listing.
    pub trending_results: u32,
    pub timeout_seconds: u64,
    /// Appended to every search to bias results towards lessons.
    pub educational_keywords: String,
    /// Queries rotated through for the trending listing.
    pub trending_queries: Vec<String>,
    pub trusted_channels: Vec<TrustedChannel>,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            max_results: 24,
            trending_results: 12,
            timeout_seconds: 30,
            educational_keywords: "tutorial lecture education learning".to_string(),
            trending_queries: [
                "mathematics tutorial",
                "science education",
                "programming tutorial",
                "physics lecture",
                "chemistry basics",
                "history lesson",
            ]
            .iter()
            .map(|q| q.to_string())
            .collect(),
            trusted_channels: vec![
                TrustedChannel::new("UC_x5XG1OV2P6uZZ5FSM9Ttw", "Google Developers"),
                TrustedChannel::new("UCtxCXg-UvSnTKPOzLH4wJaQ", "Khan Academy"),
                TrustedChannel::new("UCEBb1b_L6zDS3xTUrIALZOw", "MIT OpenCourseWare"),
                TrustedChannel::new("UC7cs8q-gJRlGwj4A8OmCmXg", "Unacademy"),
                TrustedChannel::new("UCzvQcsABBjsoaexHiQTbh_A", "Gate Smashers"),
                TrustedChannel::new("UC8butISFwT-Wl7EV0hUK0BQ", "freeCodeCamp"),
                TrustedChannel::new("UCWv7vMbMWH4-V0ZXdmDpPBA", "Programming with Mosh"),
                TrustedChannel::new("UClcE-kVhqyiHCcjYwcpfj9w", "Learncode.academy"),
            ],
        }
    }
}

impl YoutubeSettings {
    /// Resolve the API key, preferring the environment over the config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("YOUTUBE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.is_empty()))
    }
}

/// An OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmEndpointSettings {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Sent as `HTTP-Referer` (OpenRouter attribution).
    pub referer: Option<String>,
    /// Sent as `X-Title` (OpenRouter attribution).
    pub app_title: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for LlmEndpointSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            model: "mistralai/mistral-small-3.2-24b-instruct:free".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            referer: Some("https://focustube.app".to_string()),
            app_title: Some("FocusTube - Educational Video Platform".to_string()),
            timeout_seconds: 120,
        }
    }
}

impl LlmEndpointSettings {
    /// Default endpoint for the OpenAI API.
    pub fn openai(model: &str) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: model.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            referer: None,
            app_title: None,
            timeout_seconds: 120,
        }
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

const DEFAULT_TRANSCRIPT_MODEL: &str = "gpt-4o";

/// Deserialize an endpoint table, taking missing keys from the OpenAI defaults.
fn openai_endpoint<'de, D>(deserializer: D) -> std::result::Result<LlmEndpointSettings, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = toml::Table::deserialize(deserializer)?;
    let mut merged = toml::Table::try_from(LlmEndpointSettings::openai(DEFAULT_TRANSCRIPT_MODEL))
        .map_err(D::Error::custom)?;
    merged.extend(overrides);
    merged.try_into().map_err(D::Error::custom)
}

/// Transcript pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Endpoint used for transcript analysis and Q&A.
    #[serde(deserialize_with = "openai_endpoint")]
    pub llm: LlmEndpointSettings,
    /// Token budget for summary + quiz generation.
    pub analysis_max_tokens: u32,
    /// Token budget for tutor answers.
    pub answer_max_tokens: u32,
    /// Questions requested per analysis.
    pub analysis_questions: usize,
    /// Python interpreter with `youtube_transcript_api` installed.
    pub python: String,
    pub fetch_timeout_seconds: u64,
    /// Transcripts shorter than this are rejected.
    pub min_transcript_chars: usize,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            llm: LlmEndpointSettings::openai(DEFAULT_TRANSCRIPT_MODEL),
            analysis_max_tokens: 4000,
            answer_max_tokens: 1000,
            analysis_questions: 10,
            python: "python3".to_string(),
            fetch_timeout_seconds: 60,
            min_transcript_chars: 50,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::FocusTubeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("focustube")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.storage.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = tokio_test::assert_ok!(Settings::load_from(Some(&dir.path().join("nope.toml"))));
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.storage.provider, StorageProvider::Memory);
        assert_eq!(settings.transcript.min_transcript_chars, 50);
        assert_eq!(settings.youtube.trusted_channels.len(), 8);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 8080

[storage]
provider = "sqlite"

[transcript.llm]
model = "gpt-4o-mini"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.demo_user, "demo");
        assert_eq!(settings.storage.provider, StorageProvider::Sqlite);
        assert_eq!(settings.transcript.llm.model, "gpt-4o-mini");
        assert_eq!(settings.transcript.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(settings.curator.api_key_env, "OPENROUTER_API_KEY");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.youtube.max_results = 10;
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reloaded.youtube.max_results, 10);
    }

    #[test]
    fn test_storage_provider_parse() {
        assert_eq!("SQLite".parse::<StorageProvider>(), Ok(StorageProvider::Sqlite));
        assert_eq!("memory".parse::<StorageProvider>(), Ok(StorageProvider::Memory));
        assert!("postgres".parse::<StorageProvider>().is_err());
    }
}
