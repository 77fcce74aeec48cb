//! Configuration module for FocusTube.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{CuratorPrompts, Prompts, TranscriptPrompts};
pub use settings::{
    GeneralSettings, LlmEndpointSettings, PromptSettings, ServerSettings, Settings,
    StorageProvider, StorageSettings, TranscriptSettings, TrustedChannel, YoutubeSettings,
};
