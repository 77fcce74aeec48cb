//! Transcript pipeline: retrieval, cleaning, LLM analysis and keyword search.

mod fetcher;
mod models;
mod pipeline;
mod search;

pub use fetcher::{clean_transcript, SubprocessFetcher, TranscriptFetcher};
pub use models::{ProcessedVideo, TranscriptAnalysis, TranscriptQuestion, TranscriptSummary};
pub use pipeline::{PipelineOptions, TranscriptPipeline};
pub use search::{search_transcript, SearchHit, TranscriptSearch, MAX_HITS};
