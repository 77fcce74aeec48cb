//! Keyword search inside a transcript.

use crate::error::{FocusTubeError, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of hits returned.
pub const MAX_HITS: usize = 5;

/// A matching sentence with one sentence of context on each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub text: String,
    /// Occurrences of the whole query in the matching sentence.
    pub relevance_score: usize,
}

/// Result of a transcript keyword search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSearch {
    pub query: String,
    pub results: Vec<SearchHit>,
    /// Matching sentences before truncation.
    pub total_matches: usize,
}

/// Search a transcript for sentences mentioning any word of `query`.
pub fn search_transcript(query: &str, transcript: &str) -> Result<TranscriptSearch> {
    let query = query.trim();
    if query.is_empty() {
        return Err(FocusTubeError::InvalidInput("Query is required".to_string()));
    }

    let needle = query.to_lowercase();
    let words: Vec<&str> = needle.split_whitespace().collect();
    let sentences: Vec<&str> = transcript.split('.').collect();

    let mut hits: Vec<SearchHit> = Vec::new();
    for (i, sentence) in sentences.iter().enumerate() {
        let lowered = sentence.to_lowercase();
        if !words.iter().any(|word| lowered.contains(word)) {
            continue;
        }

        let start = i.saturating_sub(1);
        let end = (i + 2).min(sentences.len());
        hits.push(SearchHit {
            text: sentences[start..end].join(". ").trim().to_string(),
            relevance_score: lowered.matches(needle.as_str()).count(),
        });
    }

    let total_matches = hits.len();
    // Stable sort keeps transcript order among equal scores.
    hits.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    hits.truncate(MAX_HITS);

    Ok(TranscriptSearch {
        query: query.to_string(),
        results: hits,
        total_matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = "Today we study derivatives. A derivative measures change. \
        Integrals are the reverse. The derivative of x squared is two x. \
        Derivative rules, derivative tables and more. Thanks for watching";

    #[test]
    fn test_scores_and_context() {
        let search = search_transcript("derivative", TRANSCRIPT).unwrap();

        assert_eq!(search.total_matches, 4);
        let top = &search.results[0];
        assert_eq!(top.relevance_score, 2);
        assert_eq!(
            top.text,
            "The derivative of x squared is two x.  Derivative rules, derivative tables and more.  Thanks for watching"
        );
        // Equal scores keep transcript order.
        assert_eq!(search.results[1].text, "Today we study derivatives.  A derivative measures change");
        assert!(search.results.iter().all(|h| h.relevance_score >= 1));
    }

    #[test]
    fn test_any_word_matches_but_scores_whole_query() {
        let search = search_transcript("reverse change", TRANSCRIPT).unwrap();

        assert_eq!(search.total_matches, 2);
        assert!(search.results.iter().all(|h| h.relevance_score == 0));
    }

    #[test]
    fn test_results_are_capped() {
        let transcript = "cell. cell. cell. cell. cell. cell. cell";
        let search = search_transcript("Cell", transcript).unwrap();

        assert_eq!(search.total_matches, 7);
        assert_eq!(search.results.len(), MAX_HITS);
        assert_eq!(search.query, "Cell");
    }

    #[test]
    fn test_no_matches() {
        let search = search_transcript("photosynthesis", TRANSCRIPT).unwrap();
        assert_eq!(search.total_matches, 0);
        assert!(search.results.is_empty());
    }

    #[test]
    fn test_empty_query_rejected() {
        let err = tokio_test::assert_err!(search_transcript("   ", TRANSCRIPT));
        assert!(matches!(err, FocusTubeError::InvalidInput(_)));
    }
}
