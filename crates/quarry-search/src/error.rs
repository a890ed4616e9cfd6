//! Typed failure taxonomy for the search surface.
//!
//! Callers can distinguish "fix your input" (`InvalidQuery`,
//! `InvalidParameters`) from "retry later" (`EmbeddingFailure`,
//! `IndexUnavailable`). An empty result set is a success, never an error.

#![allow(clippy::module_name_repetitions)]

use thiserror::Error;

/// Errors produced by the lexical, semantic, and hybrid entry points.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query text is empty or unusable after normalization.
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// A numeric parameter violates a documented precondition.
    #[error("invalid parameters: {reason}")]
    InvalidParameters { reason: String },

    /// The embedding provider failed or returned a malformed vector.
    /// Semantic and hybrid paths only; callers may retry.
    #[error("embedding failure")]
    EmbeddingFailure {
        #[source]
        source: anyhow::Error,
    },

    /// The underlying index could not be queried. Callers may retry with
    /// backoff; this crate never retries internally.
    #[error("search index unavailable")]
    IndexUnavailable {
        #[source]
        source: anyhow::Error,
    },
}

impl SearchError {
    pub(crate) fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameters(reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            reason: reason.into(),
        }
    }

    pub(crate) fn embedding(source: anyhow::Error) -> Self {
        Self::EmbeddingFailure { source }
    }

    pub(crate) fn index(source: anyhow::Error) -> Self {
        Self::IndexUnavailable { source }
    }
}

/// Result alias used across the search crate.
pub type SearchResult<T> = Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::SearchError;

    #[test]
    fn display_carries_reason() {
        let err = SearchError::invalid_query("empty after trimming");
        assert_eq!(err.to_string(), "invalid query: empty after trimming");

        let err = SearchError::invalid_parameters("top_k must be >= 1");
        assert_eq!(err.to_string(), "invalid parameters: top_k must be >= 1");
    }

    #[test]
    fn source_is_preserved() {
        let err = SearchError::index(anyhow::anyhow!("disk on fire"));
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("disk on fire"));
    }
}
