//! The retrievable unit stored in the corpus.

use serde::{Deserialize, Serialize};

/// An immutable document identified by a stable, opaque `doc_id`.
///
/// The store never interprets `doc_id` beyond uniqueness; callers may use
/// UUIDs, content hashes, or any other stable identifier scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique, stable identifier.
    pub doc_id: String,
    /// Full searchable text of the document.
    pub body: String,
}

impl Document {
    /// Construct a document from an id and body.
    #[must_use]
    pub fn new(doc_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            body: body.into(),
        }
    }
}
