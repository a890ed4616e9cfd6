//! Semantic (dense-vector) search.

mod embed;
mod search;

pub use embed::{Embedder, SyncStats, sync_embeddings};
pub use search::search_semantic;
