#![forbid(unsafe_code)]
//! quarry-search library.
//!
//! Retrieval over a quarry document store with three query modes:
//!
//! - **lexical**: FTS5 BM25 relevance ([`Retriever::bm25`])
//! - **semantic**: dense-vector cosine similarity ([`Retriever::semantic`])
//! - **hybrid**: both, fused with Reciprocal Rank Fusion
//!   ([`Retriever::hybrid_rrf`])
//!
//! The [`Retriever`] owns the database connection, the embedding provider,
//! and the search configuration; nothing is looked up through globals.
//!
//! # Conventions
//!
//! - **Errors**: the public search surface returns [`SearchError`];
//!   store-side plumbing uses `anyhow::Result`.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`,
//!   `trace!`); no subscriber is installed here.

pub mod config;
pub mod error;
pub mod format;
pub mod fusion;
pub mod lexical;
pub mod rank;
pub mod semantic;

pub use config::{SearchConfig, load_config};
pub use error::{SearchError, SearchResult};
pub use format::{OutputFormat, render_fused, render_ranked};
pub use fusion::{DEFAULT_RRF_K, FusedHit, rrf_fuse};
pub use rank::{RankedHit, RankedList, SearchMethod};
pub use semantic::{Embedder, SyncStats};

use anyhow::Result;
use quarry_store::Document;
use quarry_store::db::{ingest, open_in_memory, open_store};
use rusqlite::Connection;
use std::path::Path;
use tracing::warn;

/// Handle over a document store plus an embedding provider.
///
/// Constructed once at startup and passed around explicitly; dropping it
/// closes the underlying connection.
pub struct Retriever<E> {
    conn: Connection,
    embedder: E,
    config: SearchConfig,
}

impl<E: Embedder> Retriever<E> {
    /// Open (or create) a store at `path`.
    ///
    /// Attempts to register the sqlite-vec extension first so the KNN fast
    /// path is available; a refusal only costs speed, so it is logged and
    /// tolerated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path, embedder: E, config: SearchConfig) -> Result<Self> {
        if let Err(reason) = quarry_sqlite_vec::register_auto_extension() {
            warn!("sqlite-vec unavailable, semantic search will scan: {reason}");
        }
        let conn = open_store(path)?;
        Ok(Self {
            conn,
            embedder,
            config,
        })
    }

    /// Open a throwaway in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_in_memory(embedder: E, config: SearchConfig) -> Result<Self> {
        if let Err(reason) = quarry_sqlite_vec::register_auto_extension() {
            warn!("sqlite-vec unavailable, semantic search will scan: {reason}");
        }
        let conn = open_in_memory()?;
        Ok(Self {
            conn,
            embedder,
            config,
        })
    }

    /// Wrap an already-open connection (schema must be migrated).
    #[must_use]
    pub fn from_connection(conn: Connection, embedder: E, config: SearchConfig) -> Self {
        Self {
            conn,
            embedder,
            config,
        }
    }

    /// Ingest documents and embed them in one pass.
    ///
    /// # Errors
    ///
    /// Returns an error if insertion or the embedding sweep fails.
    pub fn index_documents(&mut self, docs: &[Document]) -> Result<SyncStats> {
        ingest::insert_documents(&mut self.conn, docs)?;
        semantic::sync_embeddings(&self.conn, &self.embedder)
    }

    /// Lexical BM25 search.
    ///
    /// # Errors
    ///
    /// See [`lexical::search_bm25`].
    pub fn bm25(&self, query: &str, top_k: usize) -> SearchResult<RankedList> {
        lexical::search_bm25(&self.conn, query, top_k)
    }

    /// Semantic nearest-neighbor search.
    ///
    /// # Errors
    ///
    /// See [`semantic::search_semantic`].
    pub fn semantic(&self, query: &str, top_k: usize) -> SearchResult<RankedList> {
        semantic::search_semantic(&self.conn, &self.embedder, query, top_k)
    }

    /// Hybrid retrieval: BM25 and semantic over-fetched to `prefetch_k`,
    /// fused with RRF (constant from [`SearchConfig`]), truncated to
    /// `top_k`.
    ///
    /// # Errors
    ///
    /// See [`fusion::hybrid_rrf`].
    pub fn hybrid_rrf(
        &self,
        query: &str,
        prefetch_k: usize,
        top_k: usize,
    ) -> SearchResult<Vec<FusedHit>> {
        fusion::hybrid_rrf(
            &self.conn,
            &self.embedder,
            query,
            prefetch_k,
            top_k,
            self.config.rrf_k,
        )
    }

    /// [`Retriever::bm25`] rendered via the result formatter.
    ///
    /// # Errors
    ///
    /// Same as the underlying search; formatting itself cannot fail.
    pub fn bm25_rendered(
        &self,
        query: &str,
        top_k: usize,
        format: OutputFormat,
    ) -> SearchResult<String> {
        Ok(render_ranked(&self.bm25(query, top_k)?, format))
    }

    /// [`Retriever::semantic`] rendered via the result formatter.
    ///
    /// # Errors
    ///
    /// Same as the underlying search; formatting itself cannot fail.
    pub fn semantic_rendered(
        &self,
        query: &str,
        top_k: usize,
        format: OutputFormat,
    ) -> SearchResult<String> {
        Ok(render_ranked(&self.semantic(query, top_k)?, format))
    }

    /// [`Retriever::hybrid_rrf`] rendered via the result formatter.
    ///
    /// # Errors
    ///
    /// Same as the underlying search; formatting itself cannot fail.
    pub fn hybrid_rrf_rendered(
        &self,
        query: &str,
        prefetch_k: usize,
        top_k: usize,
        format: OutputFormat,
    ) -> SearchResult<String> {
        Ok(render_fused(
            &self.hybrid_rrf(query, prefetch_k, top_k)?,
            format,
        ))
    }

    /// The active search configuration.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Borrow the underlying connection, e.g. for store diagnostics.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}
