#![forbid(unsafe_code)]
//! quarry-store library.
//!
//! Owns the embedded SQLite side of quarry: document schema, FTS5 index
//! wiring, embedding storage, and ingest. Search itself lives in
//! `quarry-search`; this crate only guarantees the tables and indexes it
//! reads from exist and stay in sync.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod db;
pub mod document;

pub use document::Document;
