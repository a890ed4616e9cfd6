//! Reciprocal Rank Fusion of lexical and semantic result lists.

mod hybrid;
mod rrf;

pub use hybrid::hybrid_rrf;
pub use rrf::{DEFAULT_RRF_K, FusedHit, rrf_fuse};
