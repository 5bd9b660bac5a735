//! Graph storage.
//!
//! The store is filled once per schema snapshot and read by every analysis
//! afterwards. Construction is single-writer; once built, a store can be
//! shared across threads without locking.

pub mod graph;
pub mod snapshot;
pub mod document;
pub mod cache;

pub use graph::{EdgeIndex, GraphStore};
pub use snapshot::GraphSnapshot;
pub use document::{DocumentError, GraphDocument};
pub use cache::{CacheConfig, CacheStats, GraphCache};
