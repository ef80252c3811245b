//! `city-memory` — per-citizen memory ledgers.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`entry`]       | `MemoryEntry`, `MemoryDraft`, `MemoryKind`, `EntityRef`    |
//! | [`relevance`]   | `MemoryQuery`, `Relevance` trait, `OverlapRelevance`       |
//! | [`recall`]      | `Recall` (ranked, restartable retrieval result)            |
//! | [`store`]       | `MemoryStore` (record / retrieve / decay / restore)        |
//! | [`error`]       | `MemoryError`, `MemoryResult<T>`                           |
//!
//! # Ranking
//!
//! ```text
//! score = importance × recency_decay^(now - tick) × relevance(entry, query)
//! ```
//!
//! Ties go to the newer entry (higher tick, then higher id).

pub mod entry;
pub mod error;
pub mod recall;
pub mod relevance;
pub mod store;

#[cfg(test)]
mod tests;

pub use entry::{EntityRef, MemoryDraft, MemoryEntry, MemoryKind, MemoryPayload};
pub use error::{MemoryError, MemoryResult};
pub use recall::{Recall, ScoredMemory};
pub use relevance::{MemoryQuery, OverlapRelevance, Relevance};
pub use store::MemoryStore;
