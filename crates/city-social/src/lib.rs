//! `city-social` — the relationship graph between citizens.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                                |
//! |------------|-------------------------------------------------------------------------|
//! | [`edge`]   | `PairKey`, `RelationshipEdge`, `RelationshipKind`, `InteractionOutcome` |
//! | [`graph`]  | `SocialGraph` (lock-striped edge storage)                               |
//! | [`error`]  | `SocialError`, `SocialResult<T>`                                        |
//!
//! Edges are undirected: one `RelationshipEdge` per unordered pair, keyed by
//! the canonical `PairKey` (smaller id first).  Edges are created by the first
//! interaction and never deleted.

pub mod edge;
pub mod error;
pub mod graph;


pub use edge::{InteractionOutcome, PairKey, RelationshipEdge, RelationshipKind, FRIEND_THRESHOLD, RIVAL_THRESHOLD};
pub use error::{SocialError, SocialResult};
pub use graph::SocialGraph;
