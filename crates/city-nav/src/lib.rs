//! `city-nav` — how citizens find places and ways between them.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`navigator`] | `Navigator` trait, `Route`, `OpenNavigator`               |
//! | [`grid`]      | `GridNavigator` (bounded tiles, blocked cells, BFS)       |
//! | [`error`]     | `NavError`, `NavResult<T>`                                |
//!
//! The kernel only talks to the [`Navigator`] trait; applications plug in
//! whatever map model they have.

pub mod error;
pub mod grid;
pub mod navigator;


pub use error::{NavError, NavResult};
pub use grid::GridNavigator;
pub use navigator::{Navigator, OpenNavigator, Route};
