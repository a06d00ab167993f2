//! Torrent search abstraction.
//!
//! The crawler sees the search aggregator only through the `Searcher` trait.
//! `JackettSearcher` is the production backend.

mod jackett;
mod types;

pub use jackett::JackettSearcher;
pub use types::*;
