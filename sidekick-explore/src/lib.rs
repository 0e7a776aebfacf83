#![deny(missing_docs)]
//! Bounded exploration of unfamiliar code repositories.
//!
//! The engine answers "what is this project?" in a fixed, small number of
//! file reads: a hand-curated anchor-file catalog ranks the high-signal
//! files by convention ([`anchors`]), each anchor gets category-specific
//! processing (Makefile target extraction, manifest summaries, compose
//! service discovery), and a keyword scorer ([`relevance`]) finds further
//! files once the anchor set is exhausted. Nothing is cached between
//! calls; every query re-scans.

pub mod anchors;
pub mod compose;
pub mod engine;
pub mod makefile;
pub mod manifest;
pub mod relevance;
pub mod tools;

pub use anchors::{AnchorCategory, AnchorFile, find_anchor_files};
pub use engine::{ExplorationContext, ExplorationEngine, ExplorationOptions, ExploreError};
pub use relevance::{ScoredFile, extract_keywords, find_relevant_files};
pub use tools::ExplorationToolset;
