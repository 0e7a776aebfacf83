#![deny(missing_docs)]
//! Shared types and traits for the sidekick agent core.
//!
//! Everything the other sidekick crates exchange lives here: conversation
//! messages, the tool model ([`Tool`], [`ToolDyn`], [`ToolDefinition`]),
//! the LLM oracle contract ([`Provider`], [`CompletionRequest`],
//! [`CompletionResponse`]), and the error taxonomy.

pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
