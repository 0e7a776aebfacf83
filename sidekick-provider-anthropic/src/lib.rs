#![deny(missing_docs)]
//! Anthropic Messages API provider.
//!
//! The one concrete [`Provider`](sidekick_types::Provider) implementation:
//! maps a [`CompletionRequest`](sidekick_types::CompletionRequest) to the
//! Messages API JSON body, posts it, and maps the response back. The core
//! treats this as an opaque turn-taking oracle and never retries — rate
//! limits and transient failures propagate to the caller with a
//! retryability hint.

pub mod client;
pub mod error;
pub mod mapping;

pub use client::Anthropic;
