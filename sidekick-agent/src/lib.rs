#![deny(missing_docs)]
//! The sidekick agent core: configuration snapshot, capability registry,
//! and the bounded per-message turn orchestrator.
//!
//! An [`Agent`] is built once from an immutable [`AgentConfig`]: the
//! filesystem and exploration tools register for the allow-listed roots,
//! one MCP child process starts per enabled server descriptor, and every
//! user message then runs through the bounded
//! prompt → oracle → tool → oracle loop. Saving new settings means
//! building a new agent, never mutating this one.

pub mod agent;
pub mod capabilities;
pub mod config;
pub mod skills;

pub use agent::{Agent, ChatResult};
pub use capabilities::{Capabilities, ToolAvailability, build_system_prompt};
pub use config::AgentConfig;
pub use skills::load_skills;
