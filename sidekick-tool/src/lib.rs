#![deny(missing_docs)]
//! Tool registry: register, look up, and execute tools.
//!
//! The registry is the single dispatch table for built-in tools
//! (filesystem, exploration). Names are globally unique for a session —
//! a second registration of the same name is a configuration error that
//! is surfaced, not silently resolved.

pub mod registry;

pub use registry::ToolRegistry;
