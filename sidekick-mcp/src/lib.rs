#![deny(missing_docs)]
//! MCP client and per-session server manager.
//!
//! [`McpClient`] speaks the Model Context Protocol to one child process:
//! spawn, initialize handshake, tool discovery, tool calls. [`McpManager`]
//! owns every client for a session in an explicit registry (no
//! module-level singletons) and routes tool calls to the server whose
//! discovered tool list contains the requested name.

pub mod client;
pub mod config;
pub mod manager;

pub use client::McpClient;
pub use config::McpServerConfig;
pub use manager::McpManager;
