//! Calendly MCP server library.
//!
//! The binary in `main.rs` wires configuration, the credential store, the
//! API gateway, and the optional mailer into a [`server::CalendlyServer`]
//! and serves it over MCP stdio.

pub mod catalog;
pub mod config;
pub mod error;
pub mod server;
pub mod workflow;

pub use config::{ConfigError, ServerConfig};
pub use error::ToolError;
pub use server::CalendlyServer;
