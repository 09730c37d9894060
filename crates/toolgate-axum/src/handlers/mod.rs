//! HTTP request handlers.
//!
//! Handlers are thin: sessions run in the mcp crate, these only adapt them
//! to HTTP.

pub mod health;
pub mod messages;
pub mod sse;
