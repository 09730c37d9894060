//! Protocol relay and session lifecycle management.
//!
//! A session bridges one client stream to one freshly spawned connector:
//!
//! ```text
//! connector id ─► resolve ─► spawn ─► ┌ relay   ┐ ─► cancel loser ─► teardown
//!                                     └ monitor ┘
//! ```
//!
//! The relay side is pluggable through [`BridgeFactory`]; [`LineBridgeFactory`]
//! ships a newline-delimited JSON relay suitable for stdio MCP servers.

#![deny(unsafe_code)]

pub mod relay;
pub mod session;

pub use relay::{
    BridgeFactory, ClientStreams, CloseReason, InitOptions, LineBridgeFactory, LineRelay,
    ProtocolBridge, RelayError, RelayOutcome, SubprocessChannels,
};
pub use session::{
    RelayErrorPolicy, SessionError, SessionLifecycle, SessionManager, SessionOutcome,
    SessionReport, SessionSettings,
};
