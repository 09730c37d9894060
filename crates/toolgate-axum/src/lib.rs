#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, ConfigError, CorsConfig, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use registry::SessionRegistry;
pub use routes::create_router;
pub use state::AppState;
