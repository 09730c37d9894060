//! Core services - orchestration over ports and domain logic.

mod resolver;

pub use resolver::ConnectorResolver;
