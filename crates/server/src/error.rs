//! Error types for the MCP server.

use dao3_api_tools::error::{CatalogError, RegistryError};
use thiserror::Error;

/// Startup failures. Any of these aborts the process before the stdio transport is opened.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Logging configuration errors (invalid filter, subscriber already set)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inconsistent operation catalog
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Tool registration conflicts
    #[error("Registration error: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type alias for server startup.
pub type Result<T> = std::result::Result<T, ServerError>;
