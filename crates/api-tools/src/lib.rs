//! Dao3 platform operations exposed as MCP tools.
//!
//! This crate owns the whole adapter core:
//! - [`catalog`]: the static list of operations (name, description, schema, path template)
//! - [`dispatch`]: binding each operation to a validating handler and registering it
//! - [`invoker`]: the single-GET HTTP runtime
//!
//! It carries **no** transport code; the server crate plugs the [`dispatch::ToolRegistry`]
//! into an rmcp stdio server.

pub mod catalog;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod headers;
pub mod invoker;
pub mod template;

pub use catalog::{Catalog, OperationDescriptor};
pub use dispatch::{ToolRegistrar, ToolRegistry, register_all};
pub use envelope::ApiResult;
pub use headers::AuthHeaders;
pub use invoker::{HttpUpstream, Invoker, Upstream};
