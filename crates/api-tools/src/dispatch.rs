//! Binding catalog operations to callable tool handlers.
//!
//! Every handler validates its arguments against the operation's schema, renders the path
//! template and delegates to the [`Invoker`]. Handlers always resolve to a `CallToolResult`;
//! validation and upstream failures are reported as error envelopes.

use crate::catalog::{
    Access, Catalog, Operation, OperationDescriptor, TOKEN_PARAM, USER_AGENT_PARAM,
};
use crate::envelope::validation_envelope;
use crate::error::{RegistryError, ValidationError};
use crate::headers::AuthHeaders;
use crate::invoker::Invoker;
use crate::template::value_to_string;
use futures::FutureExt as _;
use futures::future::BoxFuture;
use rmcp::model::{CallToolResult, JsonObject, Tool, ToolAnnotations};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub type ToolFuture = BoxFuture<'static, CallToolResult>;
pub type ToolHandler = Arc<dyn Fn(JsonObject) -> ToolFuture + Send + Sync>;

/// The one capability the dispatcher needs from a transport: "name → handler".
pub trait ToolRegistrar {
    /// Register `handler` under `tool.name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTool`] if the name is already taken.
    fn register(&mut self, tool: Tool, handler: ToolHandler) -> Result<(), RegistryError>;
}

struct RegisteredTool {
    tool: Tool,
    handler: ToolHandler,
}

/// In-process registry backing the MCP server. Immutable once startup completes.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered tools in registration order.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.entries.iter().map(|e| e.tool.clone()).collect()
    }

    #[must_use]
    pub fn handler(&self, name: &str) -> Option<ToolHandler> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.entries[i].handler))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ToolRegistrar for ToolRegistry {
    fn register(&mut self, tool: Tool, handler: ToolHandler) -> Result<(), RegistryError> {
        let name = tool.name.to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.index.insert(name, self.entries.len());
        self.entries.push(RegisteredTool { tool, handler });
        Ok(())
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| &e.tool.name))
            .finish()
    }
}

/// Bind and register every catalog operation.
///
/// # Errors
///
/// Fails on the first name the registrar already holds; nothing is silently replaced.
pub fn register_all<R: ToolRegistrar + ?Sized>(
    catalog: &Catalog,
    invoker: &Arc<Invoker>,
    registrar: &mut R,
) -> Result<(), RegistryError> {
    for operation in catalog.operations() {
        let tool = tool_for(&operation.descriptor);
        let handler = bind(Arc::new(operation.clone()), Arc::clone(invoker));
        registrar.register(tool, handler)?;
    }
    Ok(())
}

/// MCP tool metadata for a descriptor.
#[must_use]
pub fn tool_for(descriptor: &OperationDescriptor) -> Tool {
    let mut tool = Tool::new(
        descriptor.name,
        descriptor.description,
        Arc::new(descriptor.input_schema()),
    );
    tool.annotations = Some(read_only_annotations());
    tool
}

/// Every Dao3 operation is an HTTP GET against an external service.
fn read_only_annotations() -> ToolAnnotations {
    ToolAnnotations {
        title: None,
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        idempotent_hint: Some(true),
        open_world_hint: Some(true),
    }
}

/// Build the handler closure for one operation.
#[must_use]
pub fn bind(operation: Arc<Operation>, invoker: Arc<Invoker>) -> ToolHandler {
    Arc::new(move |arguments: JsonObject| {
        let operation = Arc::clone(&operation);
        let invoker = Arc::clone(&invoker);
        async move {
            let tool = operation.descriptor.name;
            let request = match prepare_request(&operation, &arguments) {
                Ok(request) => request,
                Err(e) => {
                    warn!(tool, field = e.field(), error = %e, "rejected tool arguments");
                    return validation_envelope(&e);
                }
            };

            debug!(tool, endpoint = %request.endpoint, "dispatching tool call");
            invoker
                .invoke(&request.endpoint, request.headers.as_ref())
                .await
                .into()
        }
        .boxed()
    })
}

/// A validated call, ready for the invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Path + query relative to the API base URL.
    pub endpoint: String,
    pub headers: Option<AuthHeaders>,
}

/// Validate `arguments` and render the request for `operation`.
///
/// Arguments are checked in declared order, credentials last; the first offending field is
/// reported. Unknown arguments are ignored.
///
/// # Errors
///
/// Returns a [`ValidationError`] for a missing argument, one of the wrong JSON type, or a
/// `.`/`..` value that would replace a whole path segment.
pub fn prepare_request(
    operation: &Operation,
    arguments: &JsonObject,
) -> Result<PreparedRequest, ValidationError> {
    let descriptor = &operation.descriptor;

    let mut values: HashMap<&str, String> = HashMap::new();
    for param in descriptor.arguments() {
        let Some(value) = arguments.get(param.name) else {
            return Err(ValidationError::Missing {
                field: param.name.to_string(),
            });
        };
        if !param.kind.accepts(value) {
            return Err(ValidationError::WrongType {
                field: param.name.to_string(),
                expected: param.kind,
                found: json_kind(value),
            });
        }
        if matches!(value.as_str(), Some("." | ".."))
            && operation.template.is_path_param(param.name)
        {
            return Err(ValidationError::DotSegment {
                field: param.name.to_string(),
            });
        }
        values.insert(param.name, value_to_string(value));
    }

    let headers = match descriptor.access {
        Access::Public => None,
        Access::Authenticated => Some(AuthHeaders::new(
            values.remove(TOKEN_PARAM.name).unwrap_or_default(),
            values.remove(USER_AGENT_PARAM.name).unwrap_or_default(),
        )),
    };

    Ok(PreparedRequest {
        endpoint: operation.template.render(&values),
        headers,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
