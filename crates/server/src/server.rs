//! rmcp `ServerHandler` backed by the Dao3 tool registry.

use crate::error::Result;
use dao3_api_tools::catalog::Catalog;
use dao3_api_tools::dispatch::{ToolRegistry, register_all};
use dao3_api_tools::invoker::Invoker;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ErrorData, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Identity reported in `serverInfo`; hosts key their configuration on it.
pub const SERVER_NAME: &str = "@dao3fun/statistics-mcp";

#[derive(Clone, Debug)]
pub struct StatisticsServer {
    registry: Arc<ToolRegistry>,
}

impl StatisticsServer {
    /// Register the built-in catalog against `invoker`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is inconsistent or a tool name is registered twice.
    pub fn build(invoker: &Arc<Invoker>) -> Result<Self> {
        let catalog = Catalog::builtin()?;
        let mut registry = ToolRegistry::new();
        register_all(&catalog, invoker, &mut registry)?;
        info!(tools = registry.len(), "registered Dao3 tools");
        Ok(Self::new(registry))
    }

    #[must_use]
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    /// Run the handler registered under `name`.
    ///
    /// # Errors
    ///
    /// Only an unknown tool name is a protocol error; every other failure is reported inside
    /// the returned envelope.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let handler = self
            .registry
            .handler(name)
            .ok_or_else(|| ErrorData::invalid_params(format!("Tool not found: {name}"), None))?;
        Ok(handler(arguments).await)
    }
}

impl ServerHandler for StatisticsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "神岛平台数据查询工具。公开工具无需认证；评论列表与地图统计工具需要 token 与 userAgent 参数。"
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.registry.list_tools(),
            ..Default::default()
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let arguments = request.arguments.unwrap_or_default();
            self.dispatch(&request.name, arguments).await
        }
    }
}
