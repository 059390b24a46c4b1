//! MCP server integration for imessage-mcp.
//!
//! - One resource (`contacts://all`) and two tools (`send_imessage`,
//!   `search_contacts`), all served from the static catalog in `core::tool`
//! - The handler owns nothing mutable: an injected `ScriptRunner` and the
//!   query policy, built once in `factory_from_config`
//! - The inherent methods carry the dispatch logic so they can be driven
//!   without an rmcp request context; the `ServerHandler` impl delegates

use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListResourcesResult,
        ListToolsResult, PaginatedRequestParam, ReadResourceRequestParam, ReadResourceResult,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    ErrorData as McpError, RoleServer, ServerHandler,
};

use crate::clients::osascript::{OsaScript, ScriptRunner};
use crate::core::error::BridgeError;
use crate::core::tool::{ResourceUri, ToolName};
use crate::infra::config::Config;
use crate::infra::runtime::limits::ScriptLimits;
use crate::tools::{contacts, contacts::QueryPolicy, imessage};

/// The MCP server handler.
#[derive(Clone)]
pub struct MessagesSvc {
    runner: Arc<dyn ScriptRunner>,
    query_policy: QueryPolicy,
}

impl MessagesSvc {
    pub fn new(runner: Arc<dyn ScriptRunner>) -> Self {
        Self { runner, query_policy: QueryPolicy::default() }
    }

    pub fn with_query_policy(mut self, policy: QueryPolicy) -> Self {
        self.query_policy = policy;
        self
    }

    pub fn resources(&self) -> ListResourcesResult {
        ListResourcesResult {
            resources: ResourceUri::ALL.iter().map(|r| r.descriptor()).collect(),
            next_cursor: None,
        }
    }

    pub async fn read(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        tracing::debug!(uri = %uri, "read_resource");
        match ResourceUri::parse(uri) {
            Some(ResourceUri::AllContacts) => {
                Ok(contacts::read_all_contacts(self.runner.as_ref()).await?)
            }
            None => Err(BridgeError::UnknownResource(uri.to_string()).into()),
        }
    }

    pub fn tools(&self) -> ListToolsResult {
        ListToolsResult {
            tools: ToolName::ALL.iter().map(|t| t.descriptor()).collect(),
            next_cursor: None,
        }
    }

    pub async fn call(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = %name, "call_tool");
        let runner = self.runner.as_ref();
        let result = match ToolName::parse(name) {
            Some(ToolName::SendImessage) => imessage::send_imessage(runner, arguments).await,
            Some(ToolName::SearchContacts) => {
                contacts::search_contacts(runner, arguments, self.query_policy).await
            }
            None => Err(BridgeError::UnknownTool),
        };
        result.map_err(|e| {
            tracing::debug!(tool = %name, error = %e, "call_tool rejected");
            McpError::from(e)
        })
    }
}

impl ServerHandler for MessagesSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Send iMessages and look up macOS Contacts. Read contacts://all for the full \
                 address book, or call search_contacts / send_imessage."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(self.resources())
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read(&uri).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(self.tools())
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(&request.name, request.arguments.as_ref()).await
    }
}

/// Factory used by both transports: a fresh handler around the given runner.
pub fn make_factory(
    runner: Arc<dyn ScriptRunner>,
    policy: QueryPolicy,
) -> impl Fn() -> MessagesSvc + Clone + Send + Sync + 'static {
    move || MessagesSvc::new(runner.clone()).with_query_policy(policy)
}

pub fn factory_from_config(cfg: &Config) -> impl Fn() -> MessagesSvc + Clone + Send + Sync + 'static {
    let limits = ScriptLimits::new(cfg.max_concurrent_scripts, cfg.script_timeout);
    let runner: Arc<dyn ScriptRunner> = Arc::new(OsaScript::new(cfg.osascript.clone(), limits));
    make_factory(runner, cfg.query_policy)
}
