//! Tool dispatch (§4.H step 4): `callTool(name, args) -> string | error`,
//! routed to whichever registered tool owns that name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use servflow_context::RequestContext;

use crate::error::AgentError;
use crate::llm_client::ToolDescriptor;

#[async_trait]
pub trait ToolManager: Send + Sync {
    /// `ctx` is the calling agent's own context — a workflow tool forks
    /// it before running its sub-plan; an MCP-backed tool may ignore it
    /// entirely.
    async fn call_tool(&self, ctx: &RequestContext, name: &str, args: &Value) -> Result<String, AgentError>;

    /// Descriptors advertised to the LLM on every request.
    fn tools(&self) -> Vec<ToolDescriptor>;
}

/// Dispatches by tool name to whichever of several `ToolManager`s
/// declared it — lets MCP-backed tools and workflow tools (§4.H step 4)
/// coexist on one agent without either knowing about the other.
#[derive(Default)]
pub struct CompositeToolManager {
    managers: Vec<Arc<dyn ToolManager>>,
}

impl CompositeToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_manager(mut self, manager: Arc<dyn ToolManager>) -> Self {
        self.managers.push(manager);
        self
    }

    fn owner(&self, name: &str) -> Option<&Arc<dyn ToolManager>> {
        self.managers.iter().find(|m| m.tools().iter().any(|t| t.name == name))
    }
}

#[async_trait]
impl ToolManager for CompositeToolManager {
    async fn call_tool(&self, ctx: &RequestContext, name: &str, args: &Value) -> Result<String, AgentError> {
        match self.owner(name) {
            Some(manager) => manager.call_tool(ctx, name, args).await,
            None => Err(AgentError::UnknownTool(name.to_string())),
        }
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        self.managers.iter().flat_map(|m| m.tools()).collect()
    }
}

/// A fixed map of name → handler, for tests and for tool managers that
/// don't need `servflow-plan`/`servflow-runtime` (see `WorkflowToolManager`
/// for the one that does).
pub struct StaticToolManager {
    descriptors: Vec<ToolDescriptor>,
    handlers: HashMap<String, Box<dyn Fn(&Value) -> Result<String, AgentError> + Send + Sync>>,
}

impl StaticToolManager {
    pub fn new() -> Self {
        Self { descriptors: Vec::new(), handlers: HashMap::new() }
    }

    #[must_use]
    pub fn with_tool(
        mut self,
        descriptor: ToolDescriptor,
        handler: impl Fn(&Value) -> Result<String, AgentError> + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(descriptor.name.clone(), Box::new(handler));
        self.descriptors.push(descriptor);
        self
    }
}

impl Default for StaticToolManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolManager for StaticToolManager {
    async fn call_tool(&self, _ctx: &RequestContext, name: &str, args: &Value) -> Result<String, AgentError> {
        match self.handlers.get(name) {
            Some(handler) => handler(args),
            None => Err(AgentError::UnknownTool(name.to_string())),
        }
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        self.descriptors.clone()
    }
}
