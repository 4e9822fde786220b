//! MCP tool dispatch modeled as an in-process trait (§4.I) rather than a
//! full external-protocol server: each configured API whose plan carries
//! an `mcp` binding is exposed as one named tool, callable by the host
//! process without going over the wire.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use servflow_context::RequestContext;
use servflow_error::ExecutionError;
use servflow_plan::McpArgType;

use crate::mounted_api::MountedApi;

#[derive(Debug, Clone)]
pub struct McpToolDescriptor {
    pub name: String,
    pub description: String,
    pub args: Vec<(String, McpArgType)>,
}

#[async_trait]
pub trait McpToolDispatcher: Send + Sync {
    async fn call_tool(&self, name: &str, args: HashMap<String, Value>) -> Result<String, ExecutionError>;
    fn tools(&self) -> Vec<McpToolDescriptor>;
}

/// Dispatches to whichever mounted API declared a matching `mcp.name`.
pub struct MountedMcpDispatcher {
    apis: Vec<Arc<MountedApi>>,
}

impl MountedMcpDispatcher {
    pub fn new(apis: Vec<Arc<MountedApi>>) -> Self {
        Self { apis: apis.into_iter().filter(|api| api.plan.mcp.is_some()).collect() }
    }

    fn find(&self, name: &str) -> Option<&Arc<MountedApi>> {
        self.apis
            .iter()
            .find(|api| api.plan.mcp.as_ref().is_some_and(|binding| binding.name == name))
    }
}

#[async_trait]
impl McpToolDispatcher for MountedMcpDispatcher {
    async fn call_tool(&self, name: &str, args: HashMap<String, Value>) -> Result<String, ExecutionError> {
        let api = self
            .find(name)
            .ok_or_else(|| ExecutionError::fault(format!("unknown mcp tool `{name}`")))?;
        let binding = api.plan.mcp.as_ref().expect("find() only returns mcp-bound apis");

        let ctx = RequestContext::new().with_tool_params(args).with_sub_executor(api.sub_executor());

        let built = api
            .runtime
            .execute(&api.plan, &ctx, binding.start.clone(), binding.result.source())
            .await
            .map_err(|err| ExecutionError::fault(err.to_string()))?;
        Ok(built.body)
    }

    fn tools(&self) -> Vec<McpToolDescriptor> {
        self.apis
            .iter()
            .filter_map(|api| {
                api.plan.mcp.as_ref().map(|binding| McpToolDescriptor {
                    name: binding.name.clone(),
                    description: binding.description.clone(),
                    args: binding.args.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_drops_apis_without_an_mcp_binding() {
        let dispatcher = MountedMcpDispatcher::new(vec![]);
        assert!(dispatcher.tools().is_empty());
    }
}
