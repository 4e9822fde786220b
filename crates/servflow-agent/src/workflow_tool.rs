//! A "workflow tool" (§4.H step 4): a tool whose implementation is a
//! sub-plan. Its arguments are exposed to the sub-plan through
//! `tool_param(name)`, and its `result` template rendered against the
//! finished sub-walk is returned as the tool's text content.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use servflow_context::RequestContext;
use servflow_plan::{McpArgType, McpBinding, Plan};
use servflow_runtime::Runtime;

use crate::error::AgentError;
use crate::llm_client::ToolDescriptor;
use crate::tool_manager::ToolManager;

fn json_schema_for(binding: &McpBinding) -> Value {
    let mut properties = serde_json::Map::new();
    for (name, arg_type) in &binding.args {
        let schema_type = match arg_type {
            McpArgType::String => "string",
            McpArgType::Number => "number",
            McpArgType::Bool => "boolean",
        };
        properties.insert(name.clone(), serde_json::json!({"type": schema_type}));
    }
    serde_json::json!({"type": "object", "properties": properties})
}

/// Dispatches tool calls to sub-plans reachable from the agent's own
/// plan. Every binding is keyed by `McpBinding::name`, the same
/// definitions an MCP server would expose as tools (§4.I) — a workflow
/// tool and an MCP tool are the same plan-side concept, just reached by
/// a different front door.
pub struct WorkflowToolManager {
    plan: Arc<Plan>,
    runtime: Arc<Runtime>,
    bindings: HashMap<String, McpBinding>,
}

impl WorkflowToolManager {
    pub fn new(plan: Arc<Plan>, runtime: Arc<Runtime>, bindings: Vec<McpBinding>) -> Self {
        let bindings = bindings.into_iter().map(|b| (b.name.clone(), b)).collect();
        Self { plan, runtime, bindings }
    }
}

#[async_trait]
impl ToolManager for WorkflowToolManager {
    async fn call_tool(&self, ctx: &RequestContext, name: &str, args: &Value) -> Result<String, AgentError> {
        let binding = self.bindings.get(name).ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;

        let tool_params: HashMap<String, Value> = match args {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            other => {
                return Err(AgentError::ToolCall {
                    tool: name.to_string(),
                    message: format!("expected an object of arguments, got {other}"),
                })
            }
        };

        let child = ctx.fork().with_tool_params(tool_params);
        let result = self
            .runtime
            .execute(&self.plan, &child, binding.start.clone(), binding.result.source())
            .await
            .map_err(|err| AgentError::ToolCall { tool: name.to_string(), message: err.to_string() })?;
        Ok(result.body)
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        self.bindings
            .values()
            .map(|b| ToolDescriptor {
                name: b.name.clone(),
                description: b.description.clone(),
                input_schema: json_schema_for(b),
            })
            .collect()
    }
}
