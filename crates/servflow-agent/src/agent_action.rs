//! The `agent` action type (§4.H: "when an agent action is used"). Not
//! part of `servflow-action`'s process-wide default registry — an LLM
//! client and tool manager are runtime configuration, not something a
//! constructor can build from an integration id alone, so the bootstrap
//! binary registers this action type directly, capturing its
//! dependencies in the constructor closure.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use servflow_action::Executable;
use servflow_context::RequestContext;
use servflow_error::ExecutionError;
use std::sync::Arc;

use crate::agent::AgentLoop;
use crate::llm_client::LlmClient;
use crate::tool_manager::ToolManager;

#[derive(Deserialize)]
struct AgentConfig {
    #[serde(rename = "systemMessage", default)]
    system_message: String,
    #[serde(rename = "userMessage")]
    user_message: String,
}

pub struct AgentAction {
    loop_: AgentLoop,
}

impl AgentAction {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<dyn ToolManager>) -> Self {
        Self { loop_: AgentLoop::new(llm, tools) }
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.loop_ = self.loop_.with_max_iterations(max_iterations);
        self
    }
}

#[async_trait]
impl Executable for AgentAction {
    fn action_type(&self) -> &str {
        "agent"
    }

    fn config(&self) -> &str {
        "agent"
    }

    async fn execute(&self, ctx: &RequestContext, rendered_config: &str) -> Result<Value, ExecutionError> {
        let config: AgentConfig = serde_json::from_str(rendered_config)
            .map_err(|err| ExecutionError::fault(format!("invalid agent config: {err}")))?;
        let answer = self
            .loop_
            .run(ctx, config.system_message, config.user_message)
            .await
            .map_err(|err| ExecutionError::fault(err.to_string()))?;
        Ok(Value::String(answer))
    }
}
