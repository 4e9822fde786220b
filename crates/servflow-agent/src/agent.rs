//! The tool-call loop itself (§4.H steps 1-3).

use std::sync::Arc;

use servflow_context::RequestContext;

use crate::error::AgentError;
use crate::llm_client::{LlmClient, LlmRequest, Message, ToolDescriptor};
use crate::tool_manager::ToolManager;

const DEFAULT_MAX_ITERATIONS: usize = 25;

pub struct AgentLoop {
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolManager>,
    max_iterations: usize,
}

impl AgentLoop {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<dyn ToolManager>) -> Self {
        Self { llm, tools, max_iterations: DEFAULT_MAX_ITERATIONS }
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Run the loop to completion: build a request, call the model, and
    /// either return its content or dispatch every tool call it asked
    /// for and loop again, up to `max_iterations`.
    pub async fn run(
        &self,
        ctx: &RequestContext,
        system_message: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Result<String, AgentError> {
        let tools = self.tools.tools();
        let mut request = LlmRequest {
            system_message: system_message.into(),
            messages: vec![Message::User(user_message.into())],
            tools,
        };

        for iteration in 0..self.max_iterations {
            tracing::debug!(iteration, model = self.llm.model_name(), "agent loop iteration");
            let response = self.llm.provide_response(&request).await?;

            if response.is_final() {
                return Ok(response.content.unwrap_or_default());
            }

            if let Some(content) = &response.content {
                request.messages.push(Message::Assistant(content.clone()));
            }

            for call in response.tool_calls {
                let result = self.tools.call_tool(ctx, &call.name, &call.arguments).await;
                let content = match result {
                    Ok(text) => text,
                    Err(err) => format!("error: {err}"),
                };
                request.messages.push(Message::ToolCall(call.clone()));
                request.messages.push(Message::ToolResponse { id: call.id, content });
            }
        }

        Err(AgentError::MaxIterationsExceeded(self.max_iterations))
    }

    pub fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.tools()
    }
}
