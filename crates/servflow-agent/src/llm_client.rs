//! The provider-agnostic LLM client contract (§4.H) and the message/tool
//! shapes the agent loop builds each request from.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;

/// One tool the LLM may call, advertised on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A single tool invocation the model asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// One turn of the running conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    User(String),
    Assistant(String),
    ToolCall(ToolCall),
    ToolResponse { id: String, content: String },
}

#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub system_message: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDescriptor>,
}

/// What the model returned: plain content, zero or more tool calls, or
/// both (a model may narrate before calling a tool).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), tool_calls: Vec::new() }
    }

    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// Unified LLM client interface (§4.H: `provideResponse(request) ->
/// response`), mirroring the teacher-adjacent `agentic::LlmClient` shape.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn provide_response(&self, request: &LlmRequest) -> Result<LlmResponse, AgentError>;

    fn model_name(&self) -> &str;

    fn provider_name(&self) -> &str;
}

/// A scripted client for tests: returns its configured responses in
/// order, one per call, and errors if asked for more than were given.
pub struct StaticLlmClient {
    responses: std::sync::Mutex<std::collections::VecDeque<LlmResponse>>,
}

impl StaticLlmClient {
    pub fn new(responses: impl IntoIterator<Item = LlmResponse>) -> Self {
        Self { responses: std::sync::Mutex::new(responses.into_iter().collect()) }
    }
}

#[async_trait]
impl LlmClient for StaticLlmClient {
    async fn provide_response(&self, _request: &LlmRequest) -> Result<LlmResponse, AgentError> {
        self.responses
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .ok_or_else(|| AgentError::LlmCall("StaticLlmClient ran out of scripted responses".into()))
    }

    fn model_name(&self) -> &str {
        "static"
    }

    fn provider_name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_client_replays_responses_in_order() {
        let client = StaticLlmClient::new([LlmResponse::text("a"), LlmResponse::text("b")]);
        let request = LlmRequest::default();
        assert_eq!(client.provide_response(&request).await.unwrap().content.unwrap(), "a");
        assert_eq!(client.provide_response(&request).await.unwrap().content.unwrap(), "b");
    }

    #[tokio::test]
    async fn static_client_errors_once_exhausted() {
        let client = StaticLlmClient::new([]);
        assert!(client.provide_response(&LlmRequest::default()).await.is_err());
    }
}
