//! A thin Anthropic-backed [`LlmClient`], feature-gated behind
//! `anthropic` so the rest of the crate — and every test — never needs
//! network access or a live API key.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AgentError;
use crate::llm_client::{LlmClient, LlmRequest, LlmResponse, Message, ToolCall};

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_URL: &str = "https://api.anthropic.com/v1/messages";

pub struct AnthropicClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), client: reqwest::Client::new(), model: model.into() }
    }

    pub fn from_env() -> Result<Self, AgentError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| AgentError::LlmCall("ANTHROPIC_API_KEY not set".into()))?;
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::with_model(api_key, model))
    }

    fn to_wire_messages(messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| match m {
                Message::User(text) => json!({"role": "user", "content": text}),
                Message::Assistant(text) => json!({"role": "assistant", "content": text}),
                Message::ToolCall(call) => json!({
                    "role": "assistant",
                    "content": [{"type": "tool_use", "id": call.id, "name": call.name, "input": call.arguments}],
                }),
                Message::ToolResponse { id, content } => json!({
                    "role": "user",
                    "content": [{"type": "tool_result", "tool_use_id": id, "content": content}],
                }),
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
    id: Option<String>,
    name: Option<String>,
    input: Option<Value>,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn provide_response(&self, request: &LlmRequest) -> Result<LlmResponse, AgentError> {
        let tools: Vec<Value> = request
            .tools
            .iter()
            .map(|t| json!({"name": t.name, "description": t.description, "input_schema": t.input_schema}))
            .collect();

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&json!({
                "model": &self.model,
                "max_tokens": 4096,
                "system": request.system_message,
                "messages": Self::to_wire_messages(&request.messages),
                "tools": tools,
            }))
            .send()
            .await
            .map_err(|err| AgentError::LlmCall(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::LlmCall(format!("Anthropic API error {status}: {body}")));
        }

        let body: ApiResponse =
            response.json().await.map_err(|err| AgentError::LlmCall(err.to_string()))?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for block in body.content {
            match block.block_type.as_str() {
                "text" => {
                    if let Some(text) = block.text {
                        content.push_str(&text);
                    }
                }
                "tool_use" => {
                    tool_calls.push(ToolCall {
                        id: block.id.unwrap_or_default(),
                        name: block.name.unwrap_or_default(),
                        arguments: block.input.unwrap_or(Value::Null),
                    });
                }
                _ => {}
            }
        }

        Ok(LlmResponse { content: (!content.is_empty()).then_some(content), tool_calls })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}
