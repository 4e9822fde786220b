//! The LLM tool-call loop (§4.H): a provider-agnostic [`LlmClient`], a
//! [`ToolManager`] dispatch layer (workflow tools included), and the
//! `agent` action type that drives them from inside a plan.

#[cfg(feature = "anthropic")]
mod anthropic;
mod agent;
mod agent_action;
mod error;
mod llm_client;
mod tool_manager;
mod workflow_tool;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicClient;
pub use agent::AgentLoop;
pub use agent_action::AgentAction;
pub use error::AgentError;
pub use llm_client::{LlmClient, LlmRequest, LlmResponse, Message, StaticLlmClient, ToolCall, ToolDescriptor};
pub use tool_manager::{CompositeToolManager, StaticToolManager, ToolManager};
pub use workflow_tool::WorkflowToolManager;
