//! Errors the agent loop can raise (§4.H).

#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentError {
    #[error("LLM call failed: {0}")]
    LlmCall(String),

    #[error("exceeded max iterations ({0})")]
    MaxIterationsExceeded(usize),

    #[error("tool `{tool}` failed: {message}")]
    ToolCall { tool: String, message: String },

    #[error("unknown tool `{0}`")]
    UnknownTool(String),

    #[error(transparent)]
    Execution(#[from] servflow_error::ExecutionError),

    #[error(transparent)]
    Runtime(#[from] servflow_runtime::RuntimeError),

    #[error(transparent)]
    Template(#[from] servflow_template::TemplateError),
}
