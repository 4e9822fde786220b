//! Errors the plan walker can raise (§4.G, §5).

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("exceeded max steps ({0})")]
    MaxStepsExceeded(usize),

    #[error("error executing action `{action_id}`: {message}")]
    ExecutingAction { action_id: String, message: String },

    #[error("context canceled")]
    ContextCanceled,

    #[error("unknown step `{0}`")]
    UnknownStep(String),

    #[error("conditional evaluation failed: {0}")]
    Conditional(#[from] servflow_template::TemplateError),

    #[error("response build failed: {0}")]
    Response(#[from] servflow_response::ResponseError),
}

impl RuntimeError {
    /// True for the cooperative-cancellation sentinel the parallel
    /// action must swallow rather than aggregate (§5).
    pub fn is_context_canceled(&self) -> bool {
        matches!(self, Self::ContextCanceled)
    }
}
