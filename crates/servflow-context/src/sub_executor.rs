//! The context's "handle to the owning plan" (§4.D): lets an action (the
//! parallel reference action, the agent's workflow tool) trigger a
//! sub-execution by step id without `servflow-context` depending on
//! `servflow-plan`/`servflow-runtime` — it only needs to call through a
//! trait object the runtime installs when it builds the top-level context.

use servflow_error::ExecutionError;

use crate::context::RequestContext;

/// What a sub-execution (`executeStep`) returns: the same shape an HTTP
/// response would have, minus the framing that's only meaningful for the
/// inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct SubExecutionResult {
    pub code: u16,
    pub body: String,
}

/// Implemented by `servflow-runtime::PlanSubExecutor`. Kept here, rather
/// than importing `servflow-plan`/`servflow-runtime` types directly, so
/// the dependency points the other way: runtime depends on context, not
/// the reverse.
#[async_trait::async_trait]
pub trait SubExecutor: Send + Sync {
    /// Run `step_id` to completion against a forked copy of `ctx`. The
    /// implementor is responsible for forking — the caller never sees
    /// (or can accidentally skip) the isolation.
    async fn execute_step(
        &self,
        ctx: &RequestContext,
        step_id: &str,
        end_template: &str,
    ) -> Result<SubExecutionResult, ExecutionError>;
}

/// A `SubExecutor` that always fails — the default for a context built
/// outside of a runtime (e.g. in unit tests), so calling `executeStep`
/// without one installed gives a clear error instead of a panic.
pub struct NoSubExecutor;

#[async_trait::async_trait]
impl SubExecutor for NoSubExecutor {
    async fn execute_step(
        &self,
        _ctx: &RequestContext,
        step_id: &str,
        _end_template: &str,
    ) -> Result<SubExecutionResult, ExecutionError> {
        Err(ExecutionError::fault(format!(
            "no sub-executor configured, cannot execute step `{step_id}`"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_sub_executor_is_an_error() {
        let ctx = RequestContext::new();
        let err = NoSubExecutor.execute_step(&ctx, "actions.x", "").await.unwrap_err();
        assert!(err.message.contains("actions.x"));
    }
}
