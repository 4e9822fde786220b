//! The `parallel` reference action (§4.B, §5): fans out to other steps by
//! id through the context's sub-execution handle, each against its own
//! forked, isolated child context.

use async_trait::async_trait;
use serde_json::{json, Value};
use servflow_context::RequestContext;
use servflow_error::ExecutionError;

use crate::executable::Executable;
use crate::registry::Constructor;

#[derive(serde::Deserialize)]
struct ParallelConfig {
    steps: Vec<String>,
    #[serde(rename = "stopOnFailure", default)]
    stop_on_failure: bool,
}

pub struct ParallelAction;

impl ParallelAction {
    pub fn constructor() -> Constructor {
        std::sync::Arc::new(|_config, _integrations| Ok(Box::new(ParallelAction) as Box<dyn Executable>))
    }
}

#[async_trait]
impl Executable for ParallelAction {
    fn action_type(&self) -> &str {
        "parallel"
    }

    fn config(&self) -> &str {
        "parallel"
    }

    async fn execute(&self, ctx: &RequestContext, rendered_config: &str) -> Result<Value, ExecutionError> {
        let config: ParallelConfig = serde_json::from_str(rendered_config)
            .map_err(|err| ExecutionError::fault(format!("invalid parallel config: {err}")))?;

        let outcomes = futures::future::join_all(
            config.steps.iter().map(|step| ctx.execute_step(step, "")),
        )
        .await;

        if config.stop_on_failure {
            if let Some((step, err)) = config
                .steps
                .iter()
                .zip(outcomes.iter())
                .find_map(|(step, outcome)| match outcome {
                    Err(err) if !err.canceled => Some((step, err)),
                    _ => None,
                })
            {
                return Err(ExecutionError::fault(format!(
                    "parallel step `{step}` failed: {}",
                    err.message
                )));
            }
        }

        let results: Vec<Value> = config
            .steps
            .iter()
            .zip(outcomes)
            .filter_map(|(step, outcome)| match outcome {
                Ok(result) => Some(json!({"step": step, "ok": true, "code": result.code, "body": result.body})),
                Err(err) if err.canceled => None,
                Err(err) => Some(json!({"step": step, "ok": false, "error": err.message})),
            })
            .collect();

        Ok(Value::Array(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json as j;
    use servflow_context::{SubExecutionResult, SubExecutor};

    struct Stub;

    #[async_trait]
    impl SubExecutor for Stub {
        async fn execute_step(
            &self,
            ctx: &RequestContext,
            step_id: &str,
            _end_template: &str,
        ) -> Result<SubExecutionResult, ExecutionError> {
            match step_id {
                "actions.ok" => Ok(SubExecutionResult { code: 200, body: "done".into() }),
                "actions.canceled" => Err(ExecutionError::canceled("canceled")),
                _ => {
                    let _ = ctx;
                    Err(ExecutionError::fault("boom"))
                }
            }
        }
    }

    fn ctx_with_stub() -> RequestContext {
        RequestContext::new().with_sub_executor(std::sync::Arc::new(Stub))
    }

    #[tokio::test]
    async fn aggregates_successes_and_real_failures_ignoring_canceled() {
        let ctx = ctx_with_stub();
        let config = j!({"steps": ["actions.ok", "actions.fails", "actions.canceled"], "stopOnFailure": false})
            .to_string();
        let result = ParallelAction.execute(&ctx, &config).await.unwrap();
        let items = result.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["ok"], j!(true));
        assert_eq!(items[1]["ok"], j!(false));
    }

    #[tokio::test]
    async fn stop_on_failure_propagates_the_first_real_error() {
        let ctx = ctx_with_stub();
        let config = j!({"steps": ["actions.ok", "actions.fails"], "stopOnFailure": true}).to_string();
        let err = ParallelAction.execute(&ctx, &config).await.unwrap_err();
        assert!(err.message.contains("actions.fails"));
    }

    #[tokio::test]
    async fn stop_on_failure_does_not_trip_on_canceled_steps() {
        let ctx = ctx_with_stub();
        let config = j!({"steps": ["actions.ok", "actions.canceled"], "stopOnFailure": true}).to_string();
        let result = ParallelAction.execute(&ctx, &config).await.unwrap();
        assert_eq!(result.as_array().unwrap().len(), 1);
    }
}
