//! Wires [`Runtime`] back into a [`RequestContext`] as its "handle to the
//! owning plan" (§4.D), so actions can call `ctx.execute_step(..)` without
//! `servflow-context` ever depending on `servflow-plan`/`servflow-runtime`.

use std::sync::Arc;

use servflow_context::{RequestContext, SubExecutionResult, SubExecutor};
use servflow_core::StepRef;
use servflow_error::ExecutionError;
use servflow_plan::Plan;

use crate::runtime::Runtime;

pub struct PlanSubExecutor {
    plan: Arc<Plan>,
    runtime: Arc<Runtime>,
}

impl PlanSubExecutor {
    pub fn new(plan: Arc<Plan>, runtime: Arc<Runtime>) -> Self {
        Self { plan, runtime }
    }
}

#[async_trait::async_trait]
impl SubExecutor for PlanSubExecutor {
    async fn execute_step(
        &self,
        ctx: &RequestContext,
        step_id: &str,
        end_template: &str,
    ) -> Result<SubExecutionResult, ExecutionError> {
        let step =
            StepRef::parse(step_id).map_err(|err| ExecutionError::fault(err.to_string()))?;
        let child = ctx.fork();

        let outcome = self.runtime.execute(&self.plan, &child, step, end_template).await;
        match outcome {
            Ok(built) => Ok(SubExecutionResult { code: built.code, body: built.body }),
            Err(err) if err.is_context_canceled() => Err(ExecutionError::canceled(err.to_string())),
            Err(err) => Err(ExecutionError::fault(err.to_string())),
        }
    }
}
