//! The error type `servflow-runtime`'s `Plan::execute` actually returns.

use servflow_core::StepRef;

use crate::ExecutionError;

/// Everything a plan walk can fail with, once a plan has already compiled
/// successfully (§7). `ConfigurationError` is deliberately absent — it
/// cannot occur here, only at compile time.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// An action's executable returned an error and no `fail` step was
    /// configured for it. Wraps the underlying cause per §7's
    /// `errExecutingAction`.
    #[error("error executing action `{step}`: {source}")]
    Action {
        step: StepRef,
        #[source]
        source: ExecutionError,
    },

    /// The walk referenced a step id absent from the compiled plan.
    /// Compilation should have caught this; reaching it at runtime means
    /// a bug in the compiler or a hand-built `Plan`.
    #[error("step not found: `{0}`")]
    StepNotFound(StepRef),

    /// The request's cancellation token fired mid-walk.
    #[error("context canceled")]
    ContextCanceled,

    /// The walk exceeded its configured step budget (§4.G, §9) — almost
    /// always a `next`-pointer cycle with no reachable terminal step.
    #[error("walk exceeded maximum of {0} steps without reaching a terminal step")]
    MaxStepsExceeded(usize),
}

impl RuntimeError {
    /// `true` for the one variant the parallel action is specified to
    /// treat as benign rather than an aggregate failure (§5, §7).
    pub fn is_context_canceled(&self) -> bool {
        matches!(self, Self::ContextCanceled)
    }
}
