//! Request-scoped state for a single Servflow invocation (§4.D): the
//! variable store, built-in and protocol-binding functions, and the
//! isolation-by-default fork used for sub-execution.
//!
//! This crate is the sole implementor of `servflow_template::Evaluator`
//! in the workspace — template rendering elsewhere always goes through a
//! [`RequestContext`] or a [`SecretEvaluator`].

mod context;
mod functions;
mod secret;
mod sub_executor;
mod validation;
mod variables;

pub use context::RequestContext;
pub use secret::SecretEvaluator;
pub use sub_executor::{NoSubExecutor, SubExecutionResult, SubExecutor};
pub use validation::ValidationError;
pub use variables::VariableStore;
