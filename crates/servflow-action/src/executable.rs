//! The `Executable` contract every action type implements (§3 DATA MODEL).

use async_trait::async_trait;
use serde_json::Value;
use servflow_context::RequestContext;
use servflow_error::ExecutionError;

/// A constructed action step, ready to run.
///
/// The runtime renders a step's `configTemplate` into a plain string
/// before calling [`execute`](Executable::execute) — `execute` never
/// sees `{{ }}` syntax, only the already-rendered config.
#[async_trait]
pub trait Executable: Send + Sync {
    /// The registered type name (`"http_request"`, `"static"`, ...).
    fn action_type(&self) -> &str;

    /// The canonical, unrendered config template this action was built
    /// from — captured at construction time so the compiler and the
    /// runtime's logging can refer back to it without re-serializing.
    fn config(&self) -> &str;

    async fn execute(
        &self,
        ctx: &RequestContext,
        rendered_config: &str,
    ) -> Result<Value, ExecutionError>;
}
