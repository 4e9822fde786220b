//! [`RequestContext`]: the per-request variable store, protocol bindings,
//! and sub-execution support described in §4.D.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use servflow_error::ExecutionError;
use servflow_template::{Evaluator, PathSegment};
use tokio_util::sync::CancellationToken;

use crate::functions;
use crate::sub_executor::{NoSubExecutor, SubExecutionResult, SubExecutor};
use crate::validation::ValidationError;
use crate::variables::VariableStore;

/// Everything a plan step needs to render templates and run conditionals
/// against: the request's variables, the inbound HTTP protocol bindings,
/// and whatever an enclosing agent loop bound as tool parameters.
///
/// Not `Clone` — use [`fork`](Self::fork) to create an isolated child for
/// sub-execution; cloning the handle itself would share the very state
/// isolation exists to separate.
#[derive(Debug)]
pub struct RequestContext {
    variables: Arc<RwLock<VariableStore>>,
    validation_errors: Arc<RwLock<Vec<ValidationError>>>,
    headers: Arc<HashMap<String, String>>,
    query_params: Arc<HashMap<String, String>>,
    url_params: Arc<HashMap<String, String>>,
    body: Arc<Option<Value>>,
    tool_params: Arc<HashMap<String, Value>>,
    cancellation: CancellationToken,
    sub_executor: Arc<dyn SubExecutor>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            variables: Arc::new(RwLock::new(VariableStore::new())),
            validation_errors: Arc::new(RwLock::new(Vec::new())),
            headers: Arc::new(HashMap::new()),
            query_params: Arc::new(HashMap::new()),
            url_params: Arc::new(HashMap::new()),
            body: Arc::new(None),
            tool_params: Arc::new(HashMap::new()),
            cancellation: CancellationToken::new(),
            sub_executor: Arc::new(NoSubExecutor),
        }
    }

    /// Install the handle to the owning plan, letting actions trigger
    /// sub-executions by step id (§4.D). HTTP/MCP entry points call this
    /// when they build the top-level context for a request; contexts
    /// created without it reject `executeStep` with a clear error.
    #[must_use]
    pub fn with_sub_executor(mut self, sub_executor: Arc<dyn SubExecutor>) -> Self {
        self.sub_executor = sub_executor;
        self
    }

    pub async fn execute_step(
        &self,
        step_id: &str,
        end_template: &str,
    ) -> Result<SubExecutionResult, ExecutionError> {
        self.sub_executor.execute_step(self, step_id, end_template).await
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Arc::new(headers);
        self
    }

    #[must_use]
    pub fn with_query_params(mut self, params: HashMap<String, String>) -> Self {
        self.query_params = Arc::new(params);
        self
    }

    #[must_use]
    pub fn with_url_params(mut self, params: HashMap<String, String>) -> Self {
        self.url_params = Arc::new(params);
        self
    }

    /// Attach the already-parsed (and size-limited) request body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Arc::new(Some(body));
        self
    }

    #[must_use]
    pub fn with_tool_params(mut self, params: HashMap<String, Value>) -> Self {
        self.tool_params = Arc::new(params);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    #[must_use]
    pub fn with_variables(self, store: VariableStore) -> Self {
        *self.variables.write() = store;
        self
    }

    pub fn write_var(&self, prefix: &str, value: Value) {
        self.variables.write().write(prefix, value);
    }

    pub fn read_var(&self, path: &str) -> Option<Value> {
        self.variables.read().read(path)
    }

    pub(crate) fn push_validation_error(&self, error: ValidationError) {
        self.validation_errors.write().push(error);
    }

    pub fn validation_errors(&self) -> Vec<ValidationError> {
        self.validation_errors.read().clone()
    }

    pub(crate) fn header(&self, key: &str) -> Option<String> {
        self.headers.get(key).cloned()
    }

    pub(crate) fn query_param(&self, key: &str) -> Option<String> {
        self.query_params.get(key).cloned()
    }

    pub(crate) fn url_param(&self, key: &str) -> Option<String> {
        self.url_params.get(key).cloned()
    }

    pub(crate) fn tool_param(&self, key: &str) -> Option<Value> {
        self.tool_params.get(key).cloned()
    }

    pub(crate) fn body_path(&self, path: &str) -> Option<Value> {
        let body = self.body.as_ref().as_ref()?;
        if path.is_empty() {
            return Some(body.clone());
        }
        let mut current = body.clone();
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?.clone(),
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?.clone(),
                _ => return None,
            };
        }
        Some(current)
    }

    /// Fork a child context for `executeStep` sub-execution (§4.D).
    ///
    /// The child starts with a snapshot of the parent's variables and
    /// shares its protocol bindings, but its writes never propagate back
    /// — isolation-by-default, per the decision recorded in `DESIGN.md`.
    /// Its own cancellation token derives from the parent's so a parent
    /// cancellation still reaches the child.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            variables: Arc::new(RwLock::new(self.variables.read().clone())),
            validation_errors: Arc::new(RwLock::new(Vec::new())),
            headers: Arc::clone(&self.headers),
            query_params: Arc::clone(&self.query_params),
            url_params: Arc::clone(&self.url_params),
            body: Arc::clone(&self.body),
            tool_params: Arc::clone(&self.tool_params),
            cancellation: self.cancellation.child_token(),
            sub_executor: Arc::clone(&self.sub_executor),
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn check_cancelled(&self) -> Result<(), ExecutionError> {
        if self.cancellation.is_cancelled() {
            Err(ExecutionError::clean_failure("context canceled"))
        } else {
            Ok(())
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for RequestContext {
    fn resolve(&self, segments: &[PathSegment]) -> Option<Value> {
        let path = segments
            .iter()
            .map(|s| match s {
                PathSegment::Field(name) => name.clone(),
                PathSegment::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");
        self.read_var(&path)
    }

    fn call(
        &self,
        name: &str,
        args: &[Value],
    ) -> Result<Value, servflow_template::TemplateError> {
        functions::dispatch(self, name, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fork_sees_parent_variables_but_does_not_write_back() {
        let parent = RequestContext::new();
        parent.write_var("a", json!(1));
        let child = parent.fork();
        assert_eq!(child.read_var("a"), Some(json!(1)));

        child.write_var("a", json!(2));
        assert_eq!(child.read_var("a"), Some(json!(2)));
        assert_eq!(parent.read_var("a"), Some(json!(1)));
    }

    #[test]
    fn fork_has_its_own_validation_errors() {
        let parent = RequestContext::new();
        parent.push_validation_error(ValidationError::new("t", "m"));
        let child = parent.fork();
        assert!(child.validation_errors().is_empty());
    }

    #[test]
    fn cancellation_propagates_to_forked_child() {
        let parent = RequestContext::new();
        let child = parent.fork();
        assert!(child.check_cancelled().is_ok());
        parent.cancellation().cancel();
        assert!(child.check_cancelled().is_err());
    }

    #[test]
    fn protocol_bindings_are_readable_through_evaluator_call() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), "abc".to_string());
        let ctx = RequestContext::new().with_headers(headers);
        assert_eq!(ctx.call("header", &[json!("x-request-id")]).unwrap(), json!("abc"));
        assert_eq!(ctx.call("header", &[json!("missing")]).unwrap(), Value::Null);
    }

    #[test]
    fn body_path_navigates_nested_json() {
        let ctx = RequestContext::new().with_body(json!({"user": {"name": "Ada"}}));
        assert_eq!(ctx.body_path("user.name"), Some(json!("Ada")));
    }

    #[test]
    fn resolve_maps_path_segments_to_dotted_reads() {
        let ctx = RequestContext::new();
        ctx.write_var("p", json!({"x": 5}));
        let segments = vec![PathSegment::Field("p".into()), PathSegment::Field("x".into())];
        assert_eq!(ctx.resolve(&segments), Some(json!(5)));
    }
}
