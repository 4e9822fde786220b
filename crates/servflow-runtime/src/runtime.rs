//! The iterative plan walker (§4.G): no recursion across steps, an
//! explicit "current step" pointer bounded by `max_steps`.

use serde_json::Value;
use servflow_context::RequestContext;
use servflow_core::{Namespace, StepRef};
use servflow_plan::Plan;
use servflow_response::BuiltResponse;
use servflow_template::Template;

use crate::conditional;
use crate::error::RuntimeError;

const DEFAULT_MAX_STEPS: usize = 10_000;

pub struct Runtime {
    max_steps: usize,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self { max_steps: DEFAULT_MAX_STEPS }
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Walk `plan` starting at `start`. If `end_template` is non-empty,
    /// the walk still runs to whatever terminal step it would otherwise
    /// reach, but the returned body is `end_template` rendered against
    /// the final context instead of the terminal response's own body —
    /// this is how `executeStep`/sub-execution ask for "just a computed
    /// value" rather than a full response (§4.G, §4.D "Sub-execution").
    pub async fn execute(
        &self,
        plan: &Plan,
        ctx: &RequestContext,
        start: StepRef,
        end_template: &str,
    ) -> Result<BuiltResponse, RuntimeError> {
        let mut current = start;
        let mut steps = 0usize;

        loop {
            steps += 1;
            if steps > self.max_steps {
                return Err(RuntimeError::MaxStepsExceeded(self.max_steps));
            }
            if ctx.check_cancelled().is_err() {
                return Err(RuntimeError::ContextCanceled);
            }

            match current.namespace() {
                Namespace::Action => {
                    let action = plan
                        .action(current.id())
                        .ok_or_else(|| RuntimeError::UnknownStep(current.to_string()))?;

                    // Template-rendering failure before `execute` routes
                    // exactly like an execution failure (§4.G).
                    let outcome = match action.config_template.render(ctx) {
                        Ok(rendered) => action.exec.execute(ctx, &rendered).await,
                        Err(err) => Err(servflow_error::ExecutionError::template(err.to_string())),
                    };

                    match outcome {
                        Ok(value) => {
                            ctx.write_var(&action.output_key, value);
                            current = match action.on_success.clone() {
                                Some(next) => next,
                                // No `next` configured (§6 `next?`): success ends the
                                // walk here, same as reaching a bare `EndStep`.
                                None => return self.render_end(ctx, end_template),
                            };
                        }
                        Err(err) => {
                            if let Some(result) = self.route_action_failure(ctx, action, err) {
                                return result;
                            }
                            current = action
                                .on_failure
                                .clone()
                                .expect("route_action_failure only returns None when on_failure is set");
                        }
                    }
                }
                Namespace::Conditional => {
                    let step = plan
                        .conditional(current.id())
                        .ok_or_else(|| RuntimeError::UnknownStep(current.to_string()))?;
                    current = if conditional::evaluate(step, ctx)? {
                        step.on_true.clone()
                    } else {
                        step.on_false.clone()
                    };
                }
                Namespace::Response => {
                    let response = plan
                        .response(current.id())
                        .ok_or_else(|| RuntimeError::UnknownStep(current.to_string()))?;

                    if !end_template.is_empty() {
                        return self.render_end(ctx, end_template);
                    }

                    return match &response.builder {
                        servflow_plan::ResponseBuilderKind::Template(builder) => {
                            Ok(builder.build(ctx)?)
                        }
                        servflow_plan::ResponseBuilderKind::Object(builder) => Ok(builder.build(ctx)?),
                    };
                }
            }
        }
    }

    /// Terminate the walk the way an `EndStep` with no destination does:
    /// render `end_template` against `ctx` if the caller supplied one,
    /// else return a bare empty 200 (§3 `EndStep`, §4.G).
    fn render_end(&self, ctx: &RequestContext, end_template: &str) -> Result<BuiltResponse, RuntimeError> {
        if end_template.is_empty() {
            return Ok(BuiltResponse { code: 200, content_type: None, body: String::new() });
        }
        let template = Template::new(end_template)?;
        let body = template.render(ctx)?;
        Ok(BuiltResponse { code: 200, content_type: None, body })
    }

    /// Record the `{outputKey, _error}` writes an action failure makes
    /// and decide routing: `Some(Err(..))` if the walk must stop because
    /// there is no `onFailure`, `None` if the caller should continue to
    /// `action.on_failure`.
    fn route_action_failure(
        &self,
        ctx: &RequestContext,
        action: &servflow_plan::ActionStep,
        err: servflow_error::ExecutionError,
    ) -> Option<Result<BuiltResponse, RuntimeError>> {
        ctx.write_var(&action.output_key, Value::String(format!("error: {}", err.message)));
        ctx.write_var("_error", Value::String(err.message.clone()));
        if action.on_failure.is_some() {
            None
        } else {
            Some(Err(RuntimeError::ExecutingAction { action_id: action.id.clone(), message: err.message }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use servflow_action::ActionRegistry;
    use servflow_integration::IntegrationRegistry;

    fn compile(config: serde_json::Value) -> Plan {
        let config: servflow_plan::ApiConfig = serde_json::from_value(config).unwrap();
        let actions = ActionRegistry::new();
        actions
            .register(
                "static",
                servflow_action::StaticAction::constructor(),
                servflow_action::ActionInfo::new("s", "s"),
            )
            .unwrap();
        let integrations = IntegrationRegistry::new();
        servflow_plan::compile(&config, &actions, &integrations).unwrap()
    }

    #[tokio::test]
    async fn walks_action_to_response_and_renders_the_written_variable() {
        let plan = compile(json!({
            "id": "demo",
            "http": {"listenPath": "/echo", "method": "GET", "next": "actions.a"},
            "actions": {
                "a": {"type": "static", "config": {"return": "hi"}, "next": "responses.r"}
            },
            "responses": {"r": {"code": 200, "template": "{{ .variable_actions_a }}"}}
        }));
        let ctx = RequestContext::new();
        let runtime = Runtime::new();
        let built = runtime.execute(&plan, &ctx, StepRef::action("a"), "").await.unwrap();
        assert_eq!(built.code, 200);
        assert_eq!(built.body, "hi");
    }

    #[tokio::test]
    async fn end_template_overrides_the_terminal_response_body() {
        let plan = compile(json!({
            "id": "demo",
            "http": {"listenPath": "/echo", "method": "GET", "next": "actions.a"},
            "actions": {
                "a": {"type": "static", "config": {"return": "hi"}, "next": "responses.r"}
            },
            "responses": {"r": {"code": 200, "template": "unused"}}
        }));
        let ctx = RequestContext::new();
        let runtime = Runtime::new();
        let built = runtime
            .execute(&plan, &ctx, StepRef::action("a"), "{{ .variable_actions_a }}!")
            .await
            .unwrap();
        assert_eq!(built.body, "hi!");
        assert_eq!(built.code, 200);
    }

    #[tokio::test]
    async fn action_without_next_ends_the_walk_with_a_bare_response() {
        let plan = compile(json!({
            "id": "demo",
            "http": {"listenPath": "/x", "method": "GET", "next": "actions.a"},
            "actions": {
                "a": {"type": "static", "config": {"return": "hi"}}
            }
        }));
        let ctx = RequestContext::new();
        let runtime = Runtime::new();
        let built = runtime.execute(&plan, &ctx, StepRef::action("a"), "").await.unwrap();
        assert_eq!(built.code, 200);
        assert_eq!(built.body, "");
    }

    #[tokio::test]
    async fn action_without_next_still_renders_an_end_template() {
        let plan = compile(json!({
            "id": "demo",
            "http": {"listenPath": "/x", "method": "GET", "next": "actions.a"},
            "actions": {
                "a": {"type": "static", "config": {"return": "hi"}}
            }
        }));
        let ctx = RequestContext::new();
        let runtime = Runtime::new();
        let built = runtime
            .execute(&plan, &ctx, StepRef::action("a"), "{{ .variable_actions_a }}!")
            .await
            .unwrap();
        assert_eq!(built.body, "hi!");
    }

    #[tokio::test]
    async fn conditional_true_branch_is_followed() {
        let plan = compile(json!({
            "id": "demo",
            "http": {"listenPath": "/x", "method": "GET", "next": "conditionals.c"},
            "conditionals": {
                "c": {"expression": "true", "onTrue": "responses.yes", "onFalse": "responses.no"}
            },
            "responses": {
                "yes": {"code": 200, "template": "yes"},
                "no": {"code": 200, "template": "no"}
            }
        }));
        let ctx = RequestContext::new();
        let runtime = Runtime::new();
        let built = runtime.execute(&plan, &ctx, StepRef::conditional("c"), "").await.unwrap();
        assert_eq!(built.body, "yes");
    }

    #[tokio::test]
    async fn action_failure_without_fail_propagates() {
        let plan = compile(json!({
            "id": "demo",
            "http": {"listenPath": "/x", "method": "GET", "next": "actions.a"},
            "actions": {
                "a": {"type": "static", "config": {"return": "{{ nope }}"}, "next": "responses.r"}
            },
            "responses": {"r": {"code": 200, "template": "unused"}}
        }));
        let ctx = RequestContext::new();
        let runtime = Runtime::new();
        let err = runtime.execute(&plan, &ctx, StepRef::action("a"), "").await.unwrap_err();
        assert!(matches!(err, RuntimeError::ExecutingAction { .. }));
    }

    #[tokio::test]
    async fn action_failure_with_fail_routes_there_and_writes_error_var() {
        let plan = compile(json!({
            "id": "demo",
            "http": {"listenPath": "/x", "method": "GET", "next": "actions.a"},
            "actions": {
                "a": {"type": "static", "config": {"return": "{{ nope }}"}, "next": "responses.r", "fail": "responses.f"}
            },
            "responses": {
                "r": {"code": 200, "template": "unused"},
                "f": {"code": 500, "template": "{{ ._error }}"}
            }
        }));
        let ctx = RequestContext::new();
        let runtime = Runtime::new();
        let built = runtime.execute(&plan, &ctx, StepRef::action("a"), "").await.unwrap();
        assert_eq!(built.code, 500);
        assert!(!built.body.is_empty());
    }

    #[tokio::test]
    async fn max_steps_exceeded_on_a_self_looping_conditional() {
        let plan = compile(json!({
            "id": "demo",
            "http": {"listenPath": "/x", "method": "GET", "next": "conditionals.c"},
            "conditionals": {
                "c": {"expression": "false", "onTrue": "responses.r", "onFalse": "conditionals.c"}
            },
            "responses": {"r": {"code": 200, "template": "unused"}}
        }));
        let ctx = RequestContext::new();
        let runtime = Runtime::new().with_max_steps(5);
        let err = runtime.execute(&plan, &ctx, StepRef::conditional("c"), "").await.unwrap_err();
        assert!(matches!(err, RuntimeError::MaxStepsExceeded(5)));
    }

    #[tokio::test]
    async fn canceled_context_stops_the_walk() {
        let plan = compile(json!({
            "id": "demo",
            "http": {"listenPath": "/x", "method": "GET", "next": "actions.a"},
            "actions": {
                "a": {"type": "static", "config": {"return": "hi"}, "next": "responses.r"}
            },
            "responses": {"r": {"code": 200, "template": "unused"}}
        }));
        let ctx = RequestContext::new();
        ctx.cancellation().cancel();
        let runtime = Runtime::new();
        let err = runtime.execute(&plan, &ctx, StepRef::action("a"), "").await.unwrap_err();
        assert!(err.is_context_canceled());
    }
}
