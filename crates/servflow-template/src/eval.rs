//! Evaluating a parsed [`Expr`] against a variable/function source.

use serde_json::Value;

use crate::error::TemplateError;
use crate::expr::{Expr, PathSegment};

/// The seam between this crate and whoever owns the actual variables and
/// named functions (`servflow-context`, per the request-context-owned
/// function design in §4.E). Keeping this a trait instead of a concrete
/// type is what lets `servflow-template` have no dependency on
/// `servflow-context`, even though most functions in practice need
/// request-scoped state (secrets, headers, params).
pub trait Evaluator {
    /// Resolve a dotted path against whatever variable store backs this
    /// evaluator. Returns `None` (not an error) when the path is absent —
    /// rendering a missing variable produces an empty string, matching
    /// the teacher's "absent secret renders empty" convention carried
    /// through to paths in general.
    fn resolve(&self, segments: &[PathSegment]) -> Option<Value>;

    /// Dispatch a named function call with its already-evaluated
    /// arguments.
    fn call(&self, name: &str, args: &[Value]) -> Result<Value, TemplateError>;
}

/// Evaluate a parsed expression. `position` is only used to annotate
/// errors raised directly here (path/arg evaluation); errors returned by
/// [`Evaluator::call`] are expected to already carry their own context.
pub fn eval_expr(expr: &Expr, evaluator: &dyn Evaluator) -> Result<Value, TemplateError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Path(segments) => Ok(evaluator.resolve(segments).unwrap_or(Value::Null)),
        Expr::Call { name, args } => {
            let values = args
                .iter()
                .map(|a| eval_expr(a, evaluator))
                .collect::<Result<Vec<_>, _>>()?;
            evaluator.call(name, &values)
        }
    }
}

/// Render an evaluated [`Value`] as the text that goes into the template
/// output: strings pass through verbatim, everything else is its JSON
/// form, and `null` renders as the empty string.
pub fn value_to_rendered_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
