//! Evaluating a [`ConditionalStep`] against a context (§4.G).

use serde_json::Value;
use servflow_context::RequestContext;
use servflow_plan::{ConditionalKind, ConditionalStep};
use servflow_template::Evaluator;

use crate::error::RuntimeError;

/// A bare expression conditional is true iff it renders to the literal
/// string `"true"` (case-insensitive) — there is no general-purpose
/// boolean grammar here, just the textual-substitution contract §4.D
/// describes.
fn expression_is_true(rendered: &str) -> bool {
    rendered.trim().eq_ignore_ascii_case("true")
}

fn row_passes(row: &[servflow_plan::ConditionItem], ctx: &RequestContext) -> Result<bool, RuntimeError> {
    for item in row {
        let content = item.content.render(ctx)?;
        let mut args = vec![Value::String(content)];
        if let Some(comparison) = &item.comparison {
            args.push(Value::String(comparison.render(ctx)?));
        }
        args.push(Value::String(item.title.clone()));
        let result = ctx.call(&item.function, &args)?;
        if !matches!(result, Value::Bool(true)) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Disjunction of conjunctions (§3): true iff at least one row has every
/// item pass.
pub fn evaluate(step: &ConditionalStep, ctx: &RequestContext) -> Result<bool, RuntimeError> {
    match &step.kind {
        ConditionalKind::Expression(template) => Ok(expression_is_true(&template.render(ctx)?)),
        ConditionalKind::Structured(rows) => {
            for row in rows {
                if row_passes(row, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}
