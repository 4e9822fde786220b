//! A minimal evaluator exposing only `secret(name)`, used by
//! `servflow-integration` to pre-expand string config values before
//! construction (§4.C): "each `config` value that is a string is
//! pre-expanded through the template engine with only the `secret(name)`
//! function in scope".

use serde_json::Value;
use servflow_template::{Evaluator, PathSegment, TemplateError};

/// Has no variables at all — any `.path` expression resolves to `None`.
/// The only callable function is `secret`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecretEvaluator;

impl Evaluator for SecretEvaluator {
    fn resolve(&self, _segments: &[PathSegment]) -> Option<Value> {
        None
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, TemplateError> {
        if name != "secret" {
            return Err(TemplateError::UnknownFunction {
                name: name.to_string(),
            });
        }
        let Some(Value::String(key)) = args.first() else {
            return Err(TemplateError::ArityMismatch {
                name: name.to_string(),
                expected: 1,
                actual: args.len(),
            });
        };
        Ok(Value::String(std::env::var(key).unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(unsafe_code)]
    fn resolves_secret_from_environment() {
        // SAFETY: test-only, single-threaded access to a test-scoped var.
        unsafe { std::env::set_var("SERVFLOW_SECRET_EVAL_TEST", "value") };
        let evaluator = SecretEvaluator;
        assert_eq!(
            evaluator
                .call("secret", &[Value::String("SERVFLOW_SECRET_EVAL_TEST".into())])
                .unwrap(),
            Value::String("value".into())
        );
    }

    #[test]
    fn missing_secret_renders_empty() {
        let evaluator = SecretEvaluator;
        assert_eq!(
            evaluator
                .call("secret", &[Value::String("SERVFLOW_SECRET_EVAL_MISSING".into())])
                .unwrap(),
            Value::String(String::new())
        );
    }

    #[test]
    fn any_path_resolves_to_none() {
        let evaluator = SecretEvaluator;
        assert_eq!(evaluator.resolve(&[PathSegment::Field("x".into())]), None);
    }

    #[test]
    fn any_other_function_is_unknown() {
        let evaluator = SecretEvaluator;
        assert!(evaluator.call("header", &[]).is_err());
    }
}
