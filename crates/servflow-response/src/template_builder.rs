//! A response built from a single template (§4.E).

use servflow_core::StatusCode;
use servflow_template::{Evaluator, Template};

use crate::built::BuiltResponse;
use crate::error::ResponseError;

/// Renders one template against the current context. `Content-Type` is
/// left unset — the caller (an HTTP/MCP binding) decides it.
pub struct TemplateBuilder {
    code: StatusCode,
    template: Template,
}

impl TemplateBuilder {
    pub fn new(code: StatusCode, template: Template) -> Self {
        Self { code, template }
    }

    /// Unlike `ObjectBuilder`, a failing render here has no individual
    /// leaf to fall back to — the whole body comes from one template,
    /// so the error propagates instead of being swallowed (§9).
    pub fn build(&self, evaluator: &dyn Evaluator) -> Result<BuiltResponse, ResponseError> {
        let body = self.template.render(evaluator)?;
        Ok(BuiltResponse {
            code: self.code.get(),
            content_type: None,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;
    impl Evaluator for Empty {
        fn resolve(&self, _segments: &[servflow_template::PathSegment]) -> Option<serde_json::Value> {
            Some(serde_json::Value::String("world".into()))
        }
        fn call(
            &self,
            _name: &str,
            _args: &[serde_json::Value],
        ) -> Result<serde_json::Value, servflow_template::TemplateError> {
            unreachable!("not exercised by these tests")
        }
    }

    #[test]
    fn renders_template_with_configured_code() {
        let template = Template::new("hello {{.name}}").unwrap();
        let builder = TemplateBuilder::new(StatusCode::new(200).unwrap(), template);
        let built = builder.build(&Empty).unwrap();
        assert_eq!(built.code, 200);
        assert_eq!(built.body, "hello world");
        assert_eq!(built.content_type, None);
    }

    #[test]
    fn unclosed_expression_propagates_as_an_error() {
        let err = Template::new("hello {{").unwrap_err();
        assert!(matches!(err, servflow_template::TemplateError::UnclosedExpression { .. }));
    }
}
