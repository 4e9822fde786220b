//! The `static` reference action: returns its `return` field verbatim,
//! with no side effects — used to terminate a branch with a fixed value
//! and to exercise the runtime in tests without any integration.

use async_trait::async_trait;
use serde_json::Value;
use servflow_context::RequestContext;
use servflow_error::ExecutionError;

use crate::executable::Executable;
use crate::registry::Constructor;

pub struct StaticAction {
    config: String,
}

impl StaticAction {
    pub fn constructor() -> Constructor {
        std::sync::Arc::new(|raw_config: &str, _integrations: &servflow_integration::IntegrationRegistry| {
            Ok(Box::new(StaticAction {
                config: raw_config.to_string(),
            }) as Box<dyn Executable>)
        })
    }
}

#[async_trait]
impl Executable for StaticAction {
    fn action_type(&self) -> &str {
        "static"
    }

    fn config(&self) -> &str {
        &self.config
    }

    async fn execute(
        &self,
        _ctx: &RequestContext,
        rendered_config: &str,
    ) -> Result<Value, ExecutionError> {
        let parsed: Value = serde_json::from_str(rendered_config)
            .map_err(|err| ExecutionError::fault(format!("static action config is not valid JSON: {err}")))?;
        Ok(parsed.get("return").cloned().unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servflow_integration::IntegrationRegistry;

    #[tokio::test]
    async fn returns_the_return_field() {
        let integrations = IntegrationRegistry::new();
        let action = StaticAction::constructor()(r#"{"return": {"ok": true}}"#, &integrations).unwrap();
        let ctx = RequestContext::new();
        let value = action.execute(&ctx, r#"{"return": {"ok": true}}"#).await.unwrap();
        assert_eq!(value, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn missing_return_field_is_null() {
        let integrations = IntegrationRegistry::new();
        let action = StaticAction::constructor()("{}", &integrations).unwrap();
        let ctx = RequestContext::new();
        let value = action.execute(&ctx, "{}").await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn invalid_json_is_a_fault() {
        let integrations = IntegrationRegistry::new();
        let action = StaticAction::constructor()("not json", &integrations).unwrap();
        let ctx = RequestContext::new();
        let err = action.execute(&ctx, "not json").await.unwrap_err();
        assert!(!err.clean_failure);
    }
}
