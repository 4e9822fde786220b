//! The `http_request` reference action: calls a configured `Fetcher`
//! integration. The integration is resolved and capability-cast once at
//! construction time, so a misconfigured `integration` id surfaces as a
//! configuration error rather than failing on first execution.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use servflow_context::RequestContext;
use servflow_core::HttpMethod;
use servflow_error::ExecutionError;
use servflow_integration::{cast_fetcher, FetchRequest, Integration, IntegrationRegistry};

use crate::error::ActionRegistryError;
use crate::executable::Executable;
use crate::registry::Constructor;

pub struct HttpRequestAction {
    config: String,
    integration_id: String,
    integration: Arc<dyn Integration>,
}

impl HttpRequestAction {
    pub fn constructor() -> Constructor {
        Arc::new(|raw_config: &str, integrations: &IntegrationRegistry| {
            let parsed: Value = serde_json::from_str(raw_config).map_err(|err| {
                ActionRegistryError::ConstructionFailed {
                    type_name: "http_request".into(),
                    message: format!("config is not valid JSON: {err}"),
                }
            })?;

            let integration_id = parsed
                .get("integration")
                .and_then(Value::as_str)
                .ok_or_else(|| ActionRegistryError::ConstructionFailed {
                    type_name: "http_request".into(),
                    message: "missing `integration` field".into(),
                })?
                .to_string();

            let integration = integrations.get(&integration_id).map_err(|err| {
                ActionRegistryError::ConstructionFailed {
                    type_name: "http_request".into(),
                    message: err.to_string(),
                }
            })?;

            cast_fetcher(&integration_id, integration.as_ref()).map_err(|err| {
                ActionRegistryError::ConstructionFailed {
                    type_name: "http_request".into(),
                    message: err.to_string(),
                }
            })?;

            Ok(Box::new(HttpRequestAction {
                config: raw_config.to_string(),
                integration_id,
                integration,
            }) as Box<dyn Executable>)
        })
    }
}

fn parse_method(raw: &str) -> Result<HttpMethod, ExecutionError> {
    match raw.to_ascii_uppercase().as_str() {
        "GET" => Ok(HttpMethod::Get),
        "POST" => Ok(HttpMethod::Post),
        "PUT" => Ok(HttpMethod::Put),
        "PATCH" => Ok(HttpMethod::Patch),
        "DELETE" => Ok(HttpMethod::Delete),
        "OPTIONS" => Ok(HttpMethod::Options),
        "HEAD" => Ok(HttpMethod::Head),
        other => Err(ExecutionError::fault(format!("unknown HTTP method `{other}`"))),
    }
}

#[async_trait]
impl Executable for HttpRequestAction {
    fn action_type(&self) -> &str {
        "http_request"
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
            .map_err(|err| ExecutionError::fault(format!("http_request config is not valid JSON: {err}")))?;

        let method = match parsed.get("method").and_then(Value::as_str) {
            Some(raw) => parse_method(raw)?,
            None => HttpMethod::Get,
        };

        let url = parsed
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| ExecutionError::fault("http_request config is missing `url`"))?;

        let headers = parsed
            .get("headers")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        let mut request = FetchRequest::new(method, url);
        request.headers = headers;
        request.body = parsed.get("body").cloned();

        // Re-cast on every call instead of storing `&dyn Fetcher` — the
        // construction-time cast already proved the capability exists,
        // this one is cheap and keeps the struct free of a borrowed
        // reference into `self.integration`.
        let fetcher = cast_fetcher(&self.integration_id, self.integration.as_ref())
            .map_err(|err| ExecutionError::fault(err.to_string()))?;
        let response = fetcher.fetch(request).await?;

        Ok(serde_json::json!({
            "status": response.status,
            "headers": response.headers,
            "body": response.body,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servflow_integration::InMemoryIntegration;

    fn registry_with_in_memory() -> IntegrationRegistry {
        let registry = IntegrationRegistry::new();
        registry.register_constructor("in_memory", InMemoryIntegration::constructor());
        registry.initialize("in_memory", "store", &serde_json::json!({})).unwrap();
        registry
    }

    #[test]
    fn missing_integration_field_is_a_construction_error() {
        let integrations = registry_with_in_memory();
        let err = HttpRequestAction::constructor()(r#"{"url": "k"}"#, &integrations).unwrap_err();
        assert!(matches!(err, ActionRegistryError::ConstructionFailed { .. }));
    }

    #[test]
    fn unknown_integration_id_is_a_construction_error() {
        let integrations = registry_with_in_memory();
        let err = HttpRequestAction::constructor()(
            r#"{"integration": "missing", "url": "k"}"#,
            &integrations,
        )
        .unwrap_err();
        assert!(matches!(err, ActionRegistryError::ConstructionFailed { .. }));
    }

    #[tokio::test]
    async fn executes_against_the_cast_integration() {
        let integrations = registry_with_in_memory();
        let integration = integrations.get("store").unwrap();
        servflow_integration::cast_fetcher("store", integration.as_ref())
            .unwrap();
        // Seed a value through the Storer capability directly.
        let storer = integration.as_storer().unwrap();
        storer.store("k", serde_json::json!(42)).await.unwrap();

        let action = HttpRequestAction::constructor()(
            r#"{"integration": "store", "url": "k"}"#,
            &integrations,
        )
        .unwrap();
        let ctx = RequestContext::new();
        let value = action
            .execute(&ctx, r#"{"integration": "store", "url": "k"}"#)
            .await
            .unwrap();
        assert_eq!(value["body"], serde_json::json!(42));
        assert_eq!(value["status"], 200);
    }
}
