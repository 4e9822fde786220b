//! The `http` reference integration: a shared `reqwest::Client` exposed
//! through [`Fetcher`] (§4.C).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use servflow_error::ExecutionError;

use crate::error::IntegrationError;
use crate::traits::{FetchRequest, FetchResponse, Fetcher, Integration};

pub struct HttpIntegration {
    client: reqwest::Client,
}

impl HttpIntegration {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Build an [`crate::registry::Constructor`] for the registry. Config
    /// is ignored — a single shared client with default settings is
    /// enough for the reference integration and the end-to-end tests.
    pub fn constructor() -> crate::registry::Constructor {
        Arc::new(|_config: &Value| Ok(Arc::new(Self::new()) as Arc<dyn Integration>))
    }
}

impl Default for HttpIntegration {
    fn default() -> Self {
        Self::new()
    }
}

impl Integration for HttpIntegration {
    fn integration_type(&self) -> &str {
        "http"
    }

    fn as_fetcher(&self) -> Option<&dyn Fetcher> {
        Some(self)
    }
}

#[async_trait]
impl Fetcher for HttpIntegration {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, ExecutionError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|err| ExecutionError::fault(format!("invalid HTTP method: {err}")))?;

        let mut builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ExecutionError::fault(format!("request to {} failed: {err}", request.url)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect::<HashMap<_, _>>();

        let bytes = response
            .bytes()
            .await
            .map_err(|err| ExecutionError::fault(format!("failed to read response body: {err}")))?;
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        });

        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }
}

/// Used at action-construction time to cast a just-looked-up integration
/// to `Fetcher`, turning a capability mismatch into a configuration error
/// (§3: "a cast failure at action-construction time is a configuration
/// error, not a runtime error").
pub fn cast_fetcher<'a>(
    id: &str,
    integration: &'a dyn Integration,
) -> Result<&'a dyn Fetcher, IntegrationError> {
    integration
        .as_fetcher()
        .ok_or_else(|| IntegrationError::CapabilityNotSupported { id: id.to_string() })
}
