//! The `in_memory` reference integration: a `dashmap`-backed key/value
//! store implementing `Fetcher`+`Storer`+`Updater`+`Deleter`, used to
//! exercise capability casts in tests without network I/O (§4.C).

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use servflow_error::ExecutionError;

use crate::traits::{Deleter, FetchRequest, FetchResponse, Fetcher, Integration, Storer, Updater};

#[derive(Default)]
pub struct InMemoryIntegration {
    store: DashMap<String, Value>,
}

impl InMemoryIntegration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constructor() -> crate::registry::Constructor {
        Arc::new(|_config: &Value| Ok(Arc::new(Self::new()) as Arc<dyn Integration>))
    }
}

impl Integration for InMemoryIntegration {
    fn integration_type(&self) -> &str {
        "in_memory"
    }

    fn as_fetcher(&self) -> Option<&dyn Fetcher> {
        Some(self)
    }
    fn as_storer(&self) -> Option<&dyn Storer> {
        Some(self)
    }
    fn as_updater(&self) -> Option<&dyn Updater> {
        Some(self)
    }
    fn as_deleter(&self) -> Option<&dyn Deleter> {
        Some(self)
    }
}

#[async_trait]
impl Fetcher for InMemoryIntegration {
    /// `request.url` doubles as the store key for this reference
    /// integration — there is no real network boundary to speak of.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, ExecutionError> {
        let body = self
            .store
            .get(&request.url)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ExecutionError::clean_failure(format!("no value stored for `{}`", request.url)))?;
        Ok(FetchResponse {
            status: 200,
            headers: Default::default(),
            body,
        })
    }
}

#[async_trait]
impl Storer for InMemoryIntegration {
    async fn store(&self, key: &str, value: Value) -> Result<(), ExecutionError> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl Updater for InMemoryIntegration {
    async fn update(&self, key: &str, value: Value) -> Result<(), ExecutionError> {
        if !self.store.contains_key(key) {
            return Err(ExecutionError::clean_failure(format!(
                "no value stored for `{key}` to update"
            )));
        }
        self.store.insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl Deleter for InMemoryIntegration {
    async fn delete(&self, key: &str) -> Result<(), ExecutionError> {
        self.store
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| ExecutionError::clean_failure(format!("no value stored for `{key}` to delete")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servflow_core::HttpMethod;

    #[tokio::test]
    async fn store_then_fetch_round_trips() {
        let integration = InMemoryIntegration::new();
        integration.store("k", serde_json::json!(42)).await.unwrap();
        let response = integration
            .fetch(FetchRequest::new(HttpMethod::Get, "k"))
            .await
            .unwrap();
        assert_eq!(response.body, serde_json::json!(42));
    }

    #[tokio::test]
    async fn fetch_missing_key_is_a_clean_failure() {
        let integration = InMemoryIntegration::new();
        let err = integration
            .fetch(FetchRequest::new(HttpMethod::Get, "missing"))
            .await
            .unwrap_err();
        assert!(err.clean_failure);
    }

    #[tokio::test]
    async fn update_requires_existing_key() {
        let integration = InMemoryIntegration::new();
        assert!(integration.update("k", serde_json::json!(1)).await.is_err());
        integration.store("k", serde_json::json!(1)).await.unwrap();
        assert!(integration.update("k", serde_json::json!(2)).await.is_ok());
    }

    #[tokio::test]
    async fn delete_removes_the_key() {
        let integration = InMemoryIntegration::new();
        integration.store("k", serde_json::json!(1)).await.unwrap();
        integration.delete("k").await.unwrap();
        assert!(integration.delete("k").await.is_err());
    }

    #[test]
    fn advertises_all_four_crud_capabilities() {
        let integration = InMemoryIntegration::new();
        assert!(integration.as_fetcher().is_some());
        assert!(integration.as_storer().is_some());
        assert!(integration.as_updater().is_some());
        assert!(integration.as_deleter().is_some());
    }
}
