//! The two-layer integration registry (§4.C): type → constructor, and
//! id → live instance.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::error::{IntegrationError, IntegrationInitError};
use crate::secrets::expand_secrets;
use crate::traits::Integration;

/// Builds a live integration from its (secret-expanded) configuration.
pub type Constructor =
    Arc<dyn Fn(&Value) -> Result<Arc<dyn Integration>, IntegrationError> + Send + Sync>;

#[derive(Default)]
pub struct IntegrationRegistry {
    constructors: DashMap<String, Constructor>,
    instances: DashMap<String, Arc<dyn Integration>>,
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_constructor(
        &self,
        type_name: impl Into<String>,
        constructor: Constructor,
    ) {
        self.constructors.insert(type_name.into(), constructor);
    }

    /// Look up `type_name`'s constructor, expand secret-templated string
    /// leaves in `config`, construct, and store the result under `id`.
    pub fn initialize(
        &self,
        type_name: &str,
        id: impl Into<String>,
        config: &Value,
    ) -> Result<(), IntegrationError> {
        let id = id.into();
        let constructor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| IntegrationError::UnknownType(type_name.to_string()))?
            .clone();
        let expanded = expand_secrets(config);
        let instance = constructor(&expanded).map_err(|err| match err {
            IntegrationError::ConstructionFailed { message, .. } => {
                IntegrationError::ConstructionFailed {
                    id: id.clone(),
                    type_name: type_name.to_string(),
                    message,
                }
            }
            other => other,
        })?;
        self.instances.insert(id, instance);
        Ok(())
    }

    /// Initialize every `(type, id, config)` triple concurrently,
    /// aggregating failures instead of stopping at the first one (§4.C).
    pub async fn initialize_all(
        &self,
        configs: Vec<(String, String, Value)>,
    ) -> Result<(), IntegrationInitError> {
        let results = futures::future::join_all(
            configs
                .into_iter()
                .map(|(type_name, id, config)| async move {
                    self.initialize(&type_name, id, &config)
                }),
        )
        .await;

        let errors = results.into_iter().filter_map(Result::err).collect::<Vec<_>>();
        IntegrationInitError { errors }.into_result()
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn Integration>, IntegrationError> {
        self.instances
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| IntegrationError::NotFound(id.to_string()))
    }

    pub fn has(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.instances.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Integration;
    use serde_json::json;

    struct Dummy;
    impl Integration for Dummy {
        fn integration_type(&self) -> &str {
            "dummy"
        }
    }

    fn registry_with_dummy() -> IntegrationRegistry {
        let registry = IntegrationRegistry::new();
        registry.register_constructor(
            "dummy",
            Arc::new(|_config: &Value| Ok(Arc::new(Dummy) as Arc<dyn Integration>)),
        );
        registry
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry = IntegrationRegistry::new();
        let err = registry.initialize("nope", "id1", &json!({})).unwrap_err();
        assert!(matches!(err, IntegrationError::UnknownType(_)));
    }

    #[test]
    fn initialize_then_get_succeeds() {
        let registry = registry_with_dummy();
        registry.initialize("dummy", "d1", &json!({})).unwrap();
        assert!(registry.has("d1"));
        assert_eq!(registry.get("d1").unwrap().integration_type(), "dummy");
    }

    #[test]
    fn get_missing_instance_is_an_error() {
        let registry = IntegrationRegistry::new();
        assert!(matches!(
            registry.get("missing"),
            Err(IntegrationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn initialize_all_aggregates_failures() {
        let registry = registry_with_dummy();
        let result = registry
            .initialize_all(vec![
                ("dummy".to_string(), "ok".to_string(), json!({})),
                ("missing-type".to_string(), "bad".to_string(), json!({})),
            ])
            .await;
        let err = result.unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert!(registry.has("ok"));
    }

    #[tokio::test]
    async fn initialize_all_of_empty_list_succeeds() {
        let registry = IntegrationRegistry::new();
        assert!(registry.initialize_all(vec![]).await.is_ok());
    }
}
