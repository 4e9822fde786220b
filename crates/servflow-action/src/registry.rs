//! The action-type registry (§4.B): type name → `{constructor, info}`.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use servflow_integration::IntegrationRegistry;

use crate::actions::{
    http_request::HttpRequestAction, parallel::ParallelAction, static_action::StaticAction,
};
use crate::error::ActionRegistryError;
use crate::executable::Executable;
use crate::metadata::ActionInfo;

/// Builds an [`Executable`] from a raw (unrendered) config string,
/// resolving any integration it needs from `integrations` so that a
/// capability mismatch surfaces as a configuration error here rather
/// than at first execution.
pub type Constructor = Arc<
    dyn Fn(&str, &IntegrationRegistry) -> Result<Box<dyn Executable>, ActionRegistryError>
        + Send
        + Sync,
>;

struct Entry {
    constructor: Constructor,
    info: ActionInfo,
}

#[derive(Default)]
pub struct ActionRegistry {
    entries: DashMap<String, Entry>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new action type. Fails if the type name is already
    /// taken — use [`replace`](Self::replace) to swap a constructor in
    /// place.
    pub fn register(
        &self,
        type_name: impl Into<String>,
        constructor: Constructor,
        info: ActionInfo,
    ) -> Result<(), ActionRegistryError> {
        let type_name = type_name.into();
        if self.entries.contains_key(&type_name) {
            return Err(ActionRegistryError::TypeAlreadyRegistered(type_name));
        }
        self.entries.insert(type_name, Entry { constructor, info });
        Ok(())
    }

    /// Swap a type's constructor while preserving its registered
    /// [`ActionInfo`] — used by tests that need a stubbed action type
    /// without losing its documented field list.
    pub fn replace(
        &self,
        type_name: &str,
        constructor: Constructor,
    ) -> Result<(), ActionRegistryError> {
        let mut entry = self
            .entries
            .get_mut(type_name)
            .ok_or_else(|| ActionRegistryError::UnknownType(type_name.to_string()))?;
        entry.constructor = constructor;
        Ok(())
    }

    pub fn get(
        &self,
        type_name: &str,
        raw_config_json: &str,
        integrations: &IntegrationRegistry,
    ) -> Result<Box<dyn Executable>, ActionRegistryError> {
        let constructor = self
            .entries
            .get(type_name)
            .ok_or_else(|| ActionRegistryError::UnknownType(type_name.to_string()))?
            .constructor
            .clone();
        constructor(raw_config_json, integrations)
    }

    pub fn has(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    pub fn info(&self, type_name: &str) -> Option<ActionInfo> {
        self.entries.get(type_name).map(|e| e.info.clone())
    }

    pub fn list(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

/// Register the reference action types (`static`, `http_request`,
/// `parallel`) into `registry`. Shared by [`default_registry`] and by
/// bootstrap binaries that need their own registry instance — e.g. to
/// additionally register an `agent` action type carrying injected
/// dependencies the `Constructor` signature has no room for.
pub fn register_reference_actions(registry: &ActionRegistry) {
    registry
        .register(
            "static",
            StaticAction::constructor(),
            ActionInfo::new("Static", "Returns its `return` field verbatim.").with_field(
                crate::metadata::FieldDescriptor::required(
                    "return",
                    "The value returned when this step executes.",
                ),
            ),
        )
        .expect("default registry: static action registered once");
    registry
        .register(
            "http_request",
            HttpRequestAction::constructor(),
            ActionInfo::new("HTTP Request", "Calls a configured `http`-capable integration.")
                .with_field(crate::metadata::FieldDescriptor::required(
                    "integration",
                    "The id of a registered integration supporting `Fetcher`.",
                ))
                .with_field(crate::metadata::FieldDescriptor::optional(
                    "method",
                    "HTTP method, defaults to GET.",
                ))
                .with_field(crate::metadata::FieldDescriptor::required("url", "The request URL."))
                .with_field(crate::metadata::FieldDescriptor::optional(
                    "headers",
                    "Request headers as a JSON object of strings.",
                ))
                .with_field(crate::metadata::FieldDescriptor::optional("body", "JSON request body.")),
        )
        .expect("default registry: http_request action registered once");
    registry
        .register(
            "parallel",
            ParallelAction::constructor(),
            ActionInfo::new(
                "Parallel",
                "Fans out to other steps concurrently, each in its own isolated context.",
            )
            .with_field(crate::metadata::FieldDescriptor::required(
                "steps",
                "Step ids (e.g. `actions.w1`) to execute concurrently.",
            ))
            .with_field(crate::metadata::FieldDescriptor::optional(
                "stopOnFailure",
                "Abort and propagate the first non-canceled failure instead of collecting all outcomes.",
            )),
        )
        .expect("default registry: parallel action registered once");
}

/// The process-wide default registry, pre-populated with the reference
/// action types. Plan compilation accepts an optional override registry
/// in its place (§4.B: "a scoped registry... overrides the process-wide
/// default when passed explicitly").
pub fn default_registry() -> &'static ActionRegistry {
    static DEFAULT: OnceLock<ActionRegistry> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        let registry = ActionRegistry::new();
        register_reference_actions(&registry);
        registry
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dummy_constructor() -> Constructor {
        Arc::new(|_config: &str, _integrations: &IntegrationRegistry| {
            Err(ActionRegistryError::ConstructionFailed {
                type_name: "dummy".into(),
                message: "unused in this test".into(),
            })
        })
    }

    #[test]
    fn register_then_has_and_list() {
        let registry = ActionRegistry::new();
        registry
            .register("dummy", dummy_constructor(), ActionInfo::new("Dummy", "test only"))
            .unwrap();
        assert!(registry.has("dummy"));
        assert_eq!(registry.list(), vec!["dummy".to_string()]);
    }

    #[test]
    fn registering_the_same_type_twice_fails() {
        let registry = ActionRegistry::new();
        registry
            .register("dummy", dummy_constructor(), ActionInfo::new("Dummy", "test only"))
            .unwrap();
        let err = registry
            .register("dummy", dummy_constructor(), ActionInfo::new("Dummy", "test only"))
            .unwrap_err();
        assert!(matches!(err, ActionRegistryError::TypeAlreadyRegistered(_)));
    }

    #[test]
    fn replace_swaps_constructor_and_keeps_info() {
        let registry = ActionRegistry::new();
        registry
            .register("dummy", dummy_constructor(), ActionInfo::new("Dummy", "test only"))
            .unwrap();
        registry
            .replace(
                "dummy",
                Arc::new(|_config: &str, integrations: &IntegrationRegistry| {
                    StaticAction::constructor()("{\"return\": 1}", integrations)
                }),
            )
            .unwrap();
        assert_eq!(registry.info("dummy").unwrap().name, "Dummy");
    }

    #[test]
    fn get_unknown_type_is_an_error() {
        let registry = ActionRegistry::new();
        let integrations = IntegrationRegistry::new();
        let err = registry.get("nope", "{}", &integrations).unwrap_err();
        assert!(matches!(err, ActionRegistryError::UnknownType(_)));
    }

    #[test]
    fn default_registry_has_reference_actions() {
        let registry = default_registry();
        assert!(registry.has("static"));
        assert!(registry.has("http_request"));
    }

    #[test]
    fn default_registry_static_constructs_and_has_fields() {
        let registry = default_registry();
        let integrations = IntegrationRegistry::new();
        let action = registry
            .get("static", &json!({"return": 1}).to_string(), &integrations)
            .unwrap();
        assert_eq!(action.action_type(), "static");
        assert_eq!(registry.info("static").unwrap().fields.len(), 1);
    }
}
