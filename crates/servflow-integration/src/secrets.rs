//! Pre-expanding string config values through the `secret(name)`-only
//! template scope before an integration is constructed (§4.C).

use serde_json::Value;
use servflow_context::SecretEvaluator;
use servflow_template::Template;

/// Recursively render every string leaf of `config` as a template with
/// only `secret` in scope, leaving non-string values untouched. A string
/// with no `{{ }}` in it renders to itself, so this is a no-op for plain
/// config values.
pub fn expand_secrets(config: &Value) -> Value {
    match config {
        Value::String(s) => {
            if !s.contains("{{") {
                return config.clone();
            }
            match Template::new(s.as_str()).and_then(|t| t.render(&SecretEvaluator)) {
                Ok(rendered) => Value::String(rendered),
                Err(err) => {
                    tracing::warn!(error = %err, template = %s, "secret expansion failed; using raw string");
                    config.clone()
                }
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(expand_secrets).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), expand_secrets(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    #[allow(unsafe_code)]
    fn expands_secret_in_string_leaf() {
        // SAFETY: test-only, single-threaded access to a test-scoped var.
        unsafe { std::env::set_var("SERVFLOW_INTEGRATION_SECRET_TEST", "token-123") };
        let config = json!({"api_key": "{{ secret \"SERVFLOW_INTEGRATION_SECRET_TEST\" }}"});
        let expanded = expand_secrets(&config);
        assert_eq!(expanded, json!({"api_key": "token-123"}));
    }

    #[test]
    fn leaves_plain_strings_and_non_strings_untouched() {
        let config = json!({"timeout_ms": 500, "name": "plain"});
        assert_eq!(expand_secrets(&config), config);
    }

    #[test]
    #[allow(unsafe_code)]
    fn recurses_into_arrays() {
        // SAFETY: test-only, single-threaded access to a test-scoped var.
        unsafe { std::env::set_var("SERVFLOW_INTEGRATION_SECRET_TEST", "token-123") };
        let config = json!(["{{ secret \"SERVFLOW_INTEGRATION_SECRET_TEST\" }}", "plain"]);
        let expanded = expand_secrets(&config);
        assert_eq!(expanded, json!(["token-123", "plain"]));
    }
}
