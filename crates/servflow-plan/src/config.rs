//! The raw, deserialized `APIConfig` (§6) — the compiler's input, before
//! action types are resolved or references are canonicalized.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub id: String,
    pub http: HttpConfig,
    #[serde(default)]
    pub mcp: Option<McpConfig>,
    #[serde(default)]
    pub actions: HashMap<String, ActionConfig>,
    #[serde(default)]
    pub conditionals: HashMap<String, ConditionalConfig>,
    #[serde(default)]
    pub responses: HashMap<String, ResponseConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "listenPath")]
    pub listen_path: String,
    pub method: String,
    pub next: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McpConfig {
    #[serde(default)]
    pub enabled: bool,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub args: HashMap<String, McpArg>,
    #[serde(default)]
    pub result: String,
    pub start: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McpArg {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionConfig {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub config: HashMap<String, Value>,
    /// Optional (§6 `next?`): an action that only ever routes through
    /// `fail`, or that ends the walk on success, may omit this.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub fail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConditionalConfig {
    Expression {
        expression: String,
        #[serde(rename = "onTrue")]
        on_true: String,
        #[serde(rename = "onFalse")]
        on_false: String,
    },
    Structured {
        #[serde(rename = "type")]
        kind: StructuredMarker,
        structure: Vec<Vec<ConditionItemConfig>>,
        #[serde(rename = "onTrue")]
        on_true: String,
        #[serde(rename = "onFalse")]
        on_false: String,
    },
}

/// Forces the `"structured"` discriminator to be the literal string, not
/// an arbitrary one — serde rejects any other value during deserialize.
#[derive(Debug, Clone, Deserialize)]
pub enum StructuredMarker {
    #[serde(rename = "structured")]
    Structured,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionItemConfig {
    pub content: String,
    pub function: String,
    #[serde(default)]
    pub comparison: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseConfig {
    pub code: u16,
    #[serde(rename = "type", default)]
    pub response_type: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub object: Option<ResponseObjectConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseObjectConfig {
    #[serde(default)]
    pub value: Option<String>,
    /// Declaration order, not insertion-hashed order — a `json_object`
    /// response's key order must match the config (§4.E "shape mirrors
    /// O"), so this has to preserve order the way `ResponseObject.fields`
    /// already does.
    #[serde(default)]
    pub fields: IndexMap<String, ResponseObjectConfig>,
}
