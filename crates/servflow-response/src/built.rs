//! The rendered output of a response builder, before it reaches the
//! HTTP/MCP binding layer.

/// A fully rendered response: a status code, an optional `Content-Type`
/// (builders decide this, the binding never guesses), and the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltResponse {
    pub code: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}
