//! Process-lifetime identifiers.
//!
//! Unlike [`crate::StepRef`] (static, config-derived), these are minted at
//! runtime: one per HTTP/MCP request, one per integration instance.

use std::fmt;
use uuid::Uuid;

/// Identifies a single HTTP/MCP invocation for logging and tracing
/// correlation. Not persisted anywhere — discarded with the request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Mint a fresh, random request id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The configuration-time id an integration was initialized under
/// (`{id, type, config}` in §6). Plain string: integration ids are
/// operator-chosen and referenced verbatim from action config.
pub type IntegrationId = String;

/// The `id` field of an `APIConfig` — identifies one compiled plan among
/// the set the process serves.
pub type ApiId = String;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
