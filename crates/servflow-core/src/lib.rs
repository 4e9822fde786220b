//! Shared identifiers and small value types used across the Servflow
//! workspace: namespaced [`StepRef`]s for plan graph edges, and the
//! process-lifetime ids minted per request and per integration.

mod ids;
mod step_ref;

pub use ids::{ApiId, IntegrationId, RequestId};
pub use step_ref::{Namespace, StepRef, StepRefParseError};

/// HTTP methods an `APIConfig` may bind to (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    /// All methods an `APIConfig` may legally declare.
    pub const ALL: [HttpMethod; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Options,
        Self::Head,
    ];

    /// The method name as it appears on the wire (`GET`, `POST`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checked wrapper around an HTTP status code, bound to the `[100,599]`
/// range the spec requires for every `Response` step (§3, §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(u16);

/// Returned when a configured response code falls outside `[100,599]`.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("response code {0} out of range [100,599]")]
pub struct StatusCodeOutOfRange(pub u16);

impl StatusCode {
    /// Validate and wrap a raw status code.
    pub fn new(code: u16) -> Result<Self, StatusCodeOutOfRange> {
        if (100..=599).contains(&code) {
            Ok(Self(code))
        } else {
            Err(StatusCodeOutOfRange(code))
        }
    }

    /// The raw numeric code.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = StatusCodeOutOfRange;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_boundaries_accepted() {
        assert!(StatusCode::new(100).is_ok());
        assert!(StatusCode::new(599).is_ok());
    }

    #[test]
    fn status_code_boundaries_rejected() {
        assert_eq!(StatusCode::new(99), Err(StatusCodeOutOfRange(99)));
        assert_eq!(StatusCode::new(600), Err(StatusCodeOutOfRange(600)));
    }

    #[test]
    fn http_method_round_trips_as_str() {
        for m in HttpMethod::ALL {
            assert_eq!(m.to_string(), m.as_str());
        }
    }
}
