//! Errors raised while registering integration constructors or
//! initializing named instances (§4.C).

#[derive(Debug, Clone, thiserror::Error)]
pub enum IntegrationError {
    #[error("integration type `{0}` is already registered")]
    TypeAlreadyRegistered(String),

    #[error("unknown integration type `{0}`")]
    UnknownType(String),

    #[error("integration `{0}` not found")]
    NotFound(String),

    #[error("integration `{id}` does not support the required capability")]
    CapabilityNotSupported { id: String },

    #[error("failed to construct integration `{id}` of type `{type_name}`: {message}")]
    ConstructionFailed {
        id: String,
        type_name: String,
        message: String,
    },
}

/// Raised by `initialize_all` (§4.C: "errors from individual
/// initializations are aggregated; the aggregate fails the whole batch").
#[derive(Debug, Clone, Default, thiserror::Error)]
#[error("{} integration(s) failed to initialize: {}", errors.len(), errors.iter().map(std::string::ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct IntegrationInitError {
    pub errors: Vec<IntegrationError>,
}

impl IntegrationInitError {
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_aggregate_is_ok() {
        assert!(IntegrationInitError::default().into_result().is_ok());
    }

    #[test]
    fn non_empty_aggregate_is_err_and_lists_messages() {
        let agg = IntegrationInitError {
            errors: vec![IntegrationError::UnknownType("weird".into())],
        };
        let err = agg.into_result().unwrap_err();
        assert!(err.to_string().contains("weird"));
    }
}
