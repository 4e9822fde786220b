//! Errors raised while registering or resolving action types (§4.B).

#[derive(Debug, Clone, thiserror::Error)]
pub enum ActionRegistryError {
    #[error("action type `{0}` is already registered")]
    TypeAlreadyRegistered(String),

    #[error("unknown action type `{0}`")]
    UnknownType(String),

    #[error("failed to construct action of type `{type_name}`: {message}")]
    ConstructionFailed { type_name: String, message: String },
}
