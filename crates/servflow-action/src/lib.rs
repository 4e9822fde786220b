//! The action-type registry, the `Executable` contract, and the
//! reference action types `static`, `http_request`, and `parallel`
//! (§4.B, §3, §5).

mod actions;
mod error;
mod executable;
mod metadata;
mod registry;

pub use actions::http_request::HttpRequestAction;
pub use actions::parallel::ParallelAction;
pub use actions::static_action::StaticAction;
pub use error::ActionRegistryError;
pub use executable::Executable;
pub use metadata::{ActionInfo, FieldDescriptor};
pub use registry::{default_registry, register_reference_actions, ActionRegistry, Constructor};
