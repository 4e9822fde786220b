//! Error kinds surfaced by the Servflow core (§7).
//!
//! Three families, deliberately kept separate rather than folded into one
//! enum: [`ConfigurationError`] only ever comes out of plan compilation,
//! [`ExecutionError`] only ever comes out of a request walk, and
//! [`RuntimeError`] is the umbrella the plan runtime actually returns
//! (wrapping the other two plus the bookkeeping variants — cancellation,
//! an unknown step id, a walk that exceeded its step budget).

mod configuration;
mod execution;
mod runtime;

pub use configuration::{ActionConfigError, ConfigurationError, SchemaValidationError};
pub use execution::ExecutionError;
pub use runtime::RuntimeError;
