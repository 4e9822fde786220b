//! `ApiConfig` deserialization, the immutable [`Plan`] it compiles into,
//! and the compiler itself (§4.F, §6).

mod compiler;
mod config;
mod error;
mod model;

pub use compiler::compile;
pub use config::{
    ActionConfig, ApiConfig, ConditionItemConfig, ConditionalConfig, HttpConfig, McpArg, McpConfig,
    ResponseConfig, ResponseObjectConfig, StructuredMarker,
};
pub use error::{CompileError, ValidationErrors};
pub use model::{
    action_output_key, ActionStep, ConditionItem, ConditionalKind, ConditionalStep, McpArgType,
    McpBinding, Plan, ResponseBuilderKind, ResponseStep, SharedPlan,
};
