//! The compiled, immutable [`Plan`] (§3, §4.F) — the plan compiler's
//! output and the runtime's only input besides a request context.

use std::collections::HashMap;
use std::sync::Arc;

use servflow_action::Executable;
use servflow_core::{StatusCode, StepRef};
use servflow_response::{ObjectBuilder, TemplateBuilder};
use servflow_template::Template;

/// `outputKey` a compiled action writes its result under — unique per
/// plan by construction (§3: `variable_actions_<id>`).
pub fn action_output_key(action_id: &str) -> String {
    format!("variable_actions_{action_id}")
}

pub struct ActionStep {
    pub id: String,
    /// The canonical config, as a `{{ }}`-templated JSON string, rendered
    /// fresh against the context on every execution.
    pub config_template: Template,
    pub exec: Box<dyn Executable>,
    pub output_key: String,
    /// `None` when the config omitted `next` (§6 `next?`): success ends
    /// the walk on the spot, the same as reaching an `EndStep` with no
    /// explicit destination.
    pub on_success: Option<StepRef>,
    pub on_failure: Option<StepRef>,
}

/// One row's items are a conjunction; the whole `Vec` is a disjunction of
/// rows (§3: "disjunction of conjunctions").
pub struct ConditionItem {
    pub content: Template,
    pub function: String,
    pub comparison: Option<Template>,
    pub title: String,
}

pub enum ConditionalKind {
    Expression(Template),
    Structured(Vec<Vec<ConditionItem>>),
}

pub struct ConditionalStep {
    pub id: String,
    pub kind: ConditionalKind,
    pub on_true: StepRef,
    pub on_false: StepRef,
}

pub enum ResponseBuilderKind {
    Template(TemplateBuilder),
    Object(ObjectBuilder),
}

pub struct ResponseStep {
    pub id: String,
    pub code: StatusCode,
    pub builder: ResponseBuilderKind,
}

/// What an HTTP/MCP binding or `executeStep` may start a walk from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpArgType {
    String,
    Number,
    Bool,
}

pub struct McpBinding {
    pub name: String,
    pub description: String,
    pub args: Vec<(String, McpArgType)>,
    pub result: Template,
    pub start: StepRef,
}

/// The frozen output of plan compilation. Steps reference each other
/// only by [`StepRef`]; there is no way to mutate a `Plan` once built
/// (§4.F step 4: "the plan is then frozen").
pub struct Plan {
    pub id: String,
    pub(crate) actions: HashMap<String, ActionStep>,
    pub(crate) conditionals: HashMap<String, ConditionalStep>,
    pub(crate) responses: HashMap<String, ResponseStep>,
    pub http_method: servflow_core::HttpMethod,
    pub http_listen_path: String,
    pub http_next: StepRef,
    pub mcp: Option<McpBinding>,
}

impl Plan {
    pub fn action(&self, id: &str) -> Option<&ActionStep> {
        self.actions.get(id)
    }

    pub fn conditional(&self, id: &str) -> Option<&ConditionalStep> {
        self.conditionals.get(id)
    }

    pub fn response(&self, id: &str) -> Option<&ResponseStep> {
        self.responses.get(id)
    }
}

/// Shared ownership handle, since multiple concurrent requests execute
/// the same compiled plan.
pub type SharedPlan = Arc<Plan>;
