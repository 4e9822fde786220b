//! The plan compiler (§4.F): `ApiConfig` + action/integration registries
//! in, an immutable [`Plan`] out.

use std::collections::{BTreeMap, HashMap, HashSet};

use servflow_action::ActionRegistry;
use servflow_core::{HttpMethod, Namespace, StatusCode, StepRef};
use servflow_integration::IntegrationRegistry;
use servflow_response::{ObjectBuilder, ResponseObject, TemplateBuilder};
use servflow_template::Template;

use crate::config::{
    ActionConfig, ApiConfig, ConditionItemConfig, ConditionalConfig, McpConfig, ResponseConfig,
    ResponseObjectConfig,
};
use crate::error::{CompileError, ValidationErrors};
use crate::model::{
    action_output_key, ActionStep, ConditionItem, ConditionalKind, ConditionalStep, McpArgType,
    McpBinding, Plan, ResponseBuilderKind, ResponseStep,
};

fn parse_method(raw: &str) -> Option<HttpMethod> {
    HttpMethod::ALL.into_iter().find(|m| m.as_str().eq_ignore_ascii_case(raw))
}

fn parse_step_ref(raw: &str, errors: &mut ValidationErrors, path: &str) -> Option<StepRef> {
    match StepRef::parse(raw) {
        Ok(r) => Some(r),
        Err(err) => {
            errors.push(CompileError::SchemaValidation {
                path: path.to_string(),
                message: err.to_string(),
            });
            None
        }
    }
}

fn canonical_config_json(config: &HashMap<String, serde_json::Value>) -> String {
    let sorted: BTreeMap<&str, &serde_json::Value> =
        config.iter().map(|(k, v)| (k.as_str(), v)).collect();
    serde_json::to_string(&sorted).expect("a BTreeMap<&str, Value> always serializes")
}

fn convert_response_object(config: ResponseObjectConfig) -> Result<ResponseObject, CompileError> {
    let value = config
        .value
        .as_deref()
        .map(Template::new)
        .transpose()
        .map_err(|err| CompileError::SchemaValidation {
            path: "responses.*.object".into(),
            message: err.to_string(),
        })?;
    let mut node = ResponseObject { value, fields: Default::default() };
    for (name, child) in config.fields {
        node.fields.insert(name, convert_response_object(child)?);
    }
    Ok(node)
}

/// Compile a validated `ApiConfig` into an immutable [`Plan`].
///
/// `actions` and `integrations` default to the process-wide registries
/// when `None` is passed, but callers (tests, scoped compilations) may
/// supply their own (§4.B: "a scoped registry... overrides the
/// process-wide default").
pub fn compile(
    config: &ApiConfig,
    actions: &ActionRegistry,
    integrations: &IntegrationRegistry,
) -> Result<Plan, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if config.id.is_empty() {
        errors.push(CompileError::SchemaValidation {
            path: "id".into(),
            message: "must not be empty".into(),
        });
    }
    let http_method = parse_method(&config.http.method).or_else(|| {
        errors.push(CompileError::SchemaValidation {
            path: "http.method".into(),
            message: format!("`{}` is not a recognized HTTP method", config.http.method),
        });
        None
    });

    // Step 2: action-type validation, before any construction happens.
    for (id, action) in &config.actions {
        if !actions.has(&action.action_type) {
            errors.push(CompileError::ActionConfig {
                action_id: id.clone(),
                message: format!("unknown action type `{}`", action.action_type),
            });
            continue;
        }
        if let Some(info) = actions.info(&action.action_type) {
            for field in &info.fields {
                if !field.required {
                    continue;
                }
                let renders_empty = match action.config.get(&field.name) {
                    None => true,
                    Some(serde_json::Value::String(s)) => s.is_empty(),
                    Some(_) => false,
                };
                if renders_empty {
                    errors.push(CompileError::ActionConfig {
                        action_id: id.clone(),
                        message: format!("required field `{}` is missing or empty", field.name),
                    });
                }
            }
        }
    }

    for (id, response) in &config.responses {
        if StatusCode::new(response.code).is_err() {
            errors.push(CompileError::SchemaValidation {
                path: format!("responses.{id}.code"),
                message: format!("{} is out of range [100,599]", response.code),
            });
        }
    }

    let known_ids: HashSet<StepRef> = config
        .actions
        .keys()
        .map(|id| StepRef::action(id.clone()))
        .chain(config.conditionals.keys().map(|id| StepRef::conditional(id.clone())))
        .chain(config.responses.keys().map(|id| StepRef::response(id.clone())))
        .collect();

    let mut check_ref = |raw: &str, path: &str, errors: &mut ValidationErrors| {
        if let Some(r) = parse_step_ref(raw, errors, path) {
            if !known_ids.contains(&r) {
                errors.push(CompileError::SchemaValidation {
                    path: path.to_string(),
                    message: format!("unknown step reference `{raw}`"),
                });
            }
        }
    };

    check_ref(&config.http.next, "http.next", &mut errors);
    for (id, action) in &config.actions {
        if let Some(next) = &action.next {
            check_ref(next, &format!("actions.{id}.next"), &mut errors);
        }
        if let Some(fail) = &action.fail {
            check_ref(fail, &format!("actions.{id}.fail"), &mut errors);
        }
    }
    for (id, conditional) in &config.conditionals {
        let (on_true, on_false) = match conditional {
            ConditionalConfig::Expression { on_true, on_false, .. }
            | ConditionalConfig::Structured { on_true, on_false, .. } => (on_true, on_false),
        };
        check_ref(on_true, &format!("conditionals.{id}.onTrue"), &mut errors);
        check_ref(on_false, &format!("conditionals.{id}.onFalse"), &mut errors);
    }
    if let Some(mcp) = &config.mcp {
        check_ref(&mcp.start, "mcp.start", &mut errors);
    }

    errors.clone().into_result(())?;

    // Step 3: construction. Everything referenced has been proven to
    // exist and parse by this point.
    let mut compiled_actions = HashMap::with_capacity(config.actions.len());
    for (id, action) in &config.actions {
        match compile_action(id, action, actions, integrations) {
            Ok(step) => {
                compiled_actions.insert(id.clone(), step);
            }
            Err(err) => errors.push(err),
        }
    }

    let mut compiled_conditionals = HashMap::with_capacity(config.conditionals.len());
    for (id, conditional) in &config.conditionals {
        match compile_conditional(id, conditional) {
            Ok(step) => {
                compiled_conditionals.insert(id.clone(), step);
            }
            Err(err) => errors.push(err),
        }
    }

    let mut compiled_responses = HashMap::with_capacity(config.responses.len());
    for (id, response) in &config.responses {
        match compile_response(id, response) {
            Ok(step) => {
                compiled_responses.insert(id.clone(), step);
            }
            Err(err) => errors.push(err),
        }
    }

    let mcp = match &config.mcp {
        Some(mcp) if mcp.enabled => match compile_mcp(mcp) {
            Ok(binding) => Some(binding),
            Err(err) => {
                errors.push(err);
                None
            }
        },
        _ => None,
    };

    let http_next = StepRef::parse(&config.http.next).expect("validated above");

    let plan = errors.into_result(Plan {
        id: config.id.clone(),
        actions: compiled_actions,
        conditionals: compiled_conditionals,
        responses: compiled_responses,
        http_method: http_method.expect("validated above"),
        http_listen_path: config.http.listen_path.clone(),
        http_next,
        mcp,
    })?;

    warn_unreachable_responses(&plan);
    Ok(plan)
}

fn compile_action(
    id: &str,
    action: &ActionConfig,
    actions: &ActionRegistry,
    integrations: &IntegrationRegistry,
) -> Result<ActionStep, CompileError> {
    let canonical = canonical_config_json(&action.config);
    let exec = actions
        .get(&action.action_type, &canonical, integrations)
        .map_err(|err| CompileError::ActionConfig {
            action_id: id.to_string(),
            message: err.to_string(),
        })?;
    let config_template = Template::new(&canonical).map_err(|err| CompileError::ActionConfig {
        action_id: id.to_string(),
        message: err.to_string(),
    })?;
    let on_success = action.next.as_deref().map(|n| StepRef::parse(n).expect("validated above"));
    let on_failure = action.fail.as_deref().map(|f| StepRef::parse(f).expect("validated above"));
    Ok(ActionStep {
        id: id.to_string(),
        config_template,
        exec,
        output_key: action_output_key(id),
        on_success,
        on_failure,
    })
}

fn compile_condition_item(item: &ConditionItemConfig) -> Result<ConditionItem, CompileError> {
    let content = Template::new(&item.content).map_err(|err| CompileError::SchemaValidation {
        path: "conditionals.*.structure[].content".into(),
        message: err.to_string(),
    })?;
    let comparison = item
        .comparison
        .as_deref()
        .map(Template::new)
        .transpose()
        .map_err(|err| CompileError::SchemaValidation {
            path: "conditionals.*.structure[].comparison".into(),
            message: err.to_string(),
        })?;
    Ok(ConditionItem {
        content,
        function: item.function.clone(),
        comparison,
        title: item.title.clone(),
    })
}

fn compile_conditional(id: &str, conditional: &ConditionalConfig) -> Result<ConditionalStep, CompileError> {
    let to_compile_error = |err: servflow_template::TemplateError| CompileError::SchemaValidation {
        path: format!("conditionals.{id}.expression"),
        message: err.to_string(),
    };
    match conditional {
        ConditionalConfig::Expression { expression, on_true, on_false } => Ok(ConditionalStep {
            id: id.to_string(),
            kind: ConditionalKind::Expression(Template::new(expression).map_err(to_compile_error)?),
            on_true: StepRef::parse(on_true).expect("validated above"),
            on_false: StepRef::parse(on_false).expect("validated above"),
        }),
        ConditionalConfig::Structured { structure, on_true, on_false, .. } => {
            let rows = structure
                .iter()
                .map(|row| row.iter().map(compile_condition_item).collect::<Result<Vec<_>, _>>())
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ConditionalStep {
                id: id.to_string(),
                kind: ConditionalKind::Structured(rows),
                on_true: StepRef::parse(on_true).expect("validated above"),
                on_false: StepRef::parse(on_false).expect("validated above"),
            })
        }
    }
}

fn compile_response(id: &str, response: &ResponseConfig) -> Result<ResponseStep, CompileError> {
    let code = StatusCode::new(response.code).expect("validated above");
    let use_object = response.response_type.as_deref() == Some("json_object") || response.object.is_some();
    let builder = if use_object {
        let root = response.object.clone().unwrap_or_default();
        ResponseBuilderKind::Object(ObjectBuilder::new(code, convert_response_object(root)?))
    } else {
        let source = response.template.clone().unwrap_or_default();
        let template = Template::new(&source).map_err(|err| CompileError::SchemaValidation {
            path: format!("responses.{id}.template"),
            message: err.to_string(),
        })?;
        ResponseBuilderKind::Template(TemplateBuilder::new(code, template))
    };
    Ok(ResponseStep { id: id.to_string(), code, builder })
}

fn compile_mcp(mcp: &McpConfig) -> Result<McpBinding, CompileError> {
    let args = mcp
        .args
        .values()
        .map(|arg| {
            let arg_type = match arg.arg_type.as_str() {
                "string" => McpArgType::String,
                "number" => McpArgType::Number,
                "bool" | "boolean" => McpArgType::Bool,
                other => {
                    return Err(CompileError::SchemaValidation {
                        path: "mcp.args".into(),
                        message: format!("unknown MCP arg type `{other}`"),
                    })
                }
            };
            Ok((arg.name.clone(), arg_type))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let result = Template::new(&mcp.result).map_err(|err| CompileError::SchemaValidation {
        path: "mcp.result".into(),
        message: err.to_string(),
    })?;
    Ok(McpBinding {
        name: mcp.name.clone(),
        description: mcp.description.clone(),
        args,
        result,
        start: StepRef::parse(&mcp.start).expect("validated above"),
    })
}

/// Non-fatal diagnostic pass (§4.F "(added)"): warn about responses no
/// reachable walk from any start point can ever reach.
fn warn_unreachable_responses(plan: &Plan) {
    let mut reachable: HashSet<StepRef> = HashSet::new();
    let mut stack = vec![plan.http_next.clone()];
    if let Some(mcp) = &plan.mcp {
        stack.push(mcp.start.clone());
    }
    while let Some(step) = stack.pop() {
        if !reachable.insert(step.clone()) {
            continue;
        }
        match step.namespace() {
            Namespace::Action => {
                if let Some(action) = plan.action(step.id()) {
                    if let Some(next) = &action.on_success {
                        stack.push(next.clone());
                    }
                    if let Some(fail) = &action.on_failure {
                        stack.push(fail.clone());
                    }
                }
            }
            Namespace::Conditional => {
                if let Some(conditional) = plan.conditional(step.id()) {
                    stack.push(conditional.on_true.clone());
                    stack.push(conditional.on_false.clone());
                }
            }
            Namespace::Response => {}
        }
    }
    for id in plan.responses.keys() {
        let step_ref = StepRef::response(id.clone());
        if !reachable.contains(&step_ref) {
            tracing::warn!(plan_id = %plan.id, response_id = %id, "response is unreachable from any start step");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_config() -> ApiConfig {
        serde_json::from_value(json!({
            "id": "demo",
            "http": {"listenPath": "/echo", "method": "GET", "next": "actions.a"},
            "actions": {
                "a": {"type": "static", "config": {"return": "{{ param \"name\" }}"}, "next": "responses.r"}
            },
            "responses": {
                "r": {"code": 200, "template": "{{ .variable_actions_a }}"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn compiles_the_static_echo_scenario() {
        let config = minimal_config();
        let actions = ActionRegistry::new();
        actions
            .register("static", servflow_action::StaticAction::constructor(), servflow_action::ActionInfo::new("s", "s"))
            .unwrap();
        let integrations = IntegrationRegistry::new();
        let plan = compile(&config, &actions, &integrations).unwrap();
        assert_eq!(plan.id, "demo");
        assert!(plan.action("a").is_some());
        assert!(plan.response("r").is_some());
    }

    #[test]
    fn unknown_step_reference_is_an_error() {
        let mut config = minimal_config();
        config.http.next = "actions.missing".to_string();
        let actions = ActionRegistry::new();
        actions
            .register("static", servflow_action::StaticAction::constructor(), servflow_action::ActionInfo::new("s", "s"))
            .unwrap();
        let integrations = IntegrationRegistry::new();
        let err = compile(&config, &actions, &integrations).unwrap_err();
        assert!(!err.errors.is_empty());
    }

    #[test]
    fn unknown_action_type_is_an_error() {
        let config = minimal_config();
        let actions = ActionRegistry::new();
        let integrations = IntegrationRegistry::new();
        let err = compile(&config, &actions, &integrations).unwrap_err();
        assert!(err.errors.iter().any(|e| matches!(e, CompileError::ActionConfig { .. })));
    }

    #[test]
    fn action_without_next_compiles_with_no_on_success_target() {
        let config: ApiConfig = serde_json::from_value(json!({
            "id": "demo",
            "http": {"listenPath": "/echo", "method": "GET", "next": "actions.a"},
            "actions": {
                "a": {"type": "static", "config": {"return": "hi"}, "fail": "responses.err"}
            },
            "responses": {
                "err": {"code": 500, "template": "failed"}
            }
        }))
        .unwrap();
        let actions = ActionRegistry::new();
        actions
            .register("static", servflow_action::StaticAction::constructor(), servflow_action::ActionInfo::new("s", "s"))
            .unwrap();
        let integrations = IntegrationRegistry::new();
        let plan = compile(&config, &actions, &integrations).unwrap();
        assert!(plan.action("a").unwrap().on_success.is_none());
    }

    #[test]
    fn response_code_out_of_range_is_an_error() {
        let mut config = minimal_config();
        config.responses.get_mut("r").unwrap().code = 700;
        let actions = ActionRegistry::new();
        actions
            .register("static", servflow_action::StaticAction::constructor(), servflow_action::ActionInfo::new("s", "s"))
            .unwrap();
        let integrations = IntegrationRegistry::new();
        let err = compile(&config, &actions, &integrations).unwrap_err();
        assert!(err.errors.iter().any(|e| matches!(e, CompileError::SchemaValidation { .. })));
    }
}
