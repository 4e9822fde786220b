//! Turns a `ServflowSettings` into a running set of [`MountedApi`]s:
//! discover `APIConfig` files, initialize integrations, register action
//! types (including `agent`, wired to a live LLM client when one is
//! configured), and compile each config into a plan.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use servflow_action::{register_reference_actions, ActionInfo, ActionRegistry, FieldDescriptor};
use servflow_agent::{AgentAction, CompositeToolManager, LlmClient, ToolManager, WorkflowToolManager};
use servflow_http::MountedApi;
use servflow_integration::{HttpIntegration, InMemoryIntegration, IntegrationRegistry};
use servflow_plan::{compile, ApiConfig};
use servflow_runtime::Runtime;

use crate::settings::ServflowSettings;

#[derive(Debug, Deserialize)]
struct IntegrationFileEntry {
    id: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    config: Value,
}

fn read_api_config(path: &Path) -> Result<ApiConfig> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => {
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
        }
        _ => serde_yaml::from_str(&raw).with_context(|| format!("parsing {}", path.display())),
    }
}

fn discover_api_configs(dir: &Path) -> Result<Vec<ApiConfig>> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "apis directory does not exist, serving only /health");
        return Ok(Vec::new());
    }

    let mut configs = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let is_config = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml" | "json")
        );
        if is_config {
            configs.push(read_api_config(&path)?);
        }
    }
    Ok(configs)
}

async fn initialize_integrations(
    integrations_file: Option<&Path>,
    registry: &IntegrationRegistry,
) -> Result<()> {
    registry.register_constructor("http", HttpIntegration::constructor());
    registry.register_constructor("in_memory", InMemoryIntegration::constructor());

    let Some(path) = integrations_file else { return Ok(()) };
    if !path.is_file() {
        tracing::warn!(file = %path.display(), "integrations file not found, no integrations loaded");
        return Ok(());
    }

    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let entries: Vec<IntegrationFileEntry> =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    let configs = entries.into_iter().map(|e| (e.type_name, e.id, e.config)).collect();
    registry.initialize_all(configs).await?;
    Ok(())
}

fn llm_client_from_env() -> Option<Arc<dyn LlmClient>> {
    #[cfg(feature = "anthropic")]
    {
        match servflow_agent::AnthropicClient::from_env() {
            Ok(client) => return Some(Arc::new(client)),
            Err(err) => tracing::warn!(%err, "no LLM client configured, `agent` action type disabled"),
        }
    }
    None
}

/// The reference action types, plus `agent` when `llm`/`tools` are
/// available. Unlike `servflow_action::default_registry` (a
/// process-wide singleton with no room for injected dependencies), this
/// is a fresh instance the bootstrap binary owns.
fn build_action_registry(llm: Option<Arc<dyn LlmClient>>, tools: Arc<dyn ToolManager>) -> ActionRegistry {
    let registry = ActionRegistry::new();
    register_reference_actions(&registry);

    if let Some(llm) = llm {
        let constructor: servflow_action::Constructor = Arc::new(move |_config, _integrations| {
            Ok(Box::new(AgentAction::new(Arc::clone(&llm), Arc::clone(&tools)))
                as Box<dyn servflow_action::Executable>)
        });
        registry
            .register(
                "agent",
                constructor,
                ActionInfo::new("Agent", "Runs an LLM tool-call loop against the configured model.")
                    .with_field(FieldDescriptor::optional("systemMessage", "System prompt."))
                    .with_field(FieldDescriptor::required("userMessage", "The user turn to answer.")),
            )
            .expect("agent action type registered once per process");
    }

    registry
}

pub async fn build_mounted_apis(settings: &ServflowSettings) -> Result<Vec<MountedApi>> {
    let configs = discover_api_configs(&settings.apis_dir)?;

    let integrations = IntegrationRegistry::new();
    initialize_integrations(settings.integrations_file.as_deref(), &integrations).await?;

    // Workflow tools (§4.H step 4) dispatch into a compiled plan, so they
    // need one up front — compiled with the reference action types only,
    // since an `mcp`-bound config is a tool definition, not itself a
    // user of the `agent` action type.
    let plain_actions = ActionRegistry::new();
    register_reference_actions(&plain_actions);
    let mut tool_managers: Vec<Arc<dyn ToolManager>> = Vec::new();
    for config in &configs {
        let Some(mcp) = &config.mcp else { continue };
        if !mcp.enabled {
            continue;
        }
        let plan = Arc::new(
            compile(config, &plain_actions, &integrations)
                .map_err(|errors| anyhow::anyhow!("compiling `{}`: {errors}", config.id))?,
        );
        let binding = plan.mcp.clone().expect("compiled from a config with mcp.enabled");
        tool_managers.push(Arc::new(WorkflowToolManager::new(
            Arc::clone(&plan),
            Arc::new(Runtime::new()),
            vec![binding],
        )));
    }

    let llm = llm_client_from_env();
    let tools = tool_managers
        .into_iter()
        .fold(CompositeToolManager::new(), CompositeToolManager::with_manager);
    let actions = build_action_registry(llm, Arc::new(tools));

    let mut mounted = Vec::with_capacity(configs.len());
    for config in &configs {
        let plan = compile(config, &actions, &integrations)
            .map_err(|errors| anyhow::anyhow!("compiling `{}`: {errors}", config.id))?;
        mounted.push(MountedApi::new(plan, Runtime::new()));
    }
    Ok(mounted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MINIMAL_API: &str = r#"
id: ping
http:
  listenPath: /ping
  method: GET
  next: responses.ok
responses:
  ok:
    code: 200
    type: template
    template: "pong"
"#;

    #[tokio::test]
    async fn an_apis_directory_with_one_config_yields_one_mounted_api() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ping.yaml"), MINIMAL_API).unwrap();

        let settings = ServflowSettings {
            apis_dir: dir.path().to_path_buf(),
            integrations_file: None,
            ..ServflowSettings::default()
        };
        let apis = build_mounted_apis(&settings).await.unwrap();
        assert_eq!(apis.len(), 1);
        assert_eq!(apis[0].plan.id, "ping");
    }

    #[tokio::test]
    async fn a_missing_apis_directory_yields_no_apis_without_erroring() {
        let settings = ServflowSettings {
            apis_dir: PathBuf::from("/does/not/exist"),
            integrations_file: None,
            ..ServflowSettings::default()
        };
        let apis = build_mounted_apis(&settings).await.unwrap();
        assert!(apis.is_empty());
    }
}
