//! `ServflowSettings` (SPEC_FULL §6, "added: Process configuration"): a
//! small layered loader — built-in defaults, then an optional
//! `servflow.toml`, then `SERVFLOW_*` environment variables — feeding the
//! bind address, log format, and the directory of `APIConfig` files this
//! binary serves. Distinct from `ApiConfig`, which describes one
//! endpoint's behavior and is never touched by this loader.

use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServflowSettings {
    pub bind_addr: String,
    pub log_format: LogFormat,
    pub apis_dir: PathBuf,
    pub integrations_file: Option<PathBuf>,
}

impl Default for ServflowSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_format: LogFormat::Pretty,
            apis_dir: PathBuf::from("apis"),
            integrations_file: None,
        }
    }
}

impl ServflowSettings {
    /// Defaults, then `config_file` if it exists, then `SERVFLOW_*` env
    /// vars — later layers win.
    pub fn load(config_file: &std::path::Path) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(ServflowSettings::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("SERVFLOW_"))
            .extract()
    }
}
