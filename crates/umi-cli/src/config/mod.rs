//! Project configuration.
//!
//! Sources, lowest priority first: built-in defaults (after plugins ran
//! `modifyDefaultConfig`), the config file, `UMI_` environment variables.
//! The merged result then passes through `_modifyConfig` and the validators
//! plugins contributed through `_registerConfig`.

mod loading;
mod validation;

use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use loading::{env_key, find_config_file, resolve_config, ResolvedConfig, CONFIG_FILES};
pub use validation::{ConfigValidator, ConfigValidators, CORE_KEYS};

/// Contents of `.umirc.toml` / `.umirc.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    /// Explicit route table. Without it routes come from `src/pages`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteConfig>>,

    /// History implementation used by the generated router
    #[serde(default)]
    pub history: HistoryKind,

    /// Build output directory
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Id of the DOM element the app is mounted into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_element_id: Option<String>,

    /// Serve mock data from `mock/*.json` in `umi dev`
    #[serde(default = "default_mock")]
    pub mock: bool,

    #[serde(default)]
    pub dev_server: DevServerConfig,

    /// Keys owned by plugins.
    #[serde(flatten)]
    pub plugins: BTreeMap<String, Value>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            routes: None,
            history: HistoryKind::default(),
            output_path: default_output_path(),
            mount_element_id: None,
            mock: default_mock(),
            dev_server: DevServerConfig::default(),
            plugins: BTreeMap::new(),
        }
    }
}

impl UserConfig {
    /// JSON schema of the core fields.
    pub fn json_schema() -> Value {
        let schema = schemars::schema_for!(UserConfig);
        serde_json::to_value(schema).unwrap_or(Value::Null)
    }

    /// Mount element id, falling back to `root`.
    pub fn mount_element_id(&self) -> &str {
        self.mount_element_id.as_deref().unwrap_or(DEFAULT_MOUNT_ELEMENT_ID)
    }
}

pub const DEFAULT_MOUNT_ELEMENT_ID: &str = "root";

fn default_output_path() -> PathBuf {
    PathBuf::from("./dist")
}

fn default_mock() -> bool {
    true
}

/// One entry of a route table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RouteConfig {
    pub path: String,
    /// Component module, relative to the tmp dir or absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteConfig>>,
}

/// History implementation of the generated router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    #[default]
    Browser,
    Hash,
    Memory,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Browser => "browser",
            HistoryKind::Hash => "hash",
            HistoryKind::Memory => "memory",
        }
    }
}

/// Dev server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DevServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}
