use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format as _, Json, Serialized, Toml},
    Figment,
};
use serde_json::Value;
use tracing::{debug, warn};
use umi_hooks::PluginHost;

use crate::config::{ConfigValidators, UserConfig};
use crate::error::ConfigError;

/// Config file names looked up in the project root, in order.
pub const CONFIG_FILES: [&str; 2] = [".umirc.toml", ".umirc.json"];

/// The config after every source, plugin and validator ran.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: UserConfig,
    /// The same config as JSON, plugin keys included.
    pub raw: Value,
    /// File the config was read from, if any.
    pub source: Option<PathBuf>,
    /// Keys no plugin registered a validator for.
    pub unknown_keys: Vec<String>,
}

/// Locates the config file. An explicit path must exist.
pub fn find_config_file(cwd: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };
        if !path.is_file() {
            return Err(ConfigError::NotFound(path));
        }
        return Ok(Some(path));
    }

    Ok(CONFIG_FILES
        .iter()
        .map(|name| cwd.join(name))
        .find(|path| path.is_file()))
}

/// Maps an environment variable name (prefix stripped) to a config key.
///
/// `MOUNT_ELEMENT_ID` becomes `mountElementId`; `__` separates nesting
/// levels, so `DEV_SERVER__PORT` becomes `devServer.port`.
pub fn env_key(raw: &str) -> String {
    raw.split("__")
        .map(|segment| {
            let mut key = String::with_capacity(segment.len());
            for (i, word) in segment
                .split('_')
                .filter(|w| !w.is_empty())
                .enumerate()
            {
                let word = word.to_ascii_lowercase();
                if i == 0 {
                    key.push_str(&word);
                } else {
                    let mut chars = word.chars();
                    if let Some(first) = chars.next() {
                        key.push(first.to_ascii_uppercase());
                        key.push_str(chars.as_str());
                    }
                }
            }
            key
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Loads, merges, transforms and validates the project config.
///
/// Plugins must already be loaded: their `modifyDefaultConfig`,
/// `_modifyConfig` and `_registerConfig` handlers take part here.
pub fn resolve_config(
    host: &PluginHost,
    cwd: &Path,
    explicit: Option<&Path>,
) -> Result<ResolvedConfig, ConfigError> {
    let defaults = serde_json::to_value(UserConfig::default()).map_err(|e| {
        ConfigError::Load(format!("failed to serialize default config: {e}"))
    })?;
    let defaults = host.transform("modifyDefaultConfig", defaults, Value::Null)?;

    let mut figment = Figment::new().merge(Serialized::defaults(defaults));

    let source = find_config_file(cwd, explicit)?;
    if let Some(path) = &source {
        debug!(path = %path.display(), "Reading config file");
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        };
    }

    figment = figment.merge(
        Env::prefixed("UMI_")
            .lowercase(false)
            .map(|key| env_key(key.as_str()).into()),
    );

    let merged: Value = figment
        .extract()
        .map_err(|e| ConfigError::Load(e.to_string()))?;
    let raw = host.transform("_modifyConfig", merged, Value::Null)?;

    let validators = ConfigValidators::from_contributions(host.collect("_registerConfig", Value::Null)?)?;
    validators.validate(&raw)?;

    let unknown_keys = validators.unknown_keys(&raw);
    for key in &unknown_keys {
        warn!(key = %key, "Config key is not registered by any plugin");
    }

    let config: UserConfig =
        serde_json::from_value(raw.clone()).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            value: e.to_string(),
            hint: "Check the types of routes, history, mock and devServer".to_string(),
        })?;

    Ok(ResolvedConfig {
        config,
        raw,
        source,
        unknown_keys,
    })
}
