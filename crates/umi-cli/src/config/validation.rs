use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ConfigError;

/// Keys understood without a plugin validator.
pub const CORE_KEYS: [&str; 5] = ["routes", "history", "outputPath", "mock", "devServer"];

/// A validator contributed through `_registerConfig`.
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    /// Config key the validator owns.
    pub name: String,
    /// JSON schema the key's value must satisfy.
    pub schema: Value,
    /// What a change to the key requires, e.g. `"restart"` or `"regenerate"`.
    pub on_change: Option<String>,
}

impl ConfigValidator {
    fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(mut map) = value else {
            return Err(ConfigError::InvalidValidator {
                reason: format!("expected an object, got {value}"),
            });
        };

        let name = match map.remove("name") {
            Some(Value::String(name)) if !name.is_empty() => name,
            other => {
                return Err(ConfigError::InvalidValidator {
                    reason: format!("'name' must be a non-empty string, got {other:?}"),
                });
            }
        };
        let schema = map.remove("schema").unwrap_or(Value::Bool(true));
        let on_change = map
            .remove("onChange")
            .and_then(|v| v.as_str().map(str::to_string));

        Ok(Self {
            name,
            schema,
            on_change,
        })
    }
}

/// Every validator plugins registered, keyed by config key.
#[derive(Debug, Clone, Default)]
pub struct ConfigValidators {
    validators: IndexMap<String, ConfigValidator>,
}

impl ConfigValidators {
    /// Builds the set from the collected `_registerConfig` contributions.
    /// A later validator for the same key replaces an earlier one.
    pub fn from_contributions(contributions: Vec<Value>) -> Result<Self, ConfigError> {
        let mut validators = IndexMap::new();
        for contribution in contributions {
            let validator = ConfigValidator::from_value(contribution)?;
            validators.insert(validator.name.clone(), validator);
        }
        Ok(Self { validators })
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValidator> {
        self.validators.get(name)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Checks every present key that has a validator.
    ///
    /// All failures are reported together, one line each.
    pub fn validate(&self, config: &Value) -> Result<(), ConfigError> {
        let Some(object) = config.as_object() else {
            return Err(ConfigError::InvalidValue {
                field: "config".to_string(),
                value: config.to_string(),
                hint: "The config must be a table / object".to_string(),
            });
        };

        let mut errors = Vec::new();
        for (key, value) in object {
            let Some(validator) = self.validators.get(key) else {
                continue;
            };
            let compiled = jsonschema::validator_for(&validator.schema).map_err(|e| {
                ConfigError::InvalidValidator {
                    reason: format!("schema for '{key}' is invalid: {e}"),
                }
            })?;
            for error in compiled.iter_errors(value) {
                errors.push(format!("  - {key}: {error}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationFailed {
                errors: errors.join("\n"),
            })
        }
    }

    /// Present keys that are neither core keys nor registered by a plugin.
    pub fn unknown_keys(&self, config: &Value) -> Vec<String> {
        config
            .as_object()
            .map(|object| {
                object
                    .keys()
                    .filter(|key| {
                        !CORE_KEYS.contains(&key.as_str()) && !self.validators.contains_key(*key)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
