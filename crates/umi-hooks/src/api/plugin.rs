use std::sync::Arc;

use serde_json::Value;

use super::PluginApi;

/// Setup function of a plugin. Receives the plugin's facade and its options.
pub type PluginApplyFn =
    Arc<dyn Fn(&mut PluginApi<'_>, &Value) -> anyhow::Result<()> + Send + Sync>;

/// A plugin queued for loading.
#[derive(Clone)]
pub struct PluginDescriptor {
    pub id: String,
    pub apply: PluginApplyFn,
    pub opts: Value,
}

impl PluginDescriptor {
    pub fn new<F>(id: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&mut PluginApi<'_>, &Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            apply: Arc::new(apply),
            opts: Value::Null,
        }
    }

    pub fn with_opts(mut self, opts: Value) -> Self {
        self.opts = opts;
        self
    }
}

impl std::fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}
