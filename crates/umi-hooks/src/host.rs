//! The shared state behind every plugin facade.
//!
//! A [`PluginHost`] owns the hook registry, the extension point catalog and
//! the orchestrator's bookkeeping tables (extra plugins, generators,
//! commands). The orchestrator hands it to each plugin's setup function
//! through a [`PluginApi`] and later drives composition through
//! [`PluginHost::apply_plugins`].

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::api::{CommandSpec, GeneratorSpec, PluginApi, PluginDescriptor};
use crate::catalog::{ExtensionPointCatalog, PointInfo};
use crate::error::{HookError, Result};
use crate::kind::CompositionKind;
use crate::paths::HostPaths;
use crate::registry::HookRegistry;

/// Ids with these prefixes are assigned by the orchestrator only.
pub const RESERVED_PLUGIN_PREFIXES: [&str; 2] = ["user:", "built-in:"];

/// Registry, catalog and bookkeeping for one orchestrator run.
#[derive(Debug, Default)]
pub struct PluginHost {
    pub(crate) registry: HookRegistry,
    pub(crate) catalog: ExtensionPointCatalog,
    paths: HostPaths,
    /// Resolved user config, set by the orchestrator once loaded.
    config: Value,
    extra_plugins: Vec<PluginDescriptor>,
    /// Ids of plugins the orchestrator has loaded, in load order.
    loaded_plugins: Vec<String>,
    generators: IndexMap<String, GeneratorSpec>,
    commands: IndexMap<String, CommandSpec>,
}

impl PluginHost {
    pub fn new(paths: HostPaths) -> Self {
        Self {
            paths,
            ..Self::default()
        }
    }

    /// Creates the facade one plugin uses during its setup.
    pub fn create_plugin_api(&mut self, id: impl Into<String>) -> Result<PluginApi<'_>> {
        PluginApi::new(self, id.into())
    }

    pub fn paths(&self) -> &HostPaths {
        &self.paths
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn set_config(&mut self, config: Value) {
        self.config = config;
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &ExtensionPointCatalog {
        &self.catalog
    }

    /// Composition kind of a point.
    pub fn classify(&self, name: &str) -> Result<CompositionKind> {
        self.catalog.classify(name)
    }

    /// Every known point with the number of handlers attached to it.
    pub fn point_listing(&self) -> Vec<(PointInfo, usize)> {
        self.catalog
            .points()
            .into_iter()
            .map(|info| {
                let count = self.registry.handler_count(&info.name);
                (info, count)
            })
            .collect()
    }

    pub(crate) fn queue_plugin(&mut self, plugin: PluginDescriptor) -> Result<()> {
        if plugin.id.is_empty() {
            return Err(HookError::InvalidRegistration {
                argument: "id",
                reason: "plugin id must not be empty".to_string(),
            });
        }
        if RESERVED_PLUGIN_PREFIXES
            .iter()
            .any(|prefix| plugin.id.starts_with(prefix))
        {
            return Err(HookError::ReservedPluginId { id: plugin.id });
        }
        if self.is_loaded(&plugin.id) || self.extra_plugins.iter().any(|p| p.id == plugin.id) {
            return Err(HookError::DuplicatePlugin { id: plugin.id });
        }

        debug!(plugin = %plugin.id, "Plugin queued");
        self.extra_plugins.push(plugin);
        Ok(())
    }

    /// Records that a plugin is being loaded. Each id loads at most once, so
    /// a plugin queued again after loading is rejected.
    pub fn mark_loaded(&mut self, id: &str) -> Result<()> {
        if self.is_loaded(id) {
            return Err(HookError::DuplicatePlugin { id: id.to_string() });
        }
        self.loaded_plugins.push(id.to_string());
        Ok(())
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded_plugins.iter().any(|loaded| loaded == id)
    }

    /// Ids passed to [`PluginHost::mark_loaded`], in order.
    pub fn loaded_plugins(&self) -> &[String] {
        &self.loaded_plugins
    }

    /// Removes and returns the plugins queued through `registerPlugin`.
    pub fn take_extra_plugins(&mut self) -> Vec<PluginDescriptor> {
        std::mem::take(&mut self.extra_plugins)
    }

    pub(crate) fn insert_generator(&mut self, name: String, spec: GeneratorSpec) -> Result<()> {
        if name.is_empty() {
            return Err(HookError::InvalidRegistration {
                argument: "name",
                reason: "generator name must not be empty".to_string(),
            });
        }
        if self.generators.contains_key(&name) {
            return Err(HookError::DuplicateGenerator { name });
        }
        self.generators.insert(name, spec);
        Ok(())
    }

    pub fn generator(&self, name: &str) -> Option<&GeneratorSpec> {
        self.generators.get(name)
    }

    pub fn generators(&self) -> impl Iterator<Item = (&str, &GeneratorSpec)> {
        self.generators.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub(crate) fn insert_command(&mut self, name: String, spec: CommandSpec) -> Result<()> {
        if name.is_empty() {
            return Err(HookError::InvalidRegistration {
                argument: "name",
                reason: "command name must not be empty".to_string(),
            });
        }
        if self.commands.contains_key(&name) {
            return Err(HookError::DuplicateCommand { name });
        }
        self.commands.insert(name, spec);
        Ok(())
    }

    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    pub fn commands(&self) -> impl Iterator<Item = (&str, &CommandSpec)> {
        self.commands.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Drops every registration so plugins can be loaded again.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.catalog = ExtensionPointCatalog::new();
        self.extra_plugins.clear();
        self.loaded_plugins.clear();
        self.generators.clear();
        self.commands.clear();
        debug!("Plugin host reset");
    }
}
