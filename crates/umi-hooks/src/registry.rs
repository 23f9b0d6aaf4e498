//! Hook registry: ordered handler lists per extension point.
//!
//! Pure storage. Handlers are appended in registration order and never
//! reordered; the registry knows nothing about composition kinds.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::handler::HookFn;

/// One handler attached to an extension point.
#[derive(Clone)]
pub struct HandlerEntry {
    point: String,
    plugin: String,
    callback: HookFn,
}

impl HandlerEntry {
    pub fn new(point: impl Into<String>, plugin: impl Into<String>, callback: HookFn) -> Self {
        Self {
            point: point.into(),
            plugin: plugin.into(),
            callback,
        }
    }

    pub fn point(&self) -> &str {
        &self.point
    }

    /// Id of the plugin that registered this handler.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn callback(&self) -> &HookFn {
        &self.callback
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("point", &self.point)
            .field("plugin", &self.plugin)
            .finish_non_exhaustive()
    }
}

/// Registry of hook handlers organized by extension point.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Extension point → handlers in registration order.
    handlers: IndexMap<String, Vec<HandlerEntry>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to its extension point's list.
    pub fn register(&mut self, entry: HandlerEntry) {
        debug!(
            point = %entry.point,
            plugin = %entry.plugin,
            "Hook handler registered"
        );
        self.handlers
            .entry(entry.point.clone())
            .or_default()
            .push(entry);
    }

    /// Handlers for a point, in registration order. Empty if none.
    pub fn handlers(&self, point: &str) -> &[HandlerEntry] {
        self.handlers
            .get(point)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_handlers(&self, point: &str) -> bool {
        !self.handlers(point).is_empty()
    }

    pub fn handler_count(&self, point: &str) -> usize {
        self.handlers(point).len()
    }

    /// Points with at least one handler, in first-registration order.
    pub fn registered_points(&self) -> impl Iterator<Item = &str> {
        self.handlers
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(point, _)| point.as_str())
    }

    /// Removes every handler registered by one plugin.
    pub fn unregister_plugin(&mut self, plugin: &str) {
        for entries in self.handlers.values_mut() {
            entries.retain(|e| e.plugin != plugin);
        }
        self.handlers.retain(|_, entries| !entries.is_empty());

        info!(plugin = %plugin, "All hooks unregistered for plugin");
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
