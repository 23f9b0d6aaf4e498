//! Composition engine: reduces an extension point's handlers into a result.
//!
//! Handlers run strictly in registration order. Each one receives the memo
//! produced by its predecessor, and the first failure aborts the call.

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{HookError, Result};
use crate::handler::{CallArgs, ComposeState};
use crate::host::PluginHost;
use crate::kind::CompositionKind;

/// Inputs to one `applyPlugins` call.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Seed for accumulate and transform points. Ignored by notify points.
    pub initial_value: Value,
    /// Opaque payload forwarded to every handler.
    pub args: Value,
}

impl ApplyOptions {
    pub fn new(initial_value: impl Into<Value>) -> Self {
        Self {
            initial_value: initial_value.into(),
            args: Value::Null,
        }
    }

    pub fn with_args(mut self, args: impl Into<Value>) -> Self {
        self.args = args.into();
        self
    }
}

/// Starting collection of an accumulate reduction.
fn seed_collection(initial: Value) -> Value {
    match initial {
        Value::Null => Value::Array(Vec::new()),
        Value::Array(items) => Value::Array(items),
        other => Value::Array(vec![other]),
    }
}

impl PluginHost {
    /// Reduces every handler registered under `name`.
    ///
    /// Returns the final collection (as a JSON array) for accumulate points,
    /// the final value for transform and custom points, and `null` for
    /// notify points. A point without handlers yields its seed unchanged.
    pub fn apply_plugins(&self, name: &str, opts: ApplyOptions) -> Result<Value> {
        let kind = self.catalog.classify(name)?;
        let handlers = self.registry.handlers(name);
        debug!(point = %name, %kind, handlers = handlers.len(), "Applying plugins");

        let ApplyOptions {
            initial_value,
            args,
        } = opts;
        let call = CallArgs::new(name, &args, self);

        let mut memo = match kind {
            CompositionKind::Accumulate => seed_collection(initial_value),
            CompositionKind::Transform => initial_value,
            CompositionKind::Notify => Value::Null,
        };

        for entry in handlers {
            trace!(point = %name, plugin = %entry.plugin(), "Running handler");
            let state = ComposeState { memo, call };
            memo = (entry.callback())(state).map_err(|source| HookError::HandlerExecution {
                point: name.to_string(),
                plugin: entry.plugin().to_string(),
                source,
            })?;
        }

        Ok(match kind {
            CompositionKind::Notify => Value::Null,
            _ => memo,
        })
    }

    /// Collects an accumulate point into a list.
    pub fn collect(&self, name: &str, args: impl Into<Value>) -> Result<Vec<Value>> {
        self.expect_kind(name, CompositionKind::Accumulate)?;
        let collected = self.apply_plugins(name, ApplyOptions::default().with_args(args))?;
        Ok(match collected {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        })
    }

    /// Runs a transform point starting from `initial`.
    pub fn transform(
        &self,
        name: &str,
        initial: impl Into<Value>,
        args: impl Into<Value>,
    ) -> Result<Value> {
        self.expect_kind(name, CompositionKind::Transform)?;
        self.apply_plugins(name, ApplyOptions::new(initial).with_args(args))
    }

    /// Fires a notify point.
    pub fn notify(&self, name: &str, args: impl Into<Value>) -> Result<()> {
        self.expect_kind(name, CompositionKind::Notify)?;
        self.apply_plugins(name, ApplyOptions::default().with_args(args))?;
        Ok(())
    }

    fn expect_kind(&self, name: &str, expected: CompositionKind) -> Result<()> {
        let actual = self.catalog.classify(name)?;
        if actual != expected {
            return Err(HookError::KindMismatch {
                point: name.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::HandlerEntry;
    use serde_json::json;
    use std::sync::Arc;

    fn push(host: &mut PluginHost, point: &str, plugin: &str, value: Value) {
        host.registry.register(HandlerEntry::new(
            point,
            plugin,
            Arc::new(move |state: ComposeState<'_>| -> anyhow::Result<Value> {
                let mut items = match state.memo {
                    Value::Array(items) => items,
                    _ => Vec::new(),
                };
                items.push(value.clone());
                Ok(Value::Array(items))
            }),
        ));
    }

    #[test]
    fn test_null_seed_starts_empty_collection() {
        let host = PluginHost::default();
        let result = host
            .apply_plugins("addEntryCode", ApplyOptions::default())
            .unwrap();
        assert_eq!(result, json!([]));
    }

    #[test]
    fn test_scalar_seed_becomes_one_element() {
        let mut host = PluginHost::default();
        push(&mut host, "addEntryCode", "a", json!("second"));
        let result = host
            .apply_plugins("addEntryCode", ApplyOptions::new("first"))
            .unwrap();
        assert_eq!(result, json!(["first", "second"]));
    }

    #[test]
    fn test_notify_returns_null() {
        let mut host = PluginHost::default();
        push(&mut host, "onStart", "a", json!(1));
        let result = host.apply_plugins("onStart", ApplyOptions::new(5)).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn test_unclassifiable_point_fails_before_running() {
        let host = PluginHost::default();
        let err = host
            .apply_plugins("weirdName", ApplyOptions::default())
            .unwrap_err();
        assert!(matches!(err, HookError::UnclassifiableExtensionPoint { .. }));
    }

    #[test]
    fn test_kind_mismatch() {
        let host = PluginHost::default();
        let err = host.notify("modifyRoutes", Value::Null).unwrap_err();
        assert!(matches!(
            err,
            HookError::KindMismatch {
                expected: CompositionKind::Notify,
                actual: CompositionKind::Transform,
                ..
            }
        ));
        assert!(host.collect("onStart", Value::Null).is_err());
        assert!(host.transform("addEntryCode", json!([]), Value::Null).is_err());
    }
}
