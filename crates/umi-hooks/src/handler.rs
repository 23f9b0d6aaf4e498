//! Handler shapes accepted by the plugin facade.
//!
//! Extension authors pick the shape explicitly instead of the engine probing
//! whether an argument happens to be callable:
//!
//! - [`Contribution`] for accumulate points: a literal, or a function of the
//!   collection so far and the call arguments.
//! - [`Modifier`] for transform points: a replacement value, or a function of
//!   the current value and the call arguments.
//! - [`Listener`] for notify points.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::host::PluginHost;

/// Computes an accumulate contribution from the collection so far.
pub type AccumulateFn =
    Arc<dyn Fn(&[Value], &CallArgs<'_>) -> anyhow::Result<Value> + Send + Sync>;

/// Computes the next value of a transform chain.
pub type TransformFn = Arc<dyn Fn(Value, &CallArgs<'_>) -> anyhow::Result<Value> + Send + Sync>;

/// Observes a notification.
pub type ListenerFn = Arc<dyn Fn(&CallArgs<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Custom reduction step installed with `registerMethod(name, {apply})`.
///
/// Receives the compose state and the values the plugin passed when calling
/// the method, and returns the next memo verbatim.
pub type ApplyFn =
    Arc<dyn Fn(ComposeState<'_>, &[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// Low-level handler stored in the registry.
pub type HookFn = Arc<dyn Fn(ComposeState<'_>) -> anyhow::Result<Value> + Send + Sync>;

/// Arguments forwarded to every handler of one `applyPlugins` call.
#[derive(Clone, Copy)]
pub struct CallArgs<'a> {
    point: &'a str,
    args: &'a Value,
    host: &'a PluginHost,
}

impl<'a> CallArgs<'a> {
    pub(crate) fn new(point: &'a str, args: &'a Value, host: &'a PluginHost) -> Self {
        Self { point, args, host }
    }

    /// Name of the extension point being composed.
    pub fn point(&self) -> &'a str {
        self.point
    }

    /// The opaque payload given to `applyPlugins`.
    pub fn value(&self) -> &'a Value {
        self.args
    }

    /// Looks up a key when the payload is an object.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.args.get(key)
    }

    /// The host driving this composition.
    pub fn host(&self) -> &'a PluginHost {
        self.host
    }

    /// Composes another extension point from inside a handler.
    pub fn apply_plugins(&self, name: &str, opts: crate::ApplyOptions) -> Result<Value> {
        self.host.apply_plugins(name, opts)
    }
}

impl std::fmt::Debug for CallArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallArgs")
            .field("point", &self.point)
            .field("args", self.args)
            .finish_non_exhaustive()
    }
}

/// State handed to a registry handler on each reduction step.
#[derive(Debug)]
pub struct ComposeState<'a> {
    /// Running collection (as a JSON array) or running value. `null` for
    /// notifications.
    pub memo: Value,
    pub call: CallArgs<'a>,
}

/// A value contributed to an accumulate point.
#[derive(Clone)]
pub enum Contribution {
    Literal(Value),
    Computed(AccumulateFn),
}

impl Contribution {
    pub fn literal(value: impl Into<Value>) -> Self {
        Contribution::Literal(value.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&[Value], &CallArgs<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Contribution::Computed(Arc::new(f))
    }

    pub(crate) fn resolve(&self, collected: &[Value], call: &CallArgs<'_>) -> anyhow::Result<Value> {
        match self {
            Contribution::Literal(value) => Ok(value.clone()),
            Contribution::Computed(f) => f(collected, call),
        }
    }
}

impl From<Value> for Contribution {
    fn from(value: Value) -> Self {
        Contribution::Literal(value)
    }
}

impl From<&str> for Contribution {
    fn from(value: &str) -> Self {
        Contribution::Literal(Value::from(value))
    }
}

impl From<String> for Contribution {
    fn from(value: String) -> Self {
        Contribution::Literal(Value::from(value))
    }
}

impl std::fmt::Debug for Contribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Contribution::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Contribution::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A replacement for, or a function of, the value flowing through a
/// transform point.
#[derive(Clone)]
pub enum Modifier {
    Replace(Value),
    Apply(TransformFn),
}

impl Modifier {
    pub fn replace(value: impl Into<Value>) -> Self {
        Modifier::Replace(value.into())
    }

    pub fn apply<F>(f: F) -> Self
    where
        F: Fn(Value, &CallArgs<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Modifier::Apply(Arc::new(f))
    }

    pub(crate) fn resolve(&self, value: Value, call: &CallArgs<'_>) -> anyhow::Result<Value> {
        match self {
            Modifier::Replace(replacement) => Ok(replacement.clone()),
            Modifier::Apply(f) => f(value, call),
        }
    }
}

impl From<Value> for Modifier {
    fn from(value: Value) -> Self {
        Modifier::Replace(value)
    }
}

impl std::fmt::Debug for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modifier::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Modifier::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// Callback run for a notify point.
#[derive(Clone)]
pub struct Listener(pub ListenerFn);

impl Listener {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CallArgs<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Listener(Arc::new(f))
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Listener(..)")
    }
}

/// Arguments passed when calling an installed facade method by name.
#[derive(Debug, Clone)]
pub enum HookArgs {
    Contribute(Contribution),
    Modify(Modifier),
    Listen(Listener),
    /// Raw values for methods installed with a custom `apply`.
    Values(Vec<Value>),
}

impl HookArgs {
    pub(crate) fn shape(&self) -> &'static str {
        match self {
            HookArgs::Contribute(_) => "contribution",
            HookArgs::Modify(_) => "modifier",
            HookArgs::Listen(_) => "listener",
            HookArgs::Values(_) => "raw values",
        }
    }
}

impl From<Contribution> for HookArgs {
    fn from(c: Contribution) -> Self {
        HookArgs::Contribute(c)
    }
}

impl From<Modifier> for HookArgs {
    fn from(m: Modifier) -> Self {
        HookArgs::Modify(m)
    }
}

impl From<Listener> for HookArgs {
    fn from(l: Listener) -> Self {
        HookArgs::Listen(l)
    }
}

impl From<Vec<Value>> for HookArgs {
    fn from(values: Vec<Value>) -> Self {
        HookArgs::Values(values)
    }
}
