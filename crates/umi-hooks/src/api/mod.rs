//! The per-plugin facade.
//!
//! Each plugin gets its own [`PluginApi`], borrowing the shared
//! [`PluginHost`] for the duration of its setup. Installed method names are
//! tracked per instance, so two plugins may each declare a method with the
//! same name while one plugin declaring it twice is an error. Point kinds
//! live in the host's catalog and are shared by every instance.
//!
//! The built-in points are available as typed methods generated from the
//! built-in table (`api.add_entry_code(..)`, `api.modify_routes(..)`, ...).
//! Points declared at runtime through [`PluginApi::register_method`] are
//! invoked by name with [`PluginApi::call_method`].

mod command;
mod generator;
mod plugin;

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, Span};

pub use command::{CommandContext, CommandFn, CommandSpec};
pub use generator::{GenerateFn, GeneratedFile, GeneratorContext, GeneratorSpec};
pub use plugin::{PluginApplyFn, PluginDescriptor};

use crate::builtin::BUILTIN_METHODS;
use crate::catalog::classify_by_convention;
use crate::engine::ApplyOptions;
use crate::error::{HookError, Result};
use crate::handler::{ApplyFn, ComposeState, Contribution, HookArgs, HookFn, Listener, Modifier};
use crate::host::PluginHost;
use crate::kind::CompositionKind;
use crate::paths::{relative_path, win_path, HostPaths};
use crate::registry::HandlerEntry;

/// Names the facade itself occupies. Declaring a method with one of these
/// names fails like any other duplicate.
pub const RESERVED_METHOD_NAMES: &[&str] = &[
    "id",
    "register",
    "registerMethod",
    "registerPlugin",
    "registerGenerator",
    "registerCommand",
    "applyPlugins",
    "relativeToTmp",
    "renderTemplate",
    "paths",
];

/// Options for [`PluginApi::register_method`]. Exactly one field must be set.
#[derive(Clone, Default)]
pub struct MethodOptions {
    pub kind: Option<CompositionKind>,
    pub apply: Option<ApplyFn>,
}

impl MethodOptions {
    pub fn kind(kind: CompositionKind) -> Self {
        Self {
            kind: Some(kind),
            apply: None,
        }
    }

    pub fn apply<F>(f: F) -> Self
    where
        F: Fn(ComposeState<'_>, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            kind: None,
            apply: Some(Arc::new(f)),
        }
    }
}

impl std::fmt::Debug for MethodOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodOptions")
            .field("kind", &self.kind)
            .field("apply", &self.apply.as_ref().map(|_| ".."))
            .finish()
    }
}

#[derive(Clone)]
enum MethodBody {
    Standard(CompositionKind),
    Custom(ApplyFn),
}

/// Facade one plugin registers its handlers through.
pub struct PluginApi<'h> {
    host: &'h mut PluginHost,
    id: String,
    methods: IndexMap<String, MethodBody>,
    span: Span,
}

impl<'h> PluginApi<'h> {
    /// Creates a facade and installs every built-in method on it.
    pub fn new(host: &'h mut PluginHost, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let span = tracing::info_span!("plugin", id = %id);
        let mut api = Self {
            host,
            id,
            methods: IndexMap::new(),
            span,
        };
        api.install_builtin_methods()?;
        Ok(api)
    }

    /// Installs the built-in table. Runs once from [`PluginApi::new`]; a
    /// second run fails on the first name with [`HookError::DuplicateMethod`].
    pub fn install_builtin_methods(&mut self) -> Result<()> {
        for method in BUILTIN_METHODS {
            let kind = match method.declared {
                Some(kind) => kind,
                None => classify_by_convention(method.name)?,
            };
            self.register_method(method.name, MethodOptions::kind(kind))?;
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Span carrying this plugin's id. Enter it around the plugin's setup.
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn paths(&self) -> &HostPaths {
        self.host.paths()
    }

    /// Read-only view of the host, e.g. for the resolved config.
    pub fn host(&self) -> &PluginHost {
        &*self.host
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Names installed on this instance, in installation order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Declares a method on this facade.
    ///
    /// With `kind`, calling the method registers a standard handler of that
    /// kind. With `apply`, the point reduces as a chain in which each handler
    /// returns `apply(state, values)` verbatim; such points are recorded in
    /// the catalog as custom transform points.
    pub fn register_method(&mut self, name: &str, opts: MethodOptions) -> Result<()> {
        if self.has_method(name) || RESERVED_METHOD_NAMES.contains(&name) {
            return Err(HookError::DuplicateMethod {
                method: name.to_string(),
                plugin: self.id.clone(),
            });
        }

        let body = match (opts.kind, opts.apply) {
            (Some(_), Some(_)) => {
                return Err(HookError::AmbiguousRegistrationSpec {
                    method: name.to_string(),
                    reason: "only one of type and apply may be supplied",
                });
            }
            (None, None) => {
                return Err(HookError::AmbiguousRegistrationSpec {
                    method: name.to_string(),
                    reason: "one of type and apply must be supplied",
                });
            }
            (Some(kind), None) => {
                self.host.catalog.declare(name, kind, false)?;
                MethodBody::Standard(kind)
            }
            (None, Some(apply)) => {
                self.host
                    .catalog
                    .declare(name, CompositionKind::Transform, true)?;
                MethodBody::Custom(apply)
            }
        };

        self.methods.insert(name.to_string(), body);
        Ok(())
    }

    /// Calls an installed method by name, registering a handler for it.
    pub fn call_method(&mut self, name: &str, args: impl Into<HookArgs>) -> Result<()> {
        let body = self
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| HookError::UnknownMethod {
                method: name.to_string(),
                plugin: self.id.clone(),
            })?;

        let callback = build_handler(name, body, args.into())?;
        self.register_raw(name, callback)
    }

    /// Appends a low-level handler to `name`'s list.
    ///
    /// The handler receives the running memo and returns the next one.
    pub fn register<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: Fn(ComposeState<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.register_raw(name, Arc::new(f))
    }

    fn register_raw(&mut self, name: &str, callback: HookFn) -> Result<()> {
        if name.is_empty() {
            return Err(HookError::InvalidRegistration {
                argument: "name",
                reason: "extension point name must not be empty".to_string(),
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(HookError::InvalidRegistration {
                argument: "name",
                reason: format!("extension point name must not contain whitespace, got '{name}'"),
            });
        }

        self.host
            .registry
            .register(HandlerEntry::new(name, self.id.as_str(), callback));
        Ok(())
    }

    /// Composes a point from inside a plugin's setup.
    pub fn apply_plugins(&self, name: &str, opts: ApplyOptions) -> Result<Value> {
        self.host.apply_plugins(name, opts)
    }

    /// Queues another plugin to be loaded after the current set.
    pub fn register_plugin(&mut self, plugin: PluginDescriptor) -> Result<()> {
        self.host.queue_plugin(plugin)
    }

    pub fn register_generator(&mut self, name: &str, spec: GeneratorSpec) -> Result<()> {
        debug!(plugin = %self.id, generator = %name, "Generator registered");
        self.host.insert_generator(name.to_string(), spec)
    }

    pub fn register_command(&mut self, name: &str, spec: CommandSpec) -> Result<()> {
        debug!(plugin = %self.id, command = %name, "Command registered");
        self.host.insert_command(name.to_string(), spec)
    }

    /// `path` relative to the generated files directory, with forward slashes.
    pub fn relative_to_tmp(&self, path: impl AsRef<Path>) -> String {
        win_path(relative_path(
            &self.host.paths().abs_tmp_dir_path,
            path.as_ref(),
        ))
    }

    /// Renders a one-off template string.
    pub fn render_template<S: Serialize>(&self, source: &str, ctx: S) -> Result<String> {
        let env = minijinja::Environment::new();
        Ok(env.render_str(source, ctx)?)
    }
}

impl std::fmt::Debug for PluginApi<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginApi")
            .field("id", &self.id)
            .field("methods", &self.methods.len())
            .finish_non_exhaustive()
    }
}

/// Turns the arguments of one facade call into a registry handler.
fn build_handler(name: &str, body: MethodBody, args: HookArgs) -> Result<HookFn> {
    let callback: HookFn = match (body, args) {
        (MethodBody::Standard(CompositionKind::Accumulate), HookArgs::Contribute(c)) => {
            accumulate(c)
        }
        (MethodBody::Standard(CompositionKind::Accumulate), HookArgs::Values(values)) => {
            accumulate(Contribution::Literal(single_value(name, values)?))
        }
        (MethodBody::Standard(CompositionKind::Transform), HookArgs::Modify(m)) => transform(m),
        (MethodBody::Standard(CompositionKind::Transform), HookArgs::Values(values)) => {
            transform(Modifier::Replace(single_value(name, values)?))
        }
        (MethodBody::Standard(CompositionKind::Notify), HookArgs::Listen(listener)) => {
            notify(listener)
        }
        (MethodBody::Custom(apply), HookArgs::Values(values)) => {
            Arc::new(move |state: ComposeState<'_>| -> anyhow::Result<Value> {
                apply(state, &values)
            })
        }
        (body, args) => {
            let expected = match body {
                MethodBody::Standard(CompositionKind::Accumulate) => "a contribution",
                MethodBody::Standard(CompositionKind::Transform) => "a modifier",
                MethodBody::Standard(CompositionKind::Notify) => "a listener",
                MethodBody::Custom(_) => "raw values",
            };
            return Err(HookError::InvalidRegistration {
                argument: "handler",
                reason: format!("api.{name} expects {expected}, got {}", args.shape()),
            });
        }
    };
    Ok(callback)
}

/// Raw values given to a standard method must be exactly one value.
fn single_value(name: &str, values: Vec<Value>) -> Result<Value> {
    let count = values.len();
    let mut values = values.into_iter();
    match (values.next(), count) {
        (Some(value), 1) => Ok(value),
        _ => Err(HookError::InvalidRegistration {
            argument: "handler",
            reason: format!("api.{name} expects exactly one value, got {count}"),
        }),
    }
}

fn accumulate(contribution: Contribution) -> HookFn {
    Arc::new(move |state: ComposeState<'_>| -> anyhow::Result<Value> {
        let mut collected = match state.memo {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        match contribution.resolve(&collected, &state.call)? {
            Value::Array(items) => collected.extend(items),
            value => collected.push(value),
        }
        Ok(Value::Array(collected))
    })
}

fn transform(modifier: Modifier) -> HookFn {
    Arc::new(move |state: ComposeState<'_>| -> anyhow::Result<Value> {
        modifier.resolve(state.memo, &state.call)
    })
}

fn notify(listener: Listener) -> HookFn {
    Arc::new(move |state: ComposeState<'_>| -> anyhow::Result<Value> {
        (listener.0)(&state.call)?;
        Ok(Value::Null)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtins_installed_on_new() {
        let mut host = PluginHost::default();
        let api = PluginApi::new(&mut host, "a").unwrap();
        assert!(api.has_method("addEntryCode"));
        assert!(api.has_method("_modifyConfig"));
        assert_eq!(api.method_names().count(), BUILTIN_METHODS.len());
    }

    #[test]
    fn test_reserved_names_are_taken() {
        let mut host = PluginHost::default();
        let mut api = PluginApi::new(&mut host, "a").unwrap();
        let err = api
            .register_method("applyPlugins", MethodOptions::kind(CompositionKind::Notify))
            .unwrap_err();
        assert!(matches!(err, HookError::DuplicateMethod { .. }));
    }

    #[test]
    fn test_wrong_handler_shape() {
        let mut host = PluginHost::default();
        let mut api = PluginApi::new(&mut host, "a").unwrap();
        let err = api
            .call_method("onStart", Contribution::literal("x"))
            .unwrap_err();
        match err {
            HookError::InvalidRegistration { argument, reason } => {
                assert_eq!(argument, "handler");
                assert!(reason.contains("a listener"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_raw_values_on_standard_points() {
        let mut host = PluginHost::default();
        {
            let mut api = PluginApi::new(&mut host, "a").unwrap();
            api.call_method("addEntryImport", vec![json!("react")])
                .unwrap();
            api.call_method("modifyEntryHistory", vec![json!("hash")])
                .unwrap();
        }
        assert_eq!(
            host.apply_plugins("addEntryImport", ApplyOptions::new(json!([])))
                .unwrap(),
            json!(["react"])
        );
        assert_eq!(
            host.apply_plugins("modifyEntryHistory", ApplyOptions::new("browser"))
                .unwrap(),
            json!("hash")
        );
    }

    #[test]
    fn test_raw_values_need_exactly_one_value() {
        let mut host = PluginHost::default();
        {
            let mut api = PluginApi::new(&mut host, "a").unwrap();
            for values in [vec![], vec![json!(1), json!(2)]] {
                let err = api.call_method("addEntryImport", values.clone()).unwrap_err();
                assert!(matches!(
                    err,
                    HookError::InvalidRegistration { argument: "handler", .. }
                ));
                assert!(api.call_method("modifyEntryHistory", values).is_err());
            }
        }
        assert!(!host.registry().has_handlers("addEntryImport"));
        assert!(!host.registry().has_handlers("modifyEntryHistory"));
    }

    #[test]
    fn test_register_validates_name() {
        let mut host = PluginHost::default();
        let mut api = PluginApi::new(&mut host, "a").unwrap();
        let noop = |state: ComposeState<'_>| -> anyhow::Result<Value> { Ok(state.memo) };
        assert!(matches!(
            api.register("", noop).unwrap_err(),
            HookError::InvalidRegistration { argument: "name", .. }
        ));
        assert!(api.register("on start", noop).is_err());
        assert!(api.register("onStart", noop).is_ok());
    }

    #[test]
    fn test_relative_to_tmp() {
        let mut host = PluginHost::new(HostPaths::for_root("/app"));
        let api = PluginApi::new(&mut host, "a").unwrap();
        assert_eq!(
            api.relative_to_tmp("/app/layouts/index.js"),
            "../../layouts/index.js"
        );
    }

    #[test]
    fn test_render_template() {
        let mut host = PluginHost::default();
        let api = PluginApi::new(&mut host, "a").unwrap();
        let out = api
            .render_template("hello {{ name }}", json!({"name": "umi"}))
            .unwrap();
        assert_eq!(out, "hello umi");
    }
}
