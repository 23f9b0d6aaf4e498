//! Extension-point engine behind umi plugins.
//!
//! Plugins register handlers against named extension points through a
//! per-plugin [`PluginApi`]. The orchestrator later composes each point with
//! [`PluginHost::apply_plugins`], reducing its handlers according to the
//! point's [`CompositionKind`]:
//!
//! - **Accumulate** (`add*`): contributions are concatenated in order.
//! - **Transform** (`modify*`): each handler's output feeds the next.
//! - **Notify** (`on*`, `before*`, `after*`): handlers run for side effects.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use umi_hooks::{ApplyOptions, Contribution, Modifier, PluginHost};
//!
//! let mut host = PluginHost::default();
//! {
//!     let mut api = host.create_plugin_api("user:example").unwrap();
//!     api.add_entry_import(json!({"source": "antd"})).unwrap();
//!     api.modify_entry_history(Modifier::apply(|_value, _args| Ok(json!("hash"))))
//!         .unwrap();
//!     api.add_version_info(Contribution::computed(|collected, _args| {
//!         Ok(json!(format!("plugins so far: {}", collected.len())))
//!     }))
//!     .unwrap();
//! }
//!
//! let imports = host
//!     .apply_plugins("addEntryImport", ApplyOptions::new(json!([])))
//!     .unwrap();
//! assert_eq!(imports, json!([{"source": "antd"}]));
//!
//! let history = host
//!     .apply_plugins("modifyEntryHistory", ApplyOptions::new("browser"))
//!     .unwrap();
//! assert_eq!(history, json!("hash"));
//! ```

pub mod api;
pub mod builtin;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod handler;
pub mod host;
pub mod kind;
pub mod paths;
pub mod registry;

pub use api::{
    CommandContext, CommandSpec, GeneratedFile, GeneratorContext, GeneratorSpec, MethodOptions,
    PluginApi, PluginDescriptor,
};
pub use builtin::BUILTIN_METHODS;
pub use catalog::{ExtensionPointCatalog, PointInfo, Visibility};
pub use engine::ApplyOptions;
pub use error::{HookError, Result};
pub use handler::{CallArgs, ComposeState, Contribution, HookArgs, Listener, Modifier};
pub use host::PluginHost;
pub use kind::CompositionKind;
pub use paths::HostPaths;
pub use registry::{HandlerEntry, HookRegistry};
