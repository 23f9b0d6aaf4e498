//! Error types for hook registration and composition.
//!
//! Every error here is raised synchronously to the immediate caller. A
//! malformed registration is an authoring defect in a plugin and stops the
//! pipeline; nothing is retried or silently skipped.

use thiserror::Error;

use crate::kind::CompositionKind;

/// Result type alias using [`HookError`] as the default error type.
pub type Result<T, E = HookError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HookError {
    /// The name is neither declared nor matches a known prefix.
    #[error(
        "unexpected extension point name '{name}'\n\nHint: names must start with add, modify, on, before or after, or be declared with registerMethod"
    )]
    UnclassifiableExtensionPoint { name: String },

    /// A facade method with this name is already installed on the instance.
    #[error("api.{method} exists on plugin '{plugin}'")]
    DuplicateMethod { method: String, plugin: String },

    /// `registerMethod` needs exactly one of `type` and `apply`.
    #[error("invalid options for api.{method}: {reason}")]
    AmbiguousRegistrationSpec { method: String, reason: &'static str },

    /// A registration argument has the wrong shape.
    #[error("invalid {argument} for api.register(): {reason}")]
    InvalidRegistration { argument: &'static str, reason: String },

    /// A method was called that was never installed on the facade.
    #[error("api.{method} is not a method of plugin '{plugin}'")]
    UnknownMethod { method: String, plugin: String },

    /// The same point was declared twice with different kinds.
    #[error("extension point '{point}' is declared as {declared}, cannot redeclare it as {requested}")]
    KindConflict {
        point: String,
        declared: CompositionKind,
        requested: CompositionKind,
    },

    /// A typed invocation helper was used on a point of another kind.
    #[error("extension point '{point}' is {actual}, not {expected}")]
    KindMismatch {
        point: String,
        expected: CompositionKind,
        actual: CompositionKind,
    },

    /// A handler failed while the point was being composed.
    #[error("plugin '{plugin}' failed in {point}: {source}")]
    HandlerExecution {
        point: String,
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    /// `registerPlugin` was given an id reserved for user or built-in plugins.
    #[error("api.registerPlugin() should not register plugin prefixed with user: and built-in:, got '{id}'")]
    ReservedPluginId { id: String },

    #[error("plugin '{id}' is already registered")]
    DuplicatePlugin { id: String },

    #[error("generator {name} exists, please select another one")]
    DuplicateGenerator { name: String },

    #[error("command {name} exists, please select another one")]
    DuplicateCommand { name: String },

    /// Template rendering through the facade failed.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl HookError {
    /// Name of the extension point involved, when there is one.
    pub fn point(&self) -> Option<&str> {
        match self {
            HookError::UnclassifiableExtensionPoint { name } => Some(name),
            HookError::KindConflict { point, .. }
            | HookError::KindMismatch { point, .. }
            | HookError::HandlerExecution { point, .. } => Some(point),
            _ => None,
        }
    }

    /// Id of the plugin responsible, when known.
    pub fn plugin(&self) -> Option<&str> {
        match self {
            HookError::DuplicateMethod { plugin, .. }
            | HookError::UnknownMethod { plugin, .. }
            | HookError::HandlerExecution { plugin, .. } => Some(plugin),
            _ => None,
        }
    }
}
