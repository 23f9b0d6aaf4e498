//! Error types for the umi CLI.
//!
//! `CliError` is what every command returns. Domain errors (`ConfigError`,
//! `GenerateError`) and hook engine failures convert into it automatically,
//! and the binary turns it into a `miette` report at the very end.

mod report;

pub use report::cli_error_to_miette;

use std::path::PathBuf;

use thiserror::Error;
use umi_hooks::HookError;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File generation error: {0}")]
    Generate(#[from] GenerateError),

    /// A plugin registration or extension point failed.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// A plugin's setup function returned an error.
    #[error("Plugin '{id}' failed to load: {source}")]
    PluginSetup {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unknown generator '{name}'\n\nHint: Available generators: {available}")]
    UnknownGenerator { name: String, available: String },

    /// A plugin command or generator failed while running.
    #[error("{context}: {source}")]
    Plugin {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid middleware {descriptor}: {reason}\n\nHint: Middlewares are {{\"kind\": \"mock\" | \"headers\" | \"static\", ...}}")]
    InvalidMiddleware { descriptor: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}\n\nHint: Create a .umirc.toml or .umirc.json file or pass --config <path>", .0.display())]
    NotFound(PathBuf),

    /// The merged sources could not be read into a config.
    #[error("Failed to load config: {0}\n\nHint: Check .umirc syntax and field types")]
    Load(String),

    /// A plugin validator rejected a config key.
    #[error("Config validation failed:\n{errors}\n\nHint: Fix the listed keys in your .umirc file")]
    ValidationFailed { errors: String },

    /// A `_registerConfig` contribution is not `{name, schema}`.
    #[error("Invalid config validator from plugins: {reason}")]
    InvalidValidator { reason: String },

    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },

    #[error(transparent)]
    Hook(#[from] HookError),
}

/// Errors raised while writing the generated files.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read pages directory {}: {reason}", .path.display())]
    Pages { path: PathBuf, reason: String },

    #[error("Template '{name}' is missing from the binary")]
    MissingTemplate { name: String },

    #[error("Failed to render template: {0}")]
    Render(#[from] minijinja::Error),

    #[error("Invalid import: {0}\n\nHint: Contribute a module path or {{source, specifier}}")]
    InvalidImport(String),

    #[error("Invalid contribution to {point}: {reason}")]
    InvalidContribution { point: String, reason: String },

    #[error("Invalid routes: {0}\n\nHint: Each route needs a 'path' and may have 'component' and 'routes'")]
    InvalidRoutes(String),

    #[error("{} already exists\n\nHint: Remove it first or pick another name", .0.display())]
    AlreadyExists(PathBuf),

    #[error(transparent)]
    Hook(#[from] HookError),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Adds context to results on their way to a `CliError`.
pub trait ResultExt<T> {
    /// Turns a missing-file I/O error into [`CliError::FileNotFound`].
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from(".umirc.toml"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains(".umirc.toml"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_hook_error_passes_through() {
        let err: CliError = HookError::UnclassifiableExtensionPoint {
            name: "weirdName".to_string(),
        }
        .into();
        assert!(err.to_string().contains("weirdName"));
    }

    #[test]
    fn test_cli_error_from_generate_error() {
        let err: CliError = GenerateError::AlreadyExists(PathBuf::from("src/pages/a.js")).into();
        assert!(matches!(err, CliError::Generate(_)));
        assert!(err.to_string().contains("src/pages/a.js"));
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let err = result.with_path("/test/.umirc.toml").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }
}
