//! Conversion of CLI errors into miette reports.

use miette::Report;
use umi_hooks::HookError;

use crate::error::CliError;

/// Converts a [`CliError`] into a report, naming the plugin and extension
/// point when a hook failed.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Hook(e) => hook_error_to_miette(e),
        CliError::PluginSetup { id, source } => {
            miette::miette!("Plugin '{}' failed to load\n\nCaused by: {:#}", id, source)
        }
        CliError::Plugin { context, source } => {
            miette::miette!("{}\n\nCaused by: {:#}", context, source)
        }
        _ => miette::miette!("{}", err),
    }
}

fn hook_error_to_miette(err: HookError) -> Report {
    match err {
        HookError::HandlerExecution {
            point,
            plugin,
            source,
        } => miette::miette!(
            "Plugin '{}' failed while running {}\n\nCaused by: {:#}",
            plugin,
            point,
            source
        ),
        other => miette::miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_failure_report_names_plugin_and_point() {
        let err = CliError::Hook(HookError::HandlerExecution {
            point: "modifyRoutes".to_string(),
            plugin: "user:routes".to_string(),
            source: anyhow::anyhow!("bad route"),
        });
        let report = cli_error_to_miette(err).to_string();
        assert!(report.contains("user:routes"));
        assert!(report.contains("modifyRoutes"));
        assert!(report.contains("bad route"));
    }
}
