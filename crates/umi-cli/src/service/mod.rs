//! The orchestrator: loads plugins and drives the pipeline checkpoints.
//!
//! Plugins load in a fixed order (built-ins, then user plugins, then whatever
//! those queued through `registerPlugin`, repeatedly until nothing is left).
//! Every registration happens before the first checkpoint composes a point.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::{debug, info};
use umi_hooks::{ApplyOptions, HostPaths, PluginDescriptor, PluginHost};

use crate::config::{resolve_config, ResolvedConfig, UserConfig};
use crate::error::{CliError, Result};
use crate::plugins::builtin_plugins;

/// Name of the tmp dir in production mode.
pub const PRODUCTION_TMP_DIR: &str = ".umi-production";

/// How a [`Service`] is set up.
#[derive(Debug, Default)]
pub struct ServiceOptions {
    /// Write generated files to `.umi-production`.
    pub production: bool,
    /// Config file given on the command line.
    pub config_file: Option<PathBuf>,
    /// Plugins loaded after the built-ins. Ids should use the `user:` prefix.
    pub plugins: Vec<PluginDescriptor>,
}

/// One run of the tool against a project.
#[derive(Debug)]
pub struct Service {
    host: PluginHost,
    options: ServiceOptions,
    resolved: Option<ResolvedConfig>,
}

/// Paths of a project rooted at `cwd`.
pub fn resolve_paths(cwd: &Path, production: bool) -> HostPaths {
    let mut paths = HostPaths::for_root(cwd);
    if production {
        paths.abs_tmp_dir_path = paths.abs_pages_path.join(PRODUCTION_TMP_DIR);
    }
    paths
}

impl Service {
    pub fn new(cwd: impl Into<PathBuf>, options: ServiceOptions) -> Self {
        let cwd = cwd.into();
        let paths = resolve_paths(&cwd, options.production);
        debug!(cwd = %cwd.display(), tmp = %paths.abs_tmp_dir_path.display(), "Service created");
        Self {
            host: PluginHost::new(paths),
            options,
            resolved: None,
        }
    }

    /// Loads plugins, resolves the config and fires `onStart`.
    pub fn init(&mut self) -> Result<()> {
        self.init_plugins()?;
        self.resolve_config()?;
        self.host.notify("onStart", Value::Null)?;
        Ok(())
    }

    /// Loads every plugin. Calling it twice reloads from scratch.
    pub fn init_plugins(&mut self) -> Result<()> {
        if !self.host.loaded_plugins().is_empty() {
            self.host.reset();
        }

        let mut queue = builtin_plugins();
        queue.extend(self.options.plugins.iter().cloned());
        for plugin in &queue {
            self.load_plugin(plugin)?;
        }

        loop {
            let extra = self.host.take_extra_plugins();
            if extra.is_empty() {
                break;
            }
            for plugin in &extra {
                self.load_plugin(plugin)?;
            }
        }

        info!(count = self.host.loaded_plugins().len(), "Plugins loaded");
        Ok(())
    }

    fn load_plugin(&mut self, plugin: &PluginDescriptor) -> Result<()> {
        self.host.mark_loaded(&plugin.id)?;
        let mut api = self.host.create_plugin_api(plugin.id.as_str())?;
        let span = api.span().clone();
        let _guard = span.enter();

        (plugin.apply)(&mut api, &plugin.opts).map_err(|source| CliError::PluginSetup {
            id: plugin.id.clone(),
            source,
        })?;

        debug!("Plugin loaded");
        Ok(())
    }

    /// Resolves the config through the plugins and shares it with them.
    pub fn resolve_config(&mut self) -> Result<&ResolvedConfig> {
        let resolved = resolve_config(
            &self.host,
            &self.host.paths().cwd,
            self.options.config_file.as_deref(),
        )?;
        self.host.set_config(resolved.raw.clone());
        Ok(self.resolved.insert(resolved))
    }

    pub fn host(&self) -> &PluginHost {
        &self.host
    }

    pub fn paths(&self) -> &HostPaths {
        self.host.paths()
    }

    /// Ids of the loaded plugins, in load order.
    pub fn plugin_ids(&self) -> &[String] {
        self.host.loaded_plugins()
    }

    pub fn resolved_config(&self) -> Option<&ResolvedConfig> {
        self.resolved.as_ref()
    }

    /// The resolved config, or the defaults before resolution.
    pub fn config(&self) -> UserConfig {
        self.resolved
            .as_ref()
            .map(|r| r.config.clone())
            .unwrap_or_default()
    }

    pub fn apply_plugins(&self, name: &str, opts: ApplyOptions) -> Result<Value> {
        Ok(self.host.apply_plugins(name, opts)?)
    }

    /// Fires a notification with `{host, port}` style arguments.
    pub fn notify(&self, name: &str, args: Value) -> Result<()> {
        Ok(self.host.notify(name, args)?)
    }

    /// Help listing of plugin commands, after `_modifyHelpInfo`.
    pub fn help_info(&self) -> Result<Value> {
        let commands: Vec<Value> = self
            .host
            .commands()
            .map(|(name, spec)| {
                json!({
                    "name": name,
                    "description": spec.description,
                    "usage": spec.usage,
                })
            })
            .collect();
        Ok(self
            .host
            .transform("_modifyHelpInfo", json!({ "commands": commands }), Value::Null)?)
    }
}
