//! Writes the files the app is compiled from into the tmp dir.
//!
//! `router.js`, `umi.js` (the entry) and `history.js` are rendered from
//! embedded templates filled with plugin contributions. A file is only
//! rewritten when its contents changed.

pub mod imports;
pub mod routes;
pub mod templates;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use minijinja::Environment;
use serde_json::{json, Value};
use tracing::{debug, info};
use umi_hooks::paths::win_path;
use umi_hooks::PluginHost;

use crate::config::{HistoryKind, UserConfig};
use crate::error::GenerateError;
use imports::imports_to_str;
use routes::{config_routes, import_path, routes_to_js, scan_pages};

pub const ROUTER_FILE: &str = "router.js";
pub const ENTRY_FILE: &str = "umi.js";
pub const HISTORY_FILE: &str = "history.js";

/// Runtime plugin keys every app accepts.
const RUNTIME_PLUGIN_KEYS: [&str; 5] = [
    "patchRoutes",
    "render",
    "rootContainer",
    "modifyRouteProps",
    "onRouteChange",
];

/// Outcome of one generation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

pub struct FilesGenerator<'a> {
    host: &'a PluginHost,
    config: UserConfig,
    env: Environment<'static>,
    /// Last contents written per path.
    written: HashMap<PathBuf, String>,
}

impl<'a> FilesGenerator<'a> {
    pub fn new(host: &'a PluginHost, config: UserConfig) -> Result<Self, GenerateError> {
        Ok(Self {
            host,
            config,
            env: templates::environment()?,
            written: HashMap::new(),
        })
    }

    /// Fires `onGenerateFiles` and writes every generated file.
    pub fn generate(&mut self) -> Result<GenerateReport, GenerateError> {
        let tmp = self.host.paths().abs_tmp_dir_path.clone();
        fs::create_dir_all(&tmp).map_err(|source| GenerateError::Write {
            path: tmp.clone(),
            source,
        })?;

        self.host
            .notify("onGenerateFiles", json!({ "tmpDir": win_path(&tmp) }))?;

        let mut report = GenerateReport::default();
        let router = self.router_js()?;
        self.write(&tmp.join(ROUTER_FILE), router, &mut report)?;
        let entry = self.entry_js()?;
        self.write(&tmp.join(ENTRY_FILE), entry, &mut report)?;
        let history = self.history_js()?;
        self.write(&tmp.join(HISTORY_FILE), history, &mut report)?;

        info!(
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            "Files generated"
        );
        Ok(report)
    }

    fn write(
        &mut self,
        path: &Path,
        content: String,
        report: &mut GenerateReport,
    ) -> Result<(), GenerateError> {
        let content = format!("{}\n", content.trim());

        let cached = self.written.get(path).is_some_and(|last| *last == content);
        let on_disk = || fs::read_to_string(path).is_ok_and(|existing| existing == content);
        if cached || on_disk() {
            debug!(path = %path.display(), "Unchanged, skipping write");
            report.unchanged.push(path.to_path_buf());
        } else {
            fs::write(path, &content).map_err(|source| GenerateError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(path = %path.display(), "Written");
            report.written.push(path.to_path_buf());
        }

        self.written.insert(path.to_path_buf(), content);
        Ok(())
    }

    /// Route table after `modifyRoutes`.
    pub fn routes(&self) -> Result<Vec<Value>, GenerateError> {
        let paths = self.host.paths();
        let base = match &self.config.routes {
            Some(routes) => config_routes(routes, paths)?,
            None => scan_pages(&paths.abs_pages_path)?,
        };

        match self
            .host
            .transform("modifyRoutes", Value::Array(base), Value::Null)?
        {
            Value::Array(routes) => Ok(routes),
            other => Err(GenerateError::InvalidRoutes(format!(
                "modifyRoutes must produce a list, got {other}"
            ))),
        }
    }

    pub fn router_js(&self) -> Result<String, GenerateError> {
        let routes = routes_to_js(&self.routes()?, self.host)?;

        let mut imports = imports_to_str(&self.host.collect("addRouterImportAhead", Value::Null)?)?;
        imports.extend(imports_to_str(&self.host.collect("addRouterImport", Value::Null)?)?);

        let wrappers = self.module_paths("addRendererWrapperWithComponent")?;
        for (index, source) in wrappers.iter().enumerate() {
            imports.push(format!("import RendererWrapper{index} from '{source}';"));
        }

        let root = self.code(
            "modifyRouterRootComponent",
            self.host
                .transform("modifyRouterRootComponent", "DefaultRouter", Value::Null)?,
        )?;

        templates::render_with(
            &self.env,
            "router.js.j2",
            json!({
                "imports": imports,
                "router_root_component": root,
                "routes": routes,
                "router_content": router_content(wrappers.len()),
            }),
        )
    }

    pub fn entry_js(&self) -> Result<String, GenerateError> {
        let host = self.host;

        let mut valid_keys: Vec<String> = RUNTIME_PLUGIN_KEYS.iter().map(|k| k.to_string()).collect();
        valid_keys.extend(self.code_lines("addRuntimePluginKey")?);
        let valid_keys = serde_json::to_string(&valid_keys).map_err(|e| {
            GenerateError::InvalidContribution {
                point: "addRuntimePluginKey".to_string(),
                reason: e.to_string(),
            }
        })?;

        let default_render = format!(
            "ReactDOM.render(React.createElement(Router, null), document.getElementById('{}'));",
            self.config.mount_element_id()
        );
        let render = self.code(
            "modifyEntryRender",
            host.transform("modifyEntryRender", default_render, Value::Null)?,
        )?;

        templates::render_with(
            &self.env,
            "umi.js.j2",
            json!({
                "polyfills": imports_to_str(&host.collect("addEntryPolyfillImports", Value::Null)?)?,
                "imports_ahead": imports_to_str(&host.collect("addEntryImportAhead", Value::Null)?)?,
                "imports": imports_to_str(&host.collect("addEntryImport", Value::Null)?)?,
                "code_ahead": self.code_lines("addEntryCodeAhead")?,
                "code": self.code_lines("addEntryCode")?,
                "valid_keys": valid_keys,
                "runtime_plugins": self.module_paths("addRuntimePlugin")?,
                "renderer_wrapper_modules": self.module_paths("addRendererWrapperWithModule")?,
                "render": render,
                "version_info": self.code_lines("addVersionInfo")?,
            }),
        )
    }

    pub fn history_js(&self) -> Result<String, GenerateError> {
        let kind = self.config.history;
        let (creator, default) = match kind {
            HistoryKind::Browser => (
                "createBrowserHistory",
                "createBrowserHistory({ basename: window.routerBase })",
            ),
            HistoryKind::Hash => (
                "createHashHistory",
                "createHashHistory({ basename: window.routerBase })",
            ),
            HistoryKind::Memory => (
                "createMemoryHistory",
                "createMemoryHistory({ initialEntries: [window.routerBase || '/'] })",
            ),
        };
        let history = self.code(
            "modifyEntryHistory",
            self.host.transform(
                "modifyEntryHistory",
                default,
                json!({ "history": kind.as_str() }),
            )?,
        )?;

        templates::render_with(
            &self.env,
            "history.js.j2",
            json!({ "creator": creator, "history": history }),
        )
    }

    /// A transform result that must be a code string.
    fn code(&self, point: &str, value: Value) -> Result<String, GenerateError> {
        match value {
            Value::String(code) => Ok(code),
            other => Err(GenerateError::InvalidContribution {
                point: point.to_string(),
                reason: format!("expected a string of code, got {other}"),
            }),
        }
    }

    /// An accumulate point whose contributions are code strings.
    fn code_lines(&self, point: &str) -> Result<Vec<String>, GenerateError> {
        self.host
            .collect(point, Value::Null)?
            .into_iter()
            .map(|value| self.code(point, value))
            .collect()
    }

    /// An accumulate point whose contributions are module paths.
    fn module_paths(&self, point: &str) -> Result<Vec<String>, GenerateError> {
        let paths = self.host.paths();
        self.host
            .collect(point, Value::Null)?
            .into_iter()
            .map(|value| {
                let source = match &value {
                    Value::String(source) => source.as_str(),
                    Value::Object(map) => map.get("source").and_then(Value::as_str).unwrap_or(""),
                    _ => "",
                };
                if source.is_empty() {
                    return Err(GenerateError::InvalidContribution {
                        point: point.to_string(),
                        reason: format!("expected a module path, got {value}"),
                    });
                }
                Ok(import_path(source, paths))
            })
            .collect()
    }
}

/// The JSX returned by the generated router, wrapped by each renderer
/// wrapper, the first contribution outermost.
fn router_content(wrappers: usize) -> String {
    let mut lines = vec![
        "<Router history={window.g_history}>".to_string(),
        "  { renderRoutes(routes, {}) }".to_string(),
        "</Router>".to_string(),
    ];
    for index in (0..wrappers).rev() {
        let mut wrapped = Vec::with_capacity(lines.len() + 2);
        wrapped.push(format!("<RendererWrapper{index}>"));
        wrapped.extend(lines.into_iter().map(|line| format!("  {line}")));
        wrapped.push(format!("</RendererWrapper{index}>"));
        lines = wrapped;
    }
    lines
        .into_iter()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_content_nesting() {
        let content = router_content(2);
        let first = content.find("<RendererWrapper0>").unwrap();
        let second = content.find("<RendererWrapper1>").unwrap();
        let router = content.find("<Router").unwrap();
        assert!(first < second && second < router);
        assert!(content.trim_end().ends_with("</RendererWrapper0>"));
    }

    #[test]
    fn test_router_content_without_wrappers() {
        let content = router_content(0);
        assert!(content.trim_start().starts_with("<Router"));
        assert!(!content.contains("RendererWrapper"));
    }
}
