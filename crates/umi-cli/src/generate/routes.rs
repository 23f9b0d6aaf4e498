//! Route table of the generated router.
//!
//! Routes come from the config when it has a `routes` table, otherwise from
//! the files under the pages directory:
//!
//! - `index.js` maps to its directory's path, other files to `/<name>`
//! - `$id.js` becomes `/:id`, `$id$.js` the optional `/:id?`
//! - a `_layout.js` wraps the routes of its directory
//! - dot files, `_`-prefixed files and helper directories are skipped

use std::path::Path;

use path_clean::PathClean;
use serde_json::{json, Value};
use umi_hooks::paths::{relative_path, win_path};
use umi_hooks::{HostPaths, PluginHost};
use walkdir::WalkDir;

use crate::config::RouteConfig;
use crate::error::GenerateError;

const PAGE_EXTENSIONS: [&str; 4] = ["js", "jsx", "ts", "tsx"];
const LAYOUT_STEM: &str = "_layout";
const IGNORED_DIRS: [&str; 6] = ["components", "component", "models", "model", "services", "utils"];

/// Routes from the config table, with components resolved against the pages
/// directory.
pub fn config_routes(routes: &[RouteConfig], paths: &HostPaths) -> Result<Vec<Value>, GenerateError> {
    routes
        .iter()
        .map(|route| {
            let mut value = serde_json::to_value(route)
                .map_err(|e| GenerateError::InvalidRoutes(e.to_string()))?;
            resolve_components(&mut value, &paths.abs_pages_path);
            Ok(value)
        })
        .collect()
}

fn resolve_components(route: &mut Value, pages: &Path) {
    if let Some(Value::String(component)) = route.get_mut("component") {
        if component.starts_with("./") || component.starts_with("../") {
            *component = win_path(pages.join(component.as_str()).clean());
        }
    }
    if let Some(Value::Array(children)) = route.get_mut("routes") {
        for child in children {
            resolve_components(child, pages);
        }
    }
}

/// Conventional routes from the pages directory. A missing directory has
/// no routes.
pub fn scan_pages(pages: &Path) -> Result<Vec<Value>, GenerateError> {
    if !pages.is_dir() {
        return Ok(Vec::new());
    }
    let routes = scan_dir(pages, "")?;
    Ok(match find_layout(pages) {
        Some(layout) => vec![json!({ "path": "/", "component": layout, "routes": routes })],
        None => routes,
    })
}

fn scan_dir(dir: &Path, prefix: &str) -> Result<Vec<Value>, GenerateError> {
    let mut routes = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| GenerateError::Pages {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }

        let path = entry.path();
        if entry.file_type().is_dir() {
            if IGNORED_DIRS.contains(&&*name) {
                continue;
            }
            let dir_path = format!("{prefix}/{}", path_segment(&name));
            let children = scan_dir(path, &dir_path)?;
            match find_layout(path) {
                Some(layout) => routes.push(json!({
                    "path": dir_path,
                    "component": layout,
                    "routes": children,
                })),
                None => routes.extend(children),
            }
        } else if let Some(stem) = page_stem(path) {
            let route_path = if stem == "index" {
                if prefix.is_empty() {
                    "/".to_string()
                } else {
                    prefix.to_string()
                }
            } else {
                format!("{prefix}/{}", path_segment(stem))
            };
            routes.push(json!({
                "path": route_path,
                "exact": true,
                "component": win_path(path),
            }));
        }
    }

    // Static paths first so dynamic segments never shadow them.
    routes.sort_by_key(|route| {
        route
            .get("path")
            .and_then(Value::as_str)
            .is_some_and(|p| p.contains(':'))
    });
    Ok(routes)
}

/// Stem of a page module, or `None` for anything that is not a page
/// (`foo.test.js`, `types.d.ts`, assets).
fn page_stem(path: &Path) -> Option<&str> {
    let ext = path.extension()?.to_str()?;
    if !PAGE_EXTENSIONS.contains(&ext) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    (!stem.contains('.')).then_some(stem)
}

fn find_layout(dir: &Path) -> Option<String> {
    PAGE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{LAYOUT_STEM}.{ext}")))
        .find(|path| path.is_file())
        .map(win_path)
}

/// `$id` → `:id`, `$id$` → `:id?`.
fn path_segment(name: &str) -> String {
    match name.strip_prefix('$') {
        Some(param) => match param.strip_suffix('$') {
            Some(optional) => format!(":{optional}?"),
            None => format!(":{param}"),
        },
        None => name.to_string(),
    }
}

/// Serializes routes to JavaScript.
///
/// Every component passes through `modifyRouteComponent`, starting from
/// `require('<path>').default` with the path relative to the tmp dir. The
/// result is emitted as code, not as a string.
pub fn routes_to_js(routes: &[Value], host: &PluginHost) -> Result<String, GenerateError> {
    let mut routes = routes.to_vec();
    for route in &mut routes {
        rewrite_components(route, host)?;
    }
    let json = serde_json::to_string_pretty(&routes)
        .map_err(|e| GenerateError::InvalidRoutes(e.to_string()))?;
    Ok(strip_component_quotes(&json))
}

fn rewrite_components(route: &mut Value, host: &PluginHost) -> Result<(), GenerateError> {
    let Value::Object(map) = route else {
        return Err(GenerateError::InvalidRoutes(format!(
            "expected a route object, got {route}"
        )));
    };

    if let Some(component) = map.get("component") {
        let Some(component) = component.as_str() else {
            return Err(GenerateError::InvalidRoutes(format!(
                "component must be a string, got {component}"
            )));
        };
        let import_path = import_path(component, host.paths());
        let code = host.transform(
            "modifyRouteComponent",
            format!("require('{import_path}').default"),
            json!({ "importPath": import_path, "component": component }),
        )?;
        let Value::String(code) = code else {
            return Err(GenerateError::InvalidRoutes(format!(
                "modifyRouteComponent must produce a string, got {code}"
            )));
        };
        map.insert("component".to_string(), Value::String(code));
    }

    match map.get_mut("routes") {
        Some(Value::Array(children)) => {
            for child in children {
                rewrite_components(child, host)?;
            }
        }
        Some(other) => {
            return Err(GenerateError::InvalidRoutes(format!(
                "routes must be a list, got {other}"
            )));
        }
        None => {}
    }
    Ok(())
}

/// Import specifier of a component as seen from the tmp dir.
pub(crate) fn import_path(component: &str, paths: &HostPaths) -> String {
    let path = Path::new(component);
    if !path.is_absolute() {
        return component.to_string();
    }
    let relative = win_path(relative_path(&paths.abs_tmp_dir_path, path));
    if relative.starts_with('.') {
        relative
    } else {
        format!("./{relative}")
    }
}

fn strip_component_quotes(json: &str) -> String {
    const KEY: &str = "\"component\": ";

    let mut out = String::with_capacity(json.len());
    let mut rest = json;
    while let Some(idx) = rest.find(KEY) {
        let (head, tail) = rest.split_at(idx + KEY.len());
        out.push_str(head);
        rest = tail;
        if let Some((literal, after)) = split_json_string(tail) {
            match serde_json::from_str::<String>(literal) {
                Ok(code) => out.push_str(&code),
                Err(_) => out.push_str(literal),
            }
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

/// Splits a leading JSON string literal (quotes included) off `s`.
fn split_json_string(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'"') {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(s.split_at(i + 1)),
            _ => i += 1,
        }
    }
    None
}
