//! Serves `mock/*.json` in the dev server.
//!
//! Each file maps `"METHOD /path"` (or a bare `"/path"` for any method) to
//! the JSON body returned for it. Paths may capture segments with `:name`
//! and end with a `*` wildcard:
//!
//! ```json
//! { "GET /api/users": [{ "id": 1 }], "GET /api/users/:id": { "id": 1 }, "/api/ping": "pong" }
//! ```
//!
//! The plugin contributes one `addMiddleware` entry that expands to the
//! `addMiddlewareBeforeMock` entries, a `{"kind": "mock"}` descriptor and the
//! `addMiddlewareAfterMock` entries. Parse errors do not stop the server. They
//! are reported once compilation finishes.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error};
use umi_hooks::{ApplyOptions, CallArgs, Contribution, PluginApi};
use walkdir::WalkDir;

use crate::dev::MockPattern;

/// Directory holding mock files, relative to the project root.
pub const MOCK_DIR: &str = "mock";

/// One mocked endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockRoute {
    /// Upper-case HTTP method, or `ANY`.
    pub method: String,
    pub path: String,
    pub body: Value,
}

pub fn apply(api: &mut PluginApi<'_>, _opts: &Value) -> anyhow::Result<()> {
    let errors: Arc<Mutex<Vec<String>>> = Arc::default();

    let collected_errors = Arc::clone(&errors);
    api.add_middleware(Contribution::computed(move |_, call| {
        if !mock_enabled(call.host().config()) {
            debug!("Mock disabled");
            return Ok(Value::Array(Vec::new()));
        }

        let mut middlewares = expand(call, "addMiddlewareBeforeMock")?;

        let dir = call.host().paths().cwd.join(MOCK_DIR);
        let (routes, parse_errors) = load_mock_dir(&dir);
        debug!(routes = routes.len(), errors = parse_errors.len(), "Mock files loaded");
        *collected_errors.lock() = parse_errors;
        middlewares.push(json!({ "kind": "mock", "routes": routes }));

        middlewares.extend(expand(call, "addMiddlewareAfterMock")?);
        Ok(Value::Array(middlewares))
    }))?;

    api.on_dev_compile_done(move |_| {
        let errors = errors.lock();
        if !errors.is_empty() {
            error!(count = errors.len(), "Mock files failed to parse");
            for message in errors.iter() {
                error!("{message}");
            }
        }
        Ok(())
    })?;

    Ok(())
}

fn expand(call: &CallArgs<'_>, point: &str) -> anyhow::Result<Vec<Value>> {
    let collected = call.apply_plugins(point, ApplyOptions::new(Value::Array(Vec::new())))?;
    Ok(match collected {
        Value::Array(items) => items,
        other => vec![other],
    })
}

/// Mock is on unless `MOCK=none`, `HTTP_MOCK=none` or `mock = false`.
pub fn mock_enabled(config: &Value) -> bool {
    let disabled_by_env = ["MOCK", "HTTP_MOCK"]
        .iter()
        .any(|var| std::env::var(var).is_ok_and(|v| v == "none"));
    if disabled_by_env {
        return false;
    }
    config.get("mock").and_then(Value::as_bool).unwrap_or(true)
}

/// Reads every `*.json` file in `dir`, sorted by name.
///
/// Returns the routes that parsed and one message per problem. A missing
/// directory yields nothing.
pub fn load_mock_dir(dir: &Path) -> (Vec<MockRoute>, Vec<String>) {
    let mut routes = Vec::new();
    let mut errors = Vec::new();
    if !dir.is_dir() {
        return (routes, errors);
    }

    let files = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                errors.push(format!("{}: {e}", dir.display()));
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "json")
        })
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();

    for path in files {
        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));
        let value = match parsed {
            Ok(value) => value,
            Err(e) => {
                errors.push(format!("{}: {e}", path.display()));
                continue;
            }
        };
        let Value::Object(entries) = value else {
            errors.push(format!("{}: expected an object of routes", path.display()));
            continue;
        };
        parse_entries(entries, &path, &mut routes, &mut errors);
    }

    (routes, errors)
}

fn parse_entries(
    entries: Map<String, Value>,
    file: &Path,
    routes: &mut Vec<MockRoute>,
    errors: &mut Vec<String>,
) {
    for (key, body) in entries {
        match parse_mock_key(&key) {
            Some((method, path)) => routes.push(MockRoute { method, path, body }),
            None => errors.push(format!("{}: invalid mock key '{key}'", file.display())),
        }
    }
}

/// Methods a mock key may name. `ANY` answers every method.
pub const MOCK_METHODS: [&str; 8] = ["ANY", "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// Splits `"GET /api/users/:id"` into method and path. A bare path means any
/// method. The path must be a valid [`MockPattern`].
pub fn parse_mock_key(key: &str) -> Option<(String, String)> {
    let key = key.trim();
    let (method, path) = match key.split_once(char::is_whitespace) {
        Some((method, path)) => (method.to_ascii_uppercase(), path.trim()),
        None => ("ANY".to_string(), key),
    };

    if !MOCK_METHODS.contains(&method.as_str()) || MockPattern::parse(path).is_err() {
        return None;
    }
    Some((method, path.to_string()))
}
