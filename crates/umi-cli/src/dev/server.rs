//! Builds the axum router from middleware descriptors.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, warn};
use umi_hooks::HostPaths;

use crate::dev::mocks::{serve_mock, MockTable};
use crate::dev::Middleware;
use crate::error::{CliError, Result};

/// Router serving every descriptor.
///
/// Mock endpoints take priority over static directories. Nested static
/// prefixes must be plain paths that do not overlap.
pub fn build_router(middlewares: &[Middleware], paths: &HostPaths) -> Result<Router> {
    let mut headers: Vec<(HeaderName, HeaderValue)> = Vec::new();
    let mut nested: Vec<(String, PathBuf)> = Vec::new();
    let mut root_static: Option<PathBuf> = None;

    let mocks = MockTable::from_routes(middlewares.iter().flat_map(|m| match m {
        Middleware::Mock { routes } => routes.as_slice(),
        _ => &[][..],
    }))?;

    for middleware in middlewares {
        match middleware {
            Middleware::Mock { .. } => {}
            Middleware::Headers { headers: entries } => {
                for (name, value) in entries {
                    headers.push(parse_header(name, value)?);
                }
            }
            Middleware::Static { dir, prefix } => {
                let dir = paths.cwd.join(dir);
                match prefix.as_deref().map(|p| p.trim_end_matches('/')) {
                    None | Some("") => {
                        if root_static.is_some() {
                            warn!(dir = %dir.display(), "Only the first root static directory is served");
                        } else {
                            root_static = Some(dir);
                        }
                    }
                    Some(prefix) => nested.push((prefix.to_string(), dir)),
                }
            }
        }
    }

    let mut router = Router::new();
    let mut prefixes: Vec<&str> = Vec::new();
    for (prefix, dir) in &nested {
        let plain = prefix.starts_with('/')
            && !prefix.contains("//")
            && !prefix.contains(['{', '}', '*', ':'])
            && !prefix.contains(char::is_whitespace);
        let overlaps = prefixes
            .iter()
            .any(|other| within(other, prefix) || within(prefix, other));
        if !plain || overlaps {
            return Err(CliError::InvalidMiddleware {
                descriptor: format!("static {prefix}"),
                reason: "prefix must be a plain path starting with '/' that does not overlap another static prefix"
                    .to_string(),
            });
        }
        prefixes.push(prefix);
        router = router.nest_service(prefix, ServeDir::new(dir));
    }
    router = match root_static {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(|| async { StatusCode::NOT_FOUND }),
    };

    if !mocks.is_empty() {
        debug!(mocks = mocks.len(), "Mock endpoints");
        router = router.layer(middleware::from_fn_with_state(Arc::new(mocks), serve_mock));
    }

    for (name, value) in headers {
        router = router.layer(SetResponseHeaderLayer::overriding(name, value));
    }

    Ok(router.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    ))
}

/// Whether `path` is `base` or below it.
fn within(base: &str, path: &str) -> bool {
    path.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let invalid = |reason: String| CliError::InvalidMiddleware {
        descriptor: format!("header {name}"),
        reason,
    };
    let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::mock::MockRoute;

    #[test]
    fn test_invalid_header_is_rejected() {
        assert!(parse_header("x-ok", "fine").is_ok());
        assert!(parse_header("bad header", "x").is_err());
    }

    #[test]
    fn test_duplicate_static_prefix_is_rejected() {
        let static_dir = |prefix: &str| Middleware::Static {
            dir: PathBuf::from("public"),
            prefix: Some(prefix.to_string()),
        };
        let paths = HostPaths::for_root("/app");
        assert!(build_router(&[static_dir("/assets")], &paths).is_ok());
        assert!(build_router(&[static_dir("/assets"), static_dir("/assets/")], &paths).is_err());
        assert!(build_router(&[static_dir("assets")], &paths).is_err());
        assert!(build_router(&[static_dir("/assets"), static_dir("/assets/img")], &paths).is_err());
        assert!(build_router(&[static_dir("/assets"), static_dir("/assets-v2")], &paths).is_ok());
    }

    fn mock(method: &str, path: &str) -> MockRoute {
        MockRoute {
            method: method.to_string(),
            path: path.to_string(),
            body: serde_json::json!(path),
        }
    }

    #[test]
    fn test_overlapping_mock_paths_build() {
        let paths = HostPaths::for_root("/app");
        let mocks = Middleware::Mock {
            routes: vec![
                mock("GET", "/api/:id"),
                mock("POST", "/api/:name"),
                mock("GET", "/files/*path"),
                mock("ANY", "/files/*"),
                mock("GET", "/api/users"),
            ],
        };
        assert!(build_router(&[mocks], &paths).is_ok());
    }

    #[test]
    fn test_invalid_mock_path_is_an_error() {
        let paths = HostPaths::for_root("/app");
        let mocks = Middleware::Mock {
            routes: vec![mock("GET", "/files/*path/tail")],
        };
        let err = build_router(&[mocks], &paths).unwrap_err();
        assert!(matches!(err, CliError::InvalidMiddleware { .. }));
    }

    #[test]
    fn test_within() {
        assert!(within("/assets", "/assets"));
        assert!(within("/assets", "/assets/img"));
        assert!(!within("/assets", "/assets-v2"));
    }
}

