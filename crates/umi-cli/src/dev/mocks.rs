//! Mock endpoint matching.
//!
//! Mocks are answered by a layer in front of the router instead of being
//! registered as axum routes, so overlapping mock paths never reach the
//! route table.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CliError, Result};
use crate::plugins::mock::{MockRoute, MOCK_METHODS};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param { optional: bool },
    Wildcard,
}

/// A parsed mock path such as `/api/users/:id` or `/files/*path`.
///
/// `:name` matches one segment, `:name?` an optional last segment and
/// `*` or `*name` the rest of the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPattern {
    segments: Vec<Segment>,
}

impl MockPattern {
    pub fn parse(path: &str) -> std::result::Result<Self, String> {
        let Some(rest) = path.strip_prefix('/') else {
            return Err("path must start with '/'".to_string());
        };
        if path.contains(char::is_whitespace) {
            return Err("path must not contain whitespace".to_string());
        }
        if path.contains(['{', '}']) {
            return Err("use ':name' and '*name' instead of braces".to_string());
        }

        let rest = rest.strip_suffix('/').unwrap_or(rest);
        if rest.is_empty() {
            return Ok(Self {
                segments: Vec::new(),
            });
        }

        let parts: Vec<&str> = rest.split('/').collect();
        let last = parts.len() - 1;
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.into_iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                let (name, optional) = match name.strip_suffix('?') {
                    Some(name) => (name, true),
                    None => (name, false),
                };
                if !is_param_name(name) {
                    return Err(format!("invalid parameter '{part}'"));
                }
                if optional && i != last {
                    return Err(format!("optional parameter '{part}' must be the last segment"));
                }
                Segment::Param { optional }
            } else if let Some(name) = part.strip_prefix('*') {
                if i != last {
                    return Err(format!("wildcard '{part}' must be the last segment"));
                }
                if !name.is_empty() && !is_param_name(name) {
                    return Err(format!("invalid wildcard '{part}'"));
                }
                Segment::Wildcard
            } else if part.is_empty() {
                return Err("path must not contain empty segments".to_string());
            } else if part.contains('*') {
                return Err(format!("'*' must start the last segment, got '{part}'"));
            } else {
                Segment::Static(part.to_string())
            };
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    /// Whether a request path matches. Trailing slashes are ignored.
    pub fn matches(&self, path: &str) -> bool {
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);
        let parts: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard => return true,
                Segment::Param { optional: true } if i == parts.len() => return true,
                Segment::Param { .. } => {
                    if parts.get(i).is_none_or(|part| part.is_empty()) {
                        return false;
                    }
                }
                Segment::Static(expected) => {
                    if parts.get(i) != Some(&expected.as_str()) {
                        return false;
                    }
                }
            }
        }
        parts.len() == self.segments.len()
    }

    /// The path with parameter names erased. Patterns with the same shape
    /// match the same requests.
    pub fn shape(&self) -> String {
        let segments: Vec<&str> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Static(s) => s.as_str(),
                Segment::Param { optional: false } => ":",
                Segment::Param { optional: true } => ":?",
                Segment::Wildcard => "*",
            })
            .collect();
        format!("/{}", segments.join("/"))
    }

    /// Sort key; lower is more specific.
    fn specificity(&self) -> (bool, usize) {
        let wildcard = self.segments.contains(&Segment::Wildcard);
        let params = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Param { .. }))
            .count();
        (wildcard, params)
    }
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug)]
struct MockEntry {
    method: String,
    pattern: MockPattern,
    body: Value,
}

impl MockEntry {
    fn accepts(&self, method: &str) -> bool {
        self.method == "ANY" || self.method == method || (self.method == "GET" && method == "HEAD")
    }
}

/// Every mocked endpoint, in contribution order.
#[derive(Debug, Default)]
pub struct MockTable {
    entries: Vec<MockEntry>,
}

impl MockTable {
    /// Validates the routes. When two routes have the same method and path
    /// shape the first one wins.
    pub fn from_routes<'a>(routes: impl IntoIterator<Item = &'a MockRoute>) -> Result<Self> {
        let mut entries: Vec<MockEntry> = Vec::new();
        for route in routes {
            let invalid = |reason: String| CliError::InvalidMiddleware {
                descriptor: format!("mock {} {}", route.method, route.path),
                reason,
            };
            if !MOCK_METHODS.contains(&route.method.as_str()) {
                return Err(invalid(format!(
                    "method must be one of {}",
                    MOCK_METHODS.join(", ")
                )));
            }
            let pattern = MockPattern::parse(&route.path).map_err(invalid)?;

            let shape = pattern.shape();
            if entries
                .iter()
                .any(|e| e.method == route.method && e.pattern.shape() == shape)
            {
                warn!(method = %route.method, path = %route.path, "Duplicate mock ignored");
                continue;
            }
            entries.push(MockEntry {
                method: route.method.clone(),
                pattern,
                body: route.body.clone(),
            });
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Body of the most specific mock matching the request.
    ///
    /// Static segments beat parameters, parameters beat wildcards and a
    /// method-specific mock beats `ANY`. Ties go to the earlier mock.
    pub fn find(&self, method: &str, path: &str) -> Option<&Value> {
        self.entries
            .iter()
            .filter(|e| e.accepts(method) && e.pattern.matches(path))
            .min_by_key(|e| (e.pattern.specificity(), e.method == "ANY"))
            .map(|e| &e.body)
    }
}

/// Answers matching requests from the table and passes the rest on.
pub(crate) async fn serve_mock(
    State(table): State<Arc<MockTable>>,
    request: Request,
    next: Next,
) -> Response {
    match table.find(request.method().as_str(), request.uri().path()) {
        Some(body) => {
            debug!(method = %request.method(), path = %request.uri().path(), "Mock hit");
            Json(body.clone()).into_response()
        }
        None => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn route(method: &str, path: &str, body: Value) -> MockRoute {
        MockRoute {
            method: method.to_string(),
            path: path.to_string(),
            body,
        }
    }

    #[test]
    fn test_parse_rejects_bad_patterns() {
        assert!(MockPattern::parse("/api/users/:id").is_ok());
        assert!(MockPattern::parse("/files/*path").is_ok());
        assert!(MockPattern::parse("/files/*").is_ok());
        assert!(MockPattern::parse("/api/:id?").is_ok());
        assert!(MockPattern::parse("/").is_ok());

        assert!(MockPattern::parse("api").is_err());
        assert!(MockPattern::parse("/files/*path/more").is_err());
        assert!(MockPattern::parse("/files/a*b").is_err());
        assert!(MockPattern::parse("/api/:").is_err());
        assert!(MockPattern::parse("/api/:id?/x").is_err());
        assert!(MockPattern::parse("/api/{id}").is_err());
        assert!(MockPattern::parse("/api//x").is_err());
    }

    #[test]
    fn test_pattern_matching() {
        let by_id = MockPattern::parse("/api/users/:id").unwrap();
        assert!(by_id.matches("/api/users/7"));
        assert!(by_id.matches("/api/users/7/"));
        assert!(!by_id.matches("/api/users"));
        assert!(!by_id.matches("/api/users/7/posts"));

        let files = MockPattern::parse("/files/*path").unwrap();
        assert!(files.matches("/files"));
        assert!(files.matches("/files/a/b/c.txt"));
        assert!(!files.matches("/other"));

        let optional = MockPattern::parse("/api/:id?").unwrap();
        assert!(optional.matches("/api"));
        assert!(optional.matches("/api/1"));
        assert!(!optional.matches("/api/1/2"));

        let root = MockPattern::parse("/").unwrap();
        assert!(root.matches("/"));
        assert!(!root.matches("/x"));
    }

    #[test]
    fn test_differently_named_params_share_a_path() {
        let table = MockTable::from_routes(&[
            route("GET", "/api/:id", json!("get")),
            route("POST", "/api/:name", json!("post")),
        ])
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.find("GET", "/api/1"), Some(&json!("get")));
        assert_eq!(table.find("POST", "/api/1"), Some(&json!("post")));
        assert_eq!(table.find("DELETE", "/api/1"), None);
    }

    #[test]
    fn test_same_shape_and_method_keeps_first() {
        let table = MockTable::from_routes(&[
            route("GET", "/api/:id", json!(1)),
            route("GET", "/api/:name", json!(2)),
        ])
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.find("GET", "/api/x"), Some(&json!(1)));
    }

    #[test]
    fn test_most_specific_mock_wins() {
        let table = MockTable::from_routes(&[
            route("ANY", "/api/*", json!("wildcard")),
            route("ANY", "/api/users/:id", json!("param")),
            route("ANY", "/api/users/me", json!("any-static")),
            route("GET", "/api/users/me", json!("get-static")),
        ])
        .unwrap();
        assert_eq!(table.find("GET", "/api/users/me"), Some(&json!("get-static")));
        assert_eq!(table.find("POST", "/api/users/me"), Some(&json!("any-static")));
        assert_eq!(table.find("GET", "/api/users/7"), Some(&json!("param")));
        assert_eq!(table.find("GET", "/api/other/x"), Some(&json!("wildcard")));
        assert_eq!(table.find("HEAD", "/api/users/me"), Some(&json!("get-static")));
    }

    #[test]
    fn test_invalid_route_is_an_error() {
        let err = MockTable::from_routes(&[route("GET", "/files/*a/b", json!(1))]).unwrap_err();
        assert!(matches!(err, CliError::InvalidMiddleware { .. }));

        let err = MockTable::from_routes(&[route("TRACE", "/x", json!(1))]).unwrap_err();
        assert!(err.to_string().contains("TRACE"));
    }
}
