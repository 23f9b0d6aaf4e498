//! Middleware descriptors contributed through `addMiddlewareAhead` and
//! `addMiddleware`.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CliError, Result};
use crate::plugins::mock::MockRoute;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Middleware {
    /// JSON responses for fixed endpoints.
    Mock {
        #[serde(default)]
        routes: Vec<MockRoute>,
    },
    /// Headers added to every response.
    Headers { headers: IndexMap<String, String> },
    /// Files served from a directory, relative to the project root.
    Static {
        dir: PathBuf,
        /// URL prefix. Without one the directory answers every unmatched
        /// request.
        #[serde(default)]
        prefix: Option<String>,
    },
}

/// Parses descriptors in contribution order. A contribution that is itself a
/// list is flattened.
pub fn parse_middlewares(values: Vec<Value>) -> Result<Vec<Middleware>> {
    let mut middlewares = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Array(items) => middlewares.extend(parse_middlewares(items)?),
            value => {
                let middleware = serde_json::from_value(value.clone()).map_err(|e| {
                    CliError::InvalidMiddleware {
                        descriptor: value.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                middlewares.push(middleware);
            }
        }
    }
    Ok(middlewares)
}
