//! Development server.
//!
//! Startup fires, in order: `beforeDevServer`, `_beforeServerWithApp` once
//! the router is built, `afterDevServer` once the socket is bound and
//! `onDevCompileDone` right before requests are served. Every notification
//! receives `{host, port}`.

mod middleware;
mod mocks;
mod server;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::info;

pub use middleware::{parse_middlewares, Middleware};
pub use mocks::{MockPattern, MockTable};
pub use server::build_router;

use crate::error::{CliError, Result};
use crate::service::Service;

/// A bound dev server that has not started serving yet.
pub struct DevServer {
    listener: TcpListener,
    app: Router,
    addr: SocketAddr,
}

impl DevServer {
    /// Runs the startup checkpoints and binds `host:port`. Port 0 picks a
    /// free port.
    pub async fn start(service: &Service, host: &str, port: u16) -> Result<Self> {
        service.notify("beforeDevServer", json!({ "host": host, "port": port }))?;

        let mut descriptors = service.host().collect("addMiddlewareAhead", Value::Null)?;
        descriptors.extend(service.host().collect("addMiddleware", Value::Null)?);
        let middlewares = parse_middlewares(descriptors)?;
        let app = build_router(&middlewares, service.paths())?;
        service.notify(
            "_beforeServerWithApp",
            json!({ "host": host, "port": port, "middlewares": middlewares.len() }),
        )?;

        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {host}:{port}: {e}")))?;
        let addr = listener.local_addr()?;
        let url = format!("http://{addr}");

        service.notify(
            "afterDevServer",
            json!({ "host": host, "port": addr.port(), "url": url }),
        )?;
        service.notify(
            "onDevCompileDone",
            json!({ "host": host, "port": addr.port(), "isFirstCompile": true }),
        )?;

        info!(url = %url, "Dev server ready");
        Ok(Self {
            listener,
            app,
            addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| CliError::Server(format!("Server error: {e}")))
    }
}
