//! `umi dev`: generate the files, then serve the project until Ctrl+C.

use tracing::warn;

use crate::cli::DevArgs;
use crate::commands::GlobalOptions;
use crate::dev::DevServer;
use crate::error::Result;
use crate::generate::FilesGenerator;
use crate::ui;

pub async fn execute(globals: &GlobalOptions, args: DevArgs) -> Result<()> {
    ui::info("Starting development server...");

    let mut service = globals.service(false);
    service.init()?;
    let config = service.config();

    let mut generator = FilesGenerator::new(service.host(), config.clone())?;
    generator.generate()?;

    let host = args.host.unwrap_or(config.dev_server.host);
    let port = args.port.unwrap_or(config.dev_server.port);
    let server = DevServer::start(&service, &host, port).await?;
    ui::success(&format!("Development server running at {}", server.url()));

    server.serve(shutdown_signal()).await?;
    ui::info("Development server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
    }
}
