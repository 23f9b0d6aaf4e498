//! Command implementations for the umi CLI.
//!
//! Every command builds a [`Service`] for the project, loads the plugins and
//! then drives the checkpoints it needs.

pub mod config;
pub mod dev;
pub mod external;
pub mod generate;
pub mod generator;
pub mod hooks;

use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::service::{Service, ServiceOptions};

pub use config::execute as config_execute;
pub use dev::execute as dev_execute;
pub use external::execute as external_execute;
pub use generate::execute as generate_execute;
pub use generator::execute as generator_execute;
pub use hooks::execute as hooks_execute;

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Project root.
    pub cwd: PathBuf,
    /// Config file given with `--config`.
    pub config: Option<PathBuf>,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = match &cli.cwd {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        if !cwd.is_dir() {
            return Err(CliError::FileNotFound(cwd));
        }
        let cwd = cwd.canonicalize()?;
        Ok(Self {
            cwd,
            config: cli.config.clone(),
        })
    }

    pub(crate) fn service(&self, production: bool) -> Service {
        Service::new(
            self.cwd.clone(),
            ServiceOptions {
                production,
                config_file: self.config.clone(),
                plugins: Vec::new(),
            },
        )
    }
}
