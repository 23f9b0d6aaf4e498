//! umi CLI - plugin-driven front-end application tooling.
//!
//! The binary loads the built-in plugins (and any user plugins passed to
//! [`service::Service`]), resolves the project config through them and
//! generates the application's entry files from what they contribute.
//!
//! # Architecture
//!
//! - [`service`] - plugin loading and the pipeline checkpoints
//! - [`config`] - `.umirc` loading, env overrides and plugin validators
//! - [`generate`] - `umi.js`, `router.js` and `history.js`
//! - [`dev`] - the development server built from plugin middleware
//! - [`plugins`] - plugins shipped with the CLI
//! - [`commands`] - one module per subcommand
//!
//! # Example
//!
//! ```rust,no_run
//! use umi_cli::generate::FilesGenerator;
//! use umi_cli::service::{Service, ServiceOptions};
//!
//! fn main() -> umi_cli::Result<()> {
//!     let mut service = Service::new("/path/to/app", ServiceOptions::default());
//!     service.init()?;
//!     let mut generator = FilesGenerator::new(service.host(), service.config())?;
//!     generator.generate()?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod generate;
pub mod logger;
pub mod plugins;
pub mod service;
pub mod ui;

pub use error::{CliError, ConfigError, GenerateError, Result, ResultExt};
