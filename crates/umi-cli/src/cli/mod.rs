//! Command-line interface definition for umi.
//!
//! - `umi generate` - write the generated entry, router and history files
//! - `umi dev` - generate, then serve the project with plugin middleware
//! - `umi g <generator> <name>` - run a plugin-registered generator
//! - `umi hooks` - list extension points and their handlers
//! - `umi config` - print the resolved config
//! - `umi <command>` - run a plugin-registered command

mod commands;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{Command, ConfigArgs, DevArgs, GenerateArgs, GeneratorArgs, HooksArgs};

/// umi - plugin-driven front-end application tooling
#[derive(Parser, Debug)]
#[command(
    name = "umi",
    version,
    about = "Plugin-driven front-end application tooling",
    long_about = "umi loads its built-in and user plugins, resolves the project config through\n\
                  them, and generates the application entry files from what plugins contribute."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Config file to use instead of .umirc.toml / .umirc.json
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
