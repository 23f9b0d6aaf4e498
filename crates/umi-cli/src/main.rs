//! umi CLI entry point: parses arguments, sets up logging and dispatches.

use clap::Parser;
use miette::Result;
use umi_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match commands::GlobalOptions::from_cli(&args) {
        Ok(globals) => match args.command {
            cli::Command::Generate(a) => commands::generate_execute(&globals, a),
            cli::Command::Dev(a) => commands::dev_execute(&globals, a).await,
            cli::Command::Generator(a) => commands::generator_execute(&globals, a),
            cli::Command::Hooks(a) => commands::hooks_execute(&globals, a),
            cli::Command::Config(a) => commands::config_execute(&globals, a),
            cli::Command::External(argv) => commands::external_execute(&globals, argv),
        },
        Err(e) => Err(e),
    };

    result.map_err(error::cli_error_to_miette)
}
