//! `umi config`: print the resolved config, or its schema.

use crate::cli::ConfigArgs;
use crate::commands::GlobalOptions;
use crate::config::UserConfig;
use crate::error::Result;
use crate::ui;

pub fn execute(globals: &GlobalOptions, args: ConfigArgs) -> Result<()> {
    if args.schema {
        println!("{}", serde_json::to_string_pretty(&UserConfig::json_schema())?);
        return Ok(());
    }

    let mut service = globals.service(false);
    service.init_plugins()?;
    let resolved = service.resolve_config()?;

    match &resolved.source {
        Some(path) => ui::info(&format!("Config: {}", ui::display_path(&globals.cwd, path))),
        None => ui::info("No config file, using defaults"),
    }
    for key in &resolved.unknown_keys {
        ui::warning(&format!("Unknown config key '{key}'"));
    }
    println!("{}", serde_json::to_string_pretty(&resolved.raw)?);
    Ok(())
}
