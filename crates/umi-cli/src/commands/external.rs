//! `umi <command>`: dispatch to a command registered by a plugin.
//!
//! The invocation passes through `_modifyCommand` as `{name, args}` first, so
//! plugins can alias or rewrite commands.

use serde_json::{json, Value};
use tracing::debug;
use umi_hooks::CommandContext;

use crate::commands::GlobalOptions;
use crate::error::{CliError, Result};
use crate::service::Service;

pub fn execute(globals: &GlobalOptions, argv: Vec<String>) -> Result<()> {
    let mut service = globals.service(false);
    service.init()?;
    run_command(&service, argv)
}

pub fn run_command(service: &Service, argv: Vec<String>) -> Result<()> {
    let mut argv = argv.into_iter();
    let name = argv
        .next()
        .ok_or_else(|| CliError::InvalidArgument("missing command name".to_string()))?;
    let args: Vec<String> = argv.collect();

    let (name, args) = modify_command(service, name, args)?;
    debug!(command = %name, args = ?args, "Dispatching plugin command");

    let Some(spec) = service.host().command(&name) else {
        return Err(CliError::InvalidArgument(format!(
            "unknown command '{name}'\n\n{}",
            help_text(service)?
        )));
    };

    let ctx = CommandContext {
        args: &args,
        host: service.host(),
    };
    (spec.run)(&ctx).map_err(|source| CliError::Plugin {
        context: format!("Command '{name}' failed"),
        source,
    })
}

fn modify_command(service: &Service, name: String, args: Vec<String>) -> Result<(String, Vec<String>)> {
    let modified = service.host().transform(
        "_modifyCommand",
        json!({ "name": name, "args": args }),
        Value::Null,
    )?;

    let name = modified
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| CliError::InvalidArgument("_modifyCommand dropped the command name".to_string()))?
        .to_string();
    let args = match modified.get("args") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok((name, args))
}

/// Plugin command listing, after `_modifyHelpInfo`.
fn help_text(service: &Service) -> Result<String> {
    let info = service.help_info()?;
    let commands = info
        .get("commands")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if commands.is_empty() {
        return Ok("Hint: No plugin commands are registered. Run `umi --help` for built-in commands".to_string());
    }

    let mut text = String::from("Hint: Plugin commands:");
    for command in commands {
        let name = command.get("name").and_then(Value::as_str).unwrap_or_default();
        let description = command
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        text.push_str(&format!("\n  {name:<16} {description}"));
    }
    Ok(text)
}
