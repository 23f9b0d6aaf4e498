//! `umi g <generator> <name>`: run a plugin-registered generator.
//!
//! Nothing is written unless every target path is free.

use std::fs;
use std::path::PathBuf;

use umi_hooks::GeneratorContext;

use crate::cli::GeneratorArgs;
use crate::commands::GlobalOptions;
use crate::error::{CliError, GenerateError, Result};
use crate::service::Service;
use crate::ui;

pub fn execute(globals: &GlobalOptions, args: GeneratorArgs) -> Result<()> {
    let mut service = globals.service(false);
    service.init()?;

    let written = run_generator(&service, &args.generator, &args.name, &args.args)?;
    for path in &written {
        ui::success(&format!("Created {}", ui::display_path(&globals.cwd, path)));
    }
    Ok(())
}

/// Runs `generator` and writes its files. Returns the written paths.
pub fn run_generator(
    service: &Service,
    generator: &str,
    name: &str,
    args: &[String],
) -> Result<Vec<PathBuf>> {
    let host = service.host();
    let spec = host
        .generator(generator)
        .ok_or_else(|| CliError::UnknownGenerator {
            name: generator.to_string(),
            available: host
                .generators()
                .map(|(name, _)| name)
                .collect::<Vec<_>>()
                .join(", "),
        })?;

    let ctx = GeneratorContext {
        name,
        args,
        paths: host.paths(),
    };
    let files = (spec.generate)(&ctx).map_err(|source| CliError::Plugin {
        context: format!("Generator '{generator}' failed"),
        source,
    })?;

    if let Some(existing) = files.iter().find(|file| file.path.exists()) {
        return Err(GenerateError::AlreadyExists(existing.path.clone()).into());
    }

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        if let Some(parent) = file.path.parent() {
            fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&file.path, &file.contents).map_err(|source| GenerateError::Write {
            path: file.path.clone(),
            source,
        })?;
        written.push(file.path);
    }
    Ok(written)
}
