//! `umi generate`: write the generated files once.

use crate::cli::GenerateArgs;
use crate::commands::GlobalOptions;
use crate::error::Result;
use crate::generate::FilesGenerator;
use crate::ui;

pub fn execute(globals: &GlobalOptions, args: GenerateArgs) -> Result<()> {
    let mut service = globals.service(args.production);
    service.init()?;

    let mut generator = FilesGenerator::new(service.host(), service.config())?;
    let report = generator.generate()?;

    for path in &report.written {
        ui::success(&format!("Generated {}", ui::display_path(&globals.cwd, path)));
    }
    if report.written.is_empty() {
        ui::info("Generated files are up to date");
    }
    Ok(())
}
