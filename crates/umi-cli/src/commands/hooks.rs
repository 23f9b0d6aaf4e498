//! `umi hooks`: list extension points with their kinds and handler counts.

use umi_hooks::Visibility;

use crate::cli::HooksArgs;
use crate::commands::GlobalOptions;
use crate::error::Result;
use crate::ui;

pub fn execute(globals: &GlobalOptions, args: HooksArgs) -> Result<()> {
    let mut service = globals.service(false);
    service.init_plugins()?;

    let rows: Vec<_> = service
        .host()
        .point_listing()
        .into_iter()
        .filter(|(info, _)| args.all || info.visibility == Visibility::Public)
        .collect();

    if args.json {
        let json: Vec<_> = rows
            .iter()
            .map(|(info, handlers)| -> serde_json::Result<serde_json::Value> {
                let mut value = serde_json::to_value(info)?;
                value["handlers"] = (*handlers).into();
                Ok(value)
            })
            .collect::<serde_json::Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print!("{}", ui::format_points_table(&rows));
    }
    Ok(())
}
