//! Formatting helpers for command output.

use std::path::Path;

use owo_colors::OwoColorize;
use umi_hooks::paths::{relative_path, win_path};
use umi_hooks::{PointInfo, Visibility};

use super::colors_enabled;

/// `path` relative to `base` when it lives below it.
pub fn display_path(base: &Path, path: &Path) -> String {
    if path.starts_with(base) {
        win_path(relative_path(base, path))
    } else {
        win_path(path)
    }
}

/// Renders extension points as an aligned table.
pub fn format_points_table(rows: &[(PointInfo, usize)]) -> String {
    let width = rows
        .iter()
        .map(|(info, _)| info.name.len())
        .max()
        .unwrap_or(0)
        .max("POINT".len());

    let mut out = format!(
        "{:<width$}  {:<10}  {:<7}  {:>8}  ORIGIN\n",
        "POINT", "KIND", "ACCESS", "HANDLERS"
    );
    for (info, handlers) in rows {
        let origin = match (info.builtin, info.custom) {
            (true, _) => "built-in",
            (false, true) => "custom",
            (false, false) => "declared",
        };
        let access = match info.visibility {
            Visibility::Public => "public",
            Visibility::Private => "private",
        };
        let line = format!(
            "{:<width$}  {:<10}  {:<7}  {:>8}  {}",
            info.name,
            info.kind.as_str(),
            access,
            handlers,
            origin
        );
        if colors_enabled() && *handlers == 0 {
            out.push_str(&line.dimmed().to_string());
        } else {
            out.push_str(&line);
        }
        out.push('\n');
    }
    out
}
