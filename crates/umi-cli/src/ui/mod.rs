//! Terminal status output.
//!
//! Status lines go to stderr so `umi config` and `umi hooks --json` keep
//! stdout machine-readable.

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{display_path, format_points_table};
pub use messages::{error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Decides once whether status lines are colored.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && crate::logger::should_use_colors();
    COLORS.store(enabled, Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
