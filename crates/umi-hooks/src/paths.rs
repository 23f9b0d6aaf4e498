//! Project paths shared with plugins.

use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;
use serde::Serialize;

/// Absolute paths of the project being served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPaths {
    pub cwd: PathBuf,
    /// `src/` when present, otherwise the project root.
    pub abs_src_path: PathBuf,
    pub abs_pages_path: PathBuf,
    /// Directory the generated files are written to.
    pub abs_tmp_dir_path: PathBuf,
}

impl HostPaths {
    /// Paths for a project rooted at `cwd` with the default layout.
    pub fn for_root(cwd: impl Into<PathBuf>) -> Self {
        let cwd: PathBuf = cwd.into();
        let src = cwd.join("src");
        let abs_src_path = if src.is_dir() { src } else { cwd.clone() };
        let abs_pages_path = abs_src_path.join("pages");
        let abs_tmp_dir_path = abs_pages_path.join(".umi");
        Self {
            cwd,
            abs_src_path,
            abs_pages_path,
            abs_tmp_dir_path,
        }
    }
}

/// Renders a path with forward slashes on every platform.
pub fn win_path(path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Relative path from `base` to `path`. Both are cleaned first.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    let base = base.clean();
    let path = path.clean();

    let base_parts: Vec<Component<'_>> = base.components().collect();
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let shared = base_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in shared..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[shared..] {
        relative.push(part.as_os_str());
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_sibling() {
        let rel = relative_path(
            Path::new("/app/src/pages/.umi"),
            Path::new("/app/src/layouts/index.js"),
        );
        assert_eq!(win_path(rel), "../../layouts/index.js");
    }

    #[test]
    fn test_relative_path_inside() {
        let rel = relative_path(Path::new("/app"), Path::new("/app/./src/../mock/a.json"));
        assert_eq!(win_path(rel), "mock/a.json");
    }

    #[test]
    fn test_win_path() {
        assert_eq!(win_path("a\\b\\c.js"), "a/b/c.js");
    }

    #[test]
    fn test_for_root_without_src() {
        let dir = tempfile::tempdir().unwrap();
        let paths = HostPaths::for_root(dir.path());
        assert_eq!(paths.abs_src_path, dir.path());
        assert_eq!(paths.abs_tmp_dir_path, dir.path().join("pages").join(".umi"));
    }

    #[test]
    fn test_for_root_with_src() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        let paths = HostPaths::for_root(dir.path());
        assert_eq!(paths.abs_pages_path, dir.path().join("src").join("pages"));
    }
}
