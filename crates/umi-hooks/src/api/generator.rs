use std::path::PathBuf;
use std::sync::Arc;

use crate::paths::HostPaths;

/// Produces the files of one `umi g <generator> <name>` run.
pub type GenerateFn =
    Arc<dyn Fn(&GeneratorContext<'_>) -> anyhow::Result<Vec<GeneratedFile>> + Send + Sync>;

/// A named scaffolding generator.
#[derive(Clone)]
pub struct GeneratorSpec {
    pub description: String,
    pub generate: GenerateFn,
}

impl GeneratorSpec {
    pub fn new<F>(description: impl Into<String>, generate: F) -> Self
    where
        F: Fn(&GeneratorContext<'_>) -> anyhow::Result<Vec<GeneratedFile>> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            generate: Arc::new(generate),
        }
    }
}

impl std::fmt::Debug for GeneratorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorSpec")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Inputs to a generator run.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    /// The name given on the command line, e.g. `users/list`.
    pub name: &'a str,
    /// Remaining command-line arguments.
    pub args: &'a [String],
    pub paths: &'a HostPaths,
}

/// A file a generator wants written. Paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}
