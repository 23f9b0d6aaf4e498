use std::sync::Arc;

use crate::host::PluginHost;

/// Body of a plugin-provided CLI subcommand.
pub type CommandFn = Arc<dyn Fn(&CommandContext<'_>) -> anyhow::Result<()> + Send + Sync>;

/// A CLI subcommand contributed by a plugin.
#[derive(Clone)]
pub struct CommandSpec {
    pub description: String,
    pub usage: Option<String>,
    pub run: CommandFn,
}

impl CommandSpec {
    pub fn new<F>(description: impl Into<String>, run: F) -> Self
    where
        F: Fn(&CommandContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            usage: None,
            run: Arc::new(run),
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("description", &self.description)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// What a plugin command sees when it runs.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    pub args: &'a [String],
    pub host: &'a PluginHost,
}
