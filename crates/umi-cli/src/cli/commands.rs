use clap::{Args, Subcommand};

/// Available umi subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the generated files once
    ///
    /// Runs every plugin, then writes umi.js, router.js and history.js into
    /// the temporary directory (pages/.umi).
    Generate(GenerateArgs),

    /// Generate files and start the development server
    ///
    /// Middleware contributed by plugins (mock data, headers, static
    /// directories) is mounted in contribution order.
    Dev(DevArgs),

    /// Run a generator registered by a plugin
    #[command(name = "g")]
    Generator(GeneratorArgs),

    /// List extension points, their kinds and handler counts
    Hooks(HooksArgs),

    /// Print the resolved config as JSON
    Config(ConfigArgs),

    /// A command registered by a plugin
    #[command(external_subcommand)]
    External(Vec<String>),
}

/// Arguments for the generate command
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Write into .umi-production instead of .umi
    #[arg(long)]
    pub production: bool,
}

/// Arguments for the dev command
#[derive(Args, Debug, Default)]
pub struct DevArgs {
    /// Port to listen on (overrides devServer.port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind (overrides devServer.host)
    #[arg(long)]
    pub host: Option<String>,
}

/// Arguments for the g command
#[derive(Args, Debug)]
pub struct GeneratorArgs {
    /// Generator to run, e.g. `page`
    pub generator: String,

    /// Name passed to the generator, e.g. `users/list`
    pub name: String,

    /// Extra arguments forwarded to the generator
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the hooks command
#[derive(Args, Debug, Default)]
pub struct HooksArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Include private (`_`-prefixed) points
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the config command
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Print the JSON schema of the core config fields instead
    #[arg(long)]
    pub schema: bool,
}
