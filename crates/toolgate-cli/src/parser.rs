//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::{Commands, ServeArgs};

/// Bridge SSE clients to stdio tool connectors.
///
/// Running without a subcommand is the same as `toolgate serve`.
#[derive(Debug, Parser)]
#[command(name = "toolgate")]
#[command(version, about = "Bridge SSE clients to stdio tool connectors")]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to run, falling back to `serve` with the top-level args.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve(self.serve))
    }
}
