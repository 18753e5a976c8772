//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name string used as a log field (e.g. "run", "add").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Run { .. } => "run",
        Commands::Add { .. } => "add",
        Commands::List { .. } => "list",
        Commands::Whoami => "whoami",
        Commands::Validate => "validate",
    }
}
