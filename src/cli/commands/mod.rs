//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod health;
pub mod mappings;
pub mod refresh;
pub mod suggest;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Suggest(args) => suggest::run(ctx, args),
        Commands::Refresh(args) => refresh::run(ctx, args),
        Commands::Health(args) => health::run(ctx, args),
        Commands::Mappings(args) => mappings::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Suggest skills for a job role
    Suggest(suggest::SuggestArgs),

    /// Rebuild the skill index from the catalog
    Refresh(refresh::RefreshArgs),

    /// Report index and role-mapping status
    Health(health::HealthArgs),

    /// Inspect and edit the role -> skills knowledge base
    Mappings(mappings::MappingsArgs),
}
