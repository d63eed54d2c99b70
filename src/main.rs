//! skill-suggest - Hybrid role -> skill suggestions
//!
//! Curated role mappings first, nearest-neighbor search over skill-name
//! embeddings to fill the rest.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use skill_suggest::app::AppContext;
use skill_suggest::cli::output::emit_failure;
use skill_suggest::cli::{Cli, commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if !cli.quiet {
        init_tracing(cli.verbose, cli.robot);
    }

    let outcome = AppContext::from_cli(&cli).and_then(|ctx| commands::run(&ctx, &cli.command));
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            emit_failure(cli.robot, &err);
            ExitCode::FAILURE
        }
    }
}

/// Logs always go to stderr; stdout is reserved for command output.
fn init_tracing(verbose: u8, json: bool) {
    let default_directives = match verbose {
        0 => "warn,skill_suggest=info",
        1 => "info,skill_suggest=debug",
        2 => "debug,skill_suggest=trace",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let layer = fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer.with_target(verbose > 0)).init();
    }
}
