//! skill-suggest refresh - Rebuild the skill index

use std::time::Instant;

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{Report, Sheet, emit};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Reload the embedding provider before rebuilding (after a model retrain)
    #[arg(long)]
    pub reembed: bool,
}

#[derive(Debug, Serialize)]
struct RefreshOutput {
    skills_indexed: usize,
    reembed: bool,
    elapsed_ms: u64,
}

pub fn run(ctx: &AppContext, args: &RefreshArgs) -> Result<()> {
    ctx.initialize()?;

    let start = Instant::now();
    let skills_indexed = ctx.service.refresh(args.reembed)?;
    let output = RefreshOutput {
        skills_indexed,
        reembed: args.reembed,
        elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    };

    emit(ctx.robot_mode, &output)
}

impl Report for RefreshOutput {
    fn render(&self, sheet: &mut Sheet) {
        sheet
            .heading("Index Refreshed")
            .field("Skills indexed", self.skills_indexed)
            .flag("Re-embedded", self.reembed)
            .field("Elapsed", format_args!("{} ms", self.elapsed_ms));
    }
}
