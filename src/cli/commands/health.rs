//! skill-suggest health - Report index and role-mapping status

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{Report, Sheet, emit};
use crate::error::Result;
use crate::search::ServiceHealth;

#[derive(Args, Debug)]
pub struct HealthArgs {}

#[derive(Debug, Serialize)]
struct HealthOutput {
    #[serde(flatten)]
    health: ServiceHealth,
    #[serde(skip)]
    root: PathBuf,
    #[serde(skip)]
    cached_queries: Option<usize>,
    /// `code: message` of the initialization failure, if any.
    #[serde(skip)]
    failure: Option<String>,
}

/// Initialization failures are reported, not returned.
pub fn run(ctx: &AppContext, _args: &HealthArgs) -> Result<()> {
    let failure = ctx
        .initialize()
        .err()
        .map(|err| format!("{}: {err}", err.code()));
    let output = HealthOutput {
        health: ctx.service.health(),
        root: ctx.root.clone(),
        cached_queries: ctx.service.cache_stats().map(|stats| stats.entries),
        failure,
    };
    emit(ctx.robot_mode, &output)
}

impl Report for HealthOutput {
    fn render(&self, sheet: &mut Sheet) {
        sheet
            .heading("Health")
            .flag("Initialized", self.health.initialized)
            .field("Skills", self.health.skill_count)
            .field("Roles loaded", self.health.roles_loaded)
            .field("Root", self.root.display());
        if let Some(entries) = self.cached_queries {
            sheet.field("Query cache", format_args!("{entries} entries"));
        }
        if let Some(failure) = &self.failure {
            sheet.heading("Warnings").note(failure);
        }
    }

    fn warnings(&self) -> Vec<String> {
        self.failure.iter().cloned().collect()
    }
}
