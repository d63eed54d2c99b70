//! skill-suggest mappings - Inspect and edit the role -> skills knowledge base

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{Report, Sheet, emit};
use crate::error::Result;
use crate::mapping::RoleMappingEntry;

#[derive(Args, Debug)]
pub struct MappingsArgs {
    #[command(subcommand)]
    pub command: MappingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MappingsCommand {
    /// List every mapping in file order
    List,

    /// Add a role with its skills
    Add {
        /// Role name
        role: String,

        /// Comma-separated skill names
        #[arg(long, short, value_delimiter = ',', required = true)]
        skills: Vec<String>,
    },

    /// Replace the skills of a role, optionally renaming it
    Update {
        /// Existing role name (case-insensitive)
        role: String,

        /// Comma-separated skill names
        #[arg(long, short, value_delimiter = ',', required = true)]
        skills: Vec<String>,

        /// New role name
        #[arg(long)]
        rename: Option<String>,
    },

    /// Remove a role
    Remove {
        /// Role name (case-insensitive)
        role: String,
    },

    /// Reload the mapping file and report how many roles resolve
    Reload,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    path: String,
    count: usize,
    mappings: Vec<RoleMappingEntry>,
}

#[derive(Debug, Serialize)]
struct EditOutput {
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mapping: Option<RoleMappingEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    removed: Option<usize>,
    roles_loaded: usize,
}

pub fn run(ctx: &AppContext, args: &MappingsArgs) -> Result<()> {
    match &args.command {
        MappingsCommand::List => run_list(ctx),
        MappingsCommand::Add { role, skills } => {
            let entry = ctx.mappings.add(role, skills)?;
            report_edit(ctx, "added", Some(entry), None)
        }
        MappingsCommand::Update {
            role,
            skills,
            rename,
        } => {
            let new_role = rename.as_deref().unwrap_or(role);
            let entry = ctx.mappings.update(role, new_role, skills)?;
            report_edit(ctx, "updated", Some(entry), None)
        }
        MappingsCommand::Remove { role } => {
            let removed = ctx.mappings.remove(role)?;
            report_edit(ctx, "removed", None, Some(removed))
        }
        MappingsCommand::Reload => report_edit(ctx, "reloaded", None, None),
    }
}

fn run_list(ctx: &AppContext) -> Result<()> {
    let mappings = ctx.mappings.list()?;
    let output = ListOutput {
        path: ctx.mappings.path().display().to_string(),
        count: mappings.len(),
        mappings,
    };
    emit(ctx.robot_mode, &output)
}

fn report_edit(
    ctx: &AppContext,
    action: &'static str,
    mapping: Option<RoleMappingEntry>,
    removed: Option<usize>,
) -> Result<()> {
    let roles_loaded = ctx.service.reload_role_mapping(&ctx.mappings)?;
    let output = EditOutput {
        action,
        mapping,
        removed,
        roles_loaded,
    };
    emit(ctx.robot_mode, &output)
}

impl Report for ListOutput {
    fn render(&self, sheet: &mut Sheet) {
        sheet
            .heading("Role Mappings")
            .field("Path", &self.path)
            .field("Roles", self.count);
        if self.mappings.is_empty() {
            sheet.note("No mappings yet; add one with `skill-suggest mappings add`");
            return;
        }
        sheet.heading("Roles");
        for entry in &self.mappings {
            sheet.mapping(&entry.role, &entry.skills);
        }
    }
}

impl Report for EditOutput {
    fn render(&self, sheet: &mut Sheet) {
        sheet.heading("Role Mappings").field("Action", self.action);
        if let Some(entry) = &self.mapping {
            sheet.field("Role", &entry.role).field("Skills", entry.skills.join(", "));
        }
        if let Some(removed) = self.removed {
            sheet.field("Removed", removed);
        }
        sheet.field("Roles loaded", self.roles_loaded);
    }
}
