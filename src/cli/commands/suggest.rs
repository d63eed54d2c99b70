//! skill-suggest suggest - Suggest skills for a job role

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{Report, Sheet, emit};
use crate::error::Result;
use crate::search::{MatchSource, SearchMethod, SearchResult};

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Job role, e.g. "Senior MERN Stack Developer"
    pub role: String,

    /// Maximum number of suggestions [default: search.default_limit]
    #[arg(long, short)]
    pub limit: Option<usize>,

    /// Minimum semantic similarity [default: search.similarity_threshold]
    #[arg(long, short)]
    pub threshold: Option<f32>,

    /// Ignore the curated role mappings
    #[arg(long)]
    pub semantic_only: bool,
}

#[derive(Debug, Serialize)]
struct SuggestionView {
    skill_id: i32,
    skill_name: String,
    confidence: f32,
    source: MatchSource,
}

#[derive(Debug, Serialize)]
struct SuggestOutput {
    role: String,
    normalized_role: String,
    method: SearchMethod,
    matches: Vec<SuggestionView>,
}

impl SuggestOutput {
    fn new(role: &str, result: SearchResult) -> Self {
        Self {
            role: role.to_string(),
            normalized_role: result.normalized_role,
            method: result.method,
            matches: result
                .matches
                .into_iter()
                .map(|m| SuggestionView {
                    skill_id: m.skill_id,
                    skill_name: m.skill_name,
                    confidence: round2(m.confidence),
                    source: m.source,
                })
                .collect(),
        }
    }
}

pub fn run(ctx: &AppContext, args: &SuggestArgs) -> Result<()> {
    ctx.initialize()?;

    let settings = ctx.service.settings();
    let limit = args.limit.unwrap_or(settings.default_limit);
    let threshold = args.threshold.unwrap_or(settings.similarity_threshold);
    let use_mapping = settings.use_mapping && !args.semantic_only;

    let result = ctx
        .service
        .hybrid_search(&args.role, limit, threshold, use_mapping)?;
    let output = SuggestOutput::new(&args.role, result);

    emit(ctx.robot_mode, &output)
}

impl Report for SuggestOutput {
    fn render(&self, sheet: &mut Sheet) {
        sheet
            .heading("Skill Suggestions")
            .field("Role", &self.role)
            .field("Normalized", &self.normalized_role)
            .field("Method", self.method.as_str())
            .heading("Matches");
        if self.matches.is_empty() {
            sheet.note("No skills matched");
        }
        for m in &self.matches {
            sheet.suggestion(m.confidence, &m.skill_name, m.source);
        }
    }
}

/// Presentation rounding; the engine itself never rounds.
fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
