//! Result types returned by the search engine.

use serde::{Deserialize, Serialize};

use crate::catalog::SkillId;

/// Why a skill ended up in the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Mapped,
    Semantic,
}

/// How a result list was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// Curated role map alone.
    Mapped,
    /// Curated role map topped up with semantic matches.
    Hybrid,
    /// Nearest-neighbor search alone.
    Semantic,
}

impl SearchMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mapped => "mapped",
            Self::Hybrid => "hybrid",
            Self::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill_id: SkillId,
    pub skill_name: String,
    /// In `[0, 1]`.
    pub confidence: f32,
    pub source: MatchSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub normalized_role: String,
    /// Highest confidence first, except that mapped matches keep their curated order.
    pub matches: Vec<SkillMatch>,
    pub method: SearchMethod,
}

/// Resolution of a raw skill name against the index's name table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    pub skill_id: SkillId,
    pub canonical_name: String,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHealth {
    pub initialized: bool,
    pub skill_count: usize,
}
