//! Curated role -> skill mappings.
//!
//! A mapping source yields raw `(role, skills)` pairs; the
//! [`RoleMapper`](crate::search::RoleMapper) normalizes and indexes them.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod csv_source;

pub use csv_source::CsvRoleMappingSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMappingEntry {
    pub role: String,
    pub skills: Vec<String>,
}

impl RoleMappingEntry {
    pub fn new<S: Into<String>>(role: impl Into<String>, skills: impl IntoIterator<Item = S>) -> Self {
        Self {
            role: role.into(),
            skills: skills.into_iter().map(Into::into).collect(),
        }
    }
}

pub trait RoleMappingSource: Send + Sync {
    /// `Ok(None)` when the source does not exist; entries in source order otherwise.
    fn load(&self) -> Result<Option<Vec<RoleMappingEntry>>>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Fixed list of mappings.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleMappings {
    entries: Option<Vec<RoleMappingEntry>>,
}

impl InMemoryRoleMappings {
    #[must_use]
    pub const fn new(entries: Vec<RoleMappingEntry>) -> Self {
        Self {
            entries: Some(entries),
        }
    }

    /// A source that behaves like a missing file.
    #[must_use]
    pub const fn missing() -> Self {
        Self { entries: None }
    }
}

impl RoleMappingSource for InMemoryRoleMappings {
    fn load(&self) -> Result<Option<Vec<RoleMappingEntry>>> {
        Ok(self.entries.clone())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

/// Split a comma-separated skills cell, trimming and dropping empty items.
#[must_use]
pub fn parse_skill_list(raw: &str) -> Vec<String> {
    clean_skills(raw.split(','))
}

/// Trim and drop empty skill names.
pub fn clean_skills<'a, I>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    skills
        .into_iter()
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(ToString::to_string)
        .collect()
}
