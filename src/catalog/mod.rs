//! Skill catalog sources.
//!
//! The catalog is the read-only list of active skills the index embeds. It is
//! fetched in full on every initialize and refresh.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryCatalog;
pub use sqlite::SqliteCatalog;

/// Skill identifiers are stored as i32 on disk.
pub type SkillId = i32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub id: SkillId,
    pub name: String,
}

impl SkillRecord {
    pub fn new(id: SkillId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

pub trait SkillCatalogSource: Send + Sync {
    /// Every active skill, ascending by id, with non-blank names.
    fn fetch_active(&self) -> Result<Vec<SkillRecord>>;
}

/// Drop blank names and duplicate ids, then order by id.
#[must_use]
pub fn sanitize(records: Vec<SkillRecord>) -> Vec<SkillRecord> {
    let mut records: Vec<SkillRecord> = records
        .into_iter()
        .filter(|record| !record.name.trim().is_empty())
        .collect();
    records.sort_by_key(|record| record.id);
    records.dedup_by_key(|record| record.id);
    records
}
