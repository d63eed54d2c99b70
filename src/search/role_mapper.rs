//! Curated role -> skills table with exact and fuzzy lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::mapping::{RoleMappingEntry, RoleMappingSource, clean_skills};
use crate::search::fuzzy;
use crate::search::normalize::role_key;

/// Immutable table keyed by normalized role.
#[derive(Debug, Clone, Default)]
pub struct RoleMappingTable {
    // Ordered so fuzzy scans visit roles in a stable order.
    entries: BTreeMap<String, Vec<String>>,
}

impl RoleMappingTable {
    /// Later duplicate roles replace earlier ones. Rows left with no skills
    /// after cleaning are skipped, so they never shadow an earlier mapping.
    pub fn from_entries(entries: impl IntoIterator<Item = RoleMappingEntry>) -> Self {
        let mut table = BTreeMap::new();
        for entry in entries {
            let key = role_key(&entry.role);
            if key.is_empty() {
                continue;
            }
            let mut skills: Vec<String> = Vec::new();
            for skill in clean_skills(entry.skills.iter().map(String::as_str)) {
                if !skills.contains(&skill) {
                    skills.push(skill);
                }
            }
            if skills.is_empty() {
                debug!(role = %entry.role, "skipping role mapping with no skills");
                continue;
            }
            table.insert(key, skills);
        }
        Self { entries: table }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, normalized_role: &str) -> Option<&[String]> {
        self.entries.get(normalized_role).map(Vec::as_slice)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleMatch {
    /// The table key that matched.
    pub role: String,
    pub skills: Vec<String>,
    /// 1.0 for an exact key hit.
    pub score: f32,
}

pub struct RoleMapper {
    table: RwLock<Arc<RoleMappingTable>>,
}

impl Default for RoleMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleMapper {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Arc::new(RoleMappingTable::default())),
        }
    }

    /// Replace the table from `source`; returns the number of distinct roles.
    ///
    /// A missing source installs an empty table. A load error leaves the
    /// current table in place.
    pub fn load(&self, source: &dyn RoleMappingSource) -> Result<usize> {
        let table = match source.load()? {
            Some(entries) => RoleMappingTable::from_entries(entries),
            None => {
                info!(source = %source.describe(), "no role mapping source; using empty table");
                RoleMappingTable::default()
            }
        };
        let count = self.replace(table);
        info!(roles = count, source = %source.describe(), "role mapping loaded");
        Ok(count)
    }

    /// Publish `table`, returning its size.
    pub fn replace(&self, table: RoleMappingTable) -> usize {
        let count = table.len();
        *self.table.write() = Arc::new(table);
        count
    }

    #[must_use]
    pub fn table(&self) -> Arc<RoleMappingTable> {
        Arc::clone(&self.table.read())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Exact key lookup, then the best fuzzy key at or above `fuzzy_threshold`.
    #[must_use]
    pub fn resolve(&self, role: &str, fuzzy_threshold: f32, containment_boost: f32) -> Option<RoleMatch> {
        let table = self.table();
        let key = role_key(role);
        if key.is_empty() || table.is_empty() {
            return None;
        }

        if let Some(skills) = table.get(&key) {
            info!(role = %key, skills = skills.len(), "exact role match");
            return Some(RoleMatch {
                role: key,
                skills: skills.to_vec(),
                score: 1.0,
            });
        }

        let best = fuzzy::best_match(&key, table.roles(), containment_boost)?;
        if best.score < fuzzy_threshold {
            debug!(role = %key, best = best.candidate, score = best.score, "no role match above threshold");
            return None;
        }
        info!(role = %key, matched = best.candidate, score = best.score, "fuzzy role match");
        Some(RoleMatch {
            role: best.candidate.to_string(),
            skills: table.get(best.candidate).unwrap_or_default().to_vec(),
            score: best.score,
        })
    }
}
