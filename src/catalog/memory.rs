//! In-memory catalog for embedding callers and tests.

use parking_lot::RwLock;

use crate::error::Result;

use super::{SkillCatalogSource, SkillRecord, sanitize};

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    records: RwLock<Vec<SkillRecord>>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new(records: Vec<SkillRecord>) -> Self {
        Self {
            records: RwLock::new(sanitize(records)),
        }
    }

    /// Replace the catalog contents; the index sees them on its next refresh.
    pub fn replace(&self, records: Vec<SkillRecord>) {
        *self.records.write() = sanitize(records);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl SkillCatalogSource for InMemoryCatalog {
    fn fetch_active(&self) -> Result<Vec<SkillRecord>> {
        Ok(self.records.read().clone())
    }
}
