//! SQLite-backed skill catalog

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{Result, SuggestError};

use super::{SkillCatalogSource, SkillId, SkillRecord, sanitize};

/// Default query: `(id, name)` of every active skill, ordered by id.
pub const DEFAULT_CATALOG_QUERY: &str =
    "SELECT skill_id, skill_name FROM skills WHERE active = 1 ORDER BY skill_id";

/// Read-only view over a skills table.
///
/// A connection is opened per fetch; fetches are rare (startup and refresh)
/// and this keeps the source `Send + Sync` without a pool.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    path: PathBuf,
    query: String,
}

impl SqliteCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_query(path, DEFAULT_CATALOG_QUERY)
    }

    /// Use a custom query; it must return `(integer id, text name)` rows.
    pub fn with_query(path: impl Into<PathBuf>, query: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| {
            SuggestError::CatalogFetch(format!("open {}: {err}", self.path.display()))
        })?;
        conn.execute_batch("PRAGMA query_only = ON;")
            .map_err(|err| SuggestError::CatalogFetch(format!("configure connection: {err}")))?;
        Ok(conn)
    }

    fn query_rows(&self, conn: &Connection) -> rusqlite::Result<Vec<(Option<i64>, Option<String>)>> {
        let mut stmt = conn.prepare(&self.query)?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect()
    }
}

impl SkillCatalogSource for SqliteCatalog {
    fn fetch_active(&self) -> Result<Vec<SkillRecord>> {
        let conn = self.open()?;
        let rows = self
            .query_rows(&conn)
            .map_err(|err| SuggestError::CatalogFetch(format!("query skills: {err}")))?;

        let mut records = Vec::with_capacity(rows.len());
        for (id, name) in rows {
            let (Some(id), Some(name)) = (id, name) else {
                continue;
            };
            let id = SkillId::try_from(id).map_err(|_| {
                SuggestError::CatalogFetch(format!("skill id {id} does not fit in i32"))
            })?;
            records.push(SkillRecord::new(id, name.trim()));
        }
        let records = sanitize(records);
        debug!(count = records.len(), path = %self.path.display(), "fetched active skills");
        Ok(records)
    }
}
