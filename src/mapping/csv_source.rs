//! CSV knowledge base of role -> skills mappings.
//!
//! File format (header required):
//!
//! ```csv
//! role,skills
//! "MERN Stack Developer","MongoDB,Express.js,React.js,Node.js"
//! ```
//!
//! Besides serving as a [`RoleMappingSource`], the file can be edited in
//! place; every edit rewrites it atomically.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Result, SuggestError};

use super::{RoleMappingEntry, RoleMappingSource, clean_skills, parse_skill_list};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    role: String,
    #[serde(default)]
    skills: String,
}

#[derive(Debug, Clone)]
pub struct CsvRoleMappingSource {
    path: PathBuf,
}

impl CsvRoleMappingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every row with a non-empty role, in file order; empty if the file is missing.
    pub fn list(&self) -> Result<Vec<RoleMappingEntry>> {
        Ok(self.read()?.unwrap_or_default())
    }

    /// Append a mapping; fails if the role exists (case-insensitive).
    pub fn add(&self, role: &str, skills: &[String]) -> Result<RoleMappingEntry> {
        let entry = validated_entry(role, skills)?;
        let mut entries = self.list()?;
        if entries.iter().any(|existing| same_role(&existing.role, &entry.role)) {
            return Err(SuggestError::Conflict(format!("role '{}' already exists", entry.role)));
        }
        entries.push(entry.clone());
        self.write(&entries)?;
        info!(role = %entry.role, skills = entry.skills.len(), "added role mapping");
        Ok(entry)
    }

    /// Replace the mapping for `original_role`, optionally renaming it.
    pub fn update(&self, original_role: &str, role: &str, skills: &[String]) -> Result<RoleMappingEntry> {
        let entry = validated_entry(role, skills)?;
        let mut entries = self.list()?;
        let index = entries
            .iter()
            .position(|existing| same_role(&existing.role, original_role))
            .ok_or_else(|| SuggestError::NotFound(format!("role '{original_role}'")))?;
        let renamed_onto_other = entries
            .iter()
            .enumerate()
            .any(|(i, existing)| i != index && same_role(&existing.role, &entry.role));
        if renamed_onto_other {
            return Err(SuggestError::Conflict(format!("role '{}' already exists", entry.role)));
        }
        entries[index] = entry.clone();
        self.write(&entries)?;
        info!(original = original_role, role = %entry.role, "updated role mapping");
        Ok(entry)
    }

    /// Delete every row whose role matches (case-insensitive).
    pub fn remove(&self, role: &str) -> Result<usize> {
        let entries = self.list()?;
        let before = entries.len();
        let kept: Vec<RoleMappingEntry> = entries
            .into_iter()
            .filter(|existing| !same_role(&existing.role, role))
            .collect();
        let removed = before - kept.len();
        if removed == 0 {
            return Err(SuggestError::NotFound(format!("role '{role}'")));
        }
        self.write(&kept)?;
        info!(role, removed, "removed role mapping");
        Ok(removed)
    }

    fn read(&self) -> Result<Option<Vec<RoleMappingEntry>>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "role mapping file not found");
            return Ok(None);
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut entries = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row?;
            if row.role.is_empty() {
                continue;
            }
            entries.push(RoleMappingEntry {
                role: row.role,
                skills: parse_skill_list(&row.skills),
            });
        }
        Ok(Some(entries))
    }

    fn write(&self, entries: &[RoleMappingEntry]) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let temp = NamedTempFile::new_in(&parent)?;
        {
            let mut writer = csv::Writer::from_writer(temp.as_file());
            writer.write_record(["role", "skills"])?;
            for entry in entries {
                writer.write_record([entry.role.as_str(), entry.skills.join(",").as_str()])?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| SuggestError::Io(err.error))?;
        Ok(())
    }
}

impl RoleMappingSource for CsvRoleMappingSource {
    fn load(&self) -> Result<Option<Vec<RoleMappingEntry>>> {
        self.read()
            .map_err(|err| SuggestError::RoleMapping(format!("{}: {err}", self.path.display())))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn validated_entry(role: &str, skills: &[String]) -> Result<RoleMappingEntry> {
    let role = role.trim();
    if role.is_empty() {
        return Err(SuggestError::InvalidInput("role cannot be empty".to_string()));
    }
    let skills = clean_skills(skills.iter().map(String::as_str));
    if skills.is_empty() {
        return Err(SuggestError::InvalidInput(format!(
            "role '{role}' needs at least one skill"
        )));
    }
    Ok(RoleMappingEntry {
        role: role.to_string(),
        skills,
    })
}

fn same_role(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
