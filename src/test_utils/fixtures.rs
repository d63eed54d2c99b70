use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::TempDir;

use crate::catalog::SkillId;

/// Test fixture providing an isolated root directory.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTestFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().to_path_buf();

        println!("[FIXTURE] Created temp directory: {data_path:?}");

        Self {
            temp_dir,
            data_path,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.data_path
    }

    /// Create a test file with content.
    #[must_use]
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.data_path.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        println!(
            "[FIXTURE] Created file: {:?} ({} bytes)",
            full_path,
            content.len()
        );
        full_path
    }

    /// Create `skills.db` with every given skill marked active.
    #[must_use]
    pub fn create_catalog_db(&self, skills: &[(SkillId, &str)]) -> PathBuf {
        let path = self.data_path.join("skills.db");
        let conn = Connection::open(&path).expect("Failed to open catalog db");
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS skills (
                 skill_id INTEGER PRIMARY KEY,
                 skill_name TEXT,
                 active INTEGER NOT NULL DEFAULT 1
             );",
        )
        .expect("Failed to create skills table");
        for (id, name) in skills {
            conn.execute(
                "INSERT OR REPLACE INTO skills (skill_id, skill_name, active) VALUES (?1, ?2, 1)",
                rusqlite::params![id, name],
            )
            .expect("Failed to insert skill");
        }
        println!("[FIXTURE] Created catalog: {:?} ({} skills)", path, skills.len());
        path
    }

    /// Create `training_data/role_skills.csv`.
    #[must_use]
    pub fn create_role_mapping(&self, rows: &[(&str, &[&str])]) -> PathBuf {
        let mut content = String::from("role,skills\n");
        for (role, skills) in rows {
            content.push_str(&format!("\"{}\",\"{}\"\n", role, skills.join(",")));
        }
        self.create_file("training_data/role_skills.csv", &content)
    }
}

impl Drop for UnitTestFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.data_path);
    }
}
