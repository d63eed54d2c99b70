use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::sqlite::DEFAULT_CATALOG_QUERY;
use crate::error::{Result, SuggestError};
use crate::search::cache::DEFAULT_QUERY_EMBEDDING_CACHE_SIZE;
use crate::search::embeddings::DEFAULT_EMBEDDING_DIMS;

const ENV_PREFIX: &str = "SKILL_SUGGEST";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Defaults, then TOML (explicit file, or global then project), then
    /// `SKILL_SUGGEST_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        Self::load_with_env(explicit_path, root, &|key| std::env::var(key).ok())
    }

    /// [`Config::load`] with a custom environment lookup.
    pub fn load_with_env(
        explicit_path: Option<&Path>,
        root: &Path,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env(&format!("{ENV_PREFIX}_CONFIG")).map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                SuggestError::MissingConfig(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&root.join("config.toml"))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("skill-suggest/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SuggestError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SuggestError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.embedding {
            self.embedding.merge(patch);
        }
        if let Some(patch) = patch.catalog {
            self.catalog.merge(patch);
        }
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.cache {
            self.cache.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self, env: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        let search = &mut self.search;
        if let Some(value) = env_usize(env, "SEARCH_DEFAULT_LIMIT")? {
            search.default_limit = value;
        }
        if let Some(value) = env_usize(env, "SEARCH_MAX_LIMIT")? {
            search.max_limit = value;
        }
        if let Some(value) = env_f32(env, "SEARCH_SIMILARITY_THRESHOLD")? {
            search.similarity_threshold = value;
        }
        if let Some(value) = env_f32(env, "SEARCH_ROLE_FUZZY_THRESHOLD")? {
            search.role_fuzzy_threshold = value;
        }
        if let Some(value) = env_f32(env, "SEARCH_SKILL_FUZZY_THRESHOLD")? {
            search.skill_fuzzy_threshold = value;
        }
        if let Some(value) = env_f32(env, "SEARCH_CONTAINMENT_BOOST")? {
            search.containment_boost = value;
        }
        if let Some(value) = env_f32(env, "SEARCH_MAPPED_CONFIDENCE")? {
            search.mapped_confidence = value;
        }
        if let Some(value) = env_bool(env, "SEARCH_USE_MAPPING")? {
            search.use_mapping = value;
        }

        if let Some(value) = env_string(env, "EMBEDDING_BACKEND") {
            self.embedding.backend = value;
        }
        if let Some(value) = env_usize(env, "EMBEDDING_DIMS")? {
            self.embedding.dims = value;
        }

        if let Some(value) = env_string(env, "CATALOG_DB_PATH") {
            self.catalog.db_path = PathBuf::from(value);
        }
        if let Some(value) = env_string(env, "CATALOG_QUERY") {
            self.catalog.query = value;
        }

        if let Some(value) = env_string(env, "PATHS_SNAPSHOT") {
            self.paths.snapshot = PathBuf::from(value);
        }
        if let Some(value) = env_string(env, "PATHS_ROLE_MAPPING") {
            self.paths.role_mapping = PathBuf::from(value);
        }

        if let Some(value) = env_bool(env, "CACHE_ENABLED")? {
            self.cache.enabled = value;
        }
        if let Some(value) = env_usize(env, "CACHE_QUERY_EMBEDDINGS")? {
            self.cache.query_embeddings = value;
        }
        Ok(())
    }

    /// Reject settings the search path cannot honor.
    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.default_limit == 0 || search.max_limit == 0 {
            return Err(SuggestError::Config("search limits must be positive".to_string()));
        }
        if search.default_limit > search.max_limit {
            return Err(SuggestError::Config(format!(
                "search.default_limit ({}) exceeds search.max_limit ({})",
                search.default_limit, search.max_limit
            )));
        }
        for (name, value) in [
            ("search.similarity_threshold", search.similarity_threshold),
            ("search.role_fuzzy_threshold", search.role_fuzzy_threshold),
            ("search.skill_fuzzy_threshold", search.skill_fuzzy_threshold),
            ("search.containment_boost", search.containment_boost),
            ("search.mapped_confidence", search.mapped_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SuggestError::Config(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        if self.embedding.dims == 0 {
            return Err(SuggestError::Config("embedding.dims must be positive".to_string()));
        }
        if self.embedding.backend != "hash" {
            return Err(SuggestError::Config(format!(
                "unknown embedding.backend '{}' (supported: hash)",
                self.embedding.backend
            )));
        }
        Ok(())
    }
}

/// Knobs of the hybrid search path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    /// Minimum cosine score for a semantic match.
    pub similarity_threshold: f32,
    pub role_fuzzy_threshold: f32,
    pub skill_fuzzy_threshold: f32,
    /// Floor applied when one string contains the other.
    pub containment_boost: f32,
    /// Multiplier on the name-match score of mapped skills.
    pub mapped_confidence: f32,
    pub use_mapping: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 50,
            similarity_threshold: 0.45,
            role_fuzzy_threshold: 0.7,
            skill_fuzzy_threshold: 0.75,
            containment_boost: 0.85,
            mapped_confidence: 0.95,
            use_mapping: true,
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.default_limit {
            self.default_limit = value;
        }
        if let Some(value) = patch.max_limit {
            self.max_limit = value;
        }
        if let Some(value) = patch.similarity_threshold {
            self.similarity_threshold = value;
        }
        if let Some(value) = patch.role_fuzzy_threshold {
            self.role_fuzzy_threshold = value;
        }
        if let Some(value) = patch.skill_fuzzy_threshold {
            self.skill_fuzzy_threshold = value;
        }
        if let Some(value) = patch.containment_boost {
            self.containment_boost = value;
        }
        if let Some(value) = patch.mapped_confidence {
            self.mapped_confidence = value;
        }
        if let Some(value) = patch.use_mapping {
            self.use_mapping = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub backend: String,
    pub dims: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: "hash".to_string(),
            dims: DEFAULT_EMBEDDING_DIMS,
        }
    }
}

impl EmbeddingConfig {
    fn merge(&mut self, patch: EmbeddingPatch) {
        if let Some(value) = patch.backend {
            self.backend = value;
        }
        if let Some(value) = patch.dims {
            self.dims = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Relative paths resolve against the root directory.
    pub db_path: PathBuf,
    pub query: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("skills.db"),
            query: DEFAULT_CATALOG_QUERY.to_string(),
        }
    }
}

impl CatalogConfig {
    fn merge(&mut self, patch: CatalogPatch) {
        if let Some(value) = patch.db_path {
            self.db_path = value;
        }
        if let Some(value) = patch.query {
            self.query = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub snapshot: PathBuf,
    pub role_mapping: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from("data/skill_vectors.bin"),
            role_mapping: PathBuf::from("training_data/role_skills.csv"),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.snapshot {
            self.snapshot = value;
        }
        if let Some(value) = patch.role_mapping {
            self.role_mapping = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub query_embeddings: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            query_embeddings: DEFAULT_QUERY_EMBEDDING_CACHE_SIZE,
        }
    }
}

impl CacheConfig {
    fn merge(&mut self, patch: CachePatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.query_embeddings {
            self.query_embeddings = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    pub search: Option<SearchPatch>,
    pub embedding: Option<EmbeddingPatch>,
    pub catalog: Option<CatalogPatch>,
    pub paths: Option<PathsPatch>,
    pub cache: Option<CachePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchPatch {
    pub default_limit: Option<usize>,
    pub max_limit: Option<usize>,
    pub similarity_threshold: Option<f32>,
    pub role_fuzzy_threshold: Option<f32>,
    pub skill_fuzzy_threshold: Option<f32>,
    pub containment_boost: Option<f32>,
    pub mapped_confidence: Option<f32>,
    pub use_mapping: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EmbeddingPatch {
    pub backend: Option<String>,
    pub dims: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogPatch {
    pub db_path: Option<PathBuf>,
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsPatch {
    pub snapshot: Option<PathBuf>,
    pub role_mapping: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CachePatch {
    pub enabled: Option<bool>,
    pub query_embeddings: Option<usize>,
}

/// Resolve a configured path against the root unless it is absolute.
#[must_use]
pub fn resolve_path(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

fn env_key(suffix: &str) -> String {
    format!("{ENV_PREFIX}_{suffix}")
}

fn env_string(env: &dyn Fn(&str) -> Option<String>, suffix: &str) -> Option<String> {
    env(&env_key(suffix))
}

fn env_bool(env: &dyn Fn(&str) -> Option<String>, suffix: &str) -> Result<Option<bool>> {
    let key = env_key(suffix);
    match env(&key) {
        Some(value) => match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(SuggestError::Config(format!("invalid {key} value {value}: expected a boolean"))),
        },
        None => Ok(None),
    }
}

fn env_usize(env: &dyn Fn(&str) -> Option<String>, suffix: &str) -> Result<Option<usize>> {
    let key = env_key(suffix);
    match env(&key) {
        Some(value) => value.trim().parse::<usize>().map(Some).map_err(|err| {
            SuggestError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        None => Ok(None),
    }
}

fn env_f32(env: &dyn Fn(&str) -> Option<String>, suffix: &str) -> Result<Option<f32>> {
    let key = env_key(suffix);
    match env(&key) {
        Some(value) => value.trim().parse::<f32>().map(Some).map_err(|err| {
            SuggestError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        None => Ok(None),
    }
}
