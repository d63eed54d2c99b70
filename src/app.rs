use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::SqliteCatalog;
use crate::config::{Config, resolve_path};
use crate::error::{Result, SuggestError};
use crate::mapping::CsvRoleMappingSource;
use crate::search::{FileSnapshotStore, HashEmbedder, QueryEmbeddingCache, SkillSuggester, VectorIndex};

pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub service: Arc<SkillSuggester>,
    pub mappings: CsvRoleMappingSource,
    pub robot_mode: bool,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let root = Self::find_root()?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        let mut ctx = Self::with_config(root, config);
        ctx.robot_mode = cli.robot;
        ctx.verbosity = cli.verbose;
        Ok(ctx)
    }

    /// Wire the service for `root` without touching the catalog or snapshot yet.
    #[must_use]
    pub fn with_config(root: PathBuf, config: Config) -> Self {
        let service = Arc::new(build_service(&config, &root));
        let mappings = CsvRoleMappingSource::new(resolve_path(&root, &config.paths.role_mapping));
        Self {
            root,
            config,
            service,
            mappings,
            robot_mode: false,
            verbosity: 0,
        }
    }

    /// Initialize the index and load role mappings.
    pub fn initialize(&self) -> Result<usize> {
        self.service.initialize(Some(&self.mappings))
    }

    fn find_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("SKILL_SUGGEST_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = find_upwards(&cwd, ".skill-suggest") {
            return Ok(found);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| SuggestError::MissingConfig("data directory not found".to_string()))?;
        Ok(data_dir.join("skill-suggest"))
    }
}

/// Assemble the production collaborators described by `config`.
#[must_use]
pub fn build_service(config: &Config, root: &Path) -> SkillSuggester {
    let catalog = SqliteCatalog::with_query(
        resolve_path(root, &config.catalog.db_path),
        config.catalog.query.clone(),
    );
    let embedder = HashEmbedder::new(config.embedding.dims);
    let store = FileSnapshotStore::new(resolve_path(root, &config.paths.snapshot));
    let index = VectorIndex::new(Arc::new(catalog), Arc::new(embedder), Arc::new(store));

    let service = SkillSuggester::new(index, config.search.clone());
    if config.cache.enabled {
        service.with_query_cache(QueryEmbeddingCache::new(config.cache.query_embeddings))
    } else {
        service
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
