//! Service builders shared by the workflow scenarios.

use std::sync::Arc;

use skill_suggest::catalog::{InMemoryCatalog, SkillCatalogSource};
use skill_suggest::config::SearchConfig;
use skill_suggest::mapping::{InMemoryRoleMappings, RoleMappingEntry};
use skill_suggest::search::{
    EmbeddingProvider, HashEmbedder, MemorySnapshotStore, QueryEmbeddingCache, SkillSuggester,
    VectorIndex,
};
use skill_suggest::test_utils::doubles::records;

pub const MERN_SKILLS: &[(i32, &str)] = &[
    (1, "MongoDB"),
    (2, "Express.js"),
    (3, "React.js"),
    (4, "Node.js"),
];

pub fn suggester(
    catalog: Arc<dyn SkillCatalogSource>,
    embedder: Arc<dyn EmbeddingProvider>,
) -> SkillSuggester {
    let index = VectorIndex::new(catalog, embedder, Arc::new(MemorySnapshotStore::new()));
    SkillSuggester::new(index, SearchConfig::default())
}

pub fn cached_suggester(
    catalog: Arc<dyn SkillCatalogSource>,
    embedder: Arc<dyn EmbeddingProvider>,
) -> SkillSuggester {
    suggester(catalog, embedder).with_query_cache(QueryEmbeddingCache::new(16))
}

/// Ready service over the MERN catalog with the MERN role mapped.
pub fn mern_service() -> SkillSuggester {
    let service = suggester(
        Arc::new(InMemoryCatalog::new(records(MERN_SKILLS))),
        Arc::new(HashEmbedder::new(384)),
    );
    let mappings = InMemoryRoleMappings::new(vec![RoleMappingEntry::new(
        "MERN Stack Developer",
        ["MongoDB", "Express.js", "React.js", "Node.js"],
    )]);
    service.initialize(Some(&mappings)).unwrap();
    service
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
