//! E2E Scenario: snapshot persistence across restarts
//!
//! - A second service loads the persisted vectors instead of re-embedding
//! - Rows for skills gone from the catalog are dropped on load
//! - A corrupt file is rebuilt

use std::sync::Arc;

use skill_suggest::app::AppContext;
use skill_suggest::catalog::InMemoryCatalog;
use skill_suggest::config::{Config, SearchConfig};
use skill_suggest::search::{FileSnapshotStore, SkillSuggester, VectorIndex};
use skill_suggest::test_utils::doubles::{FixedEmbedder, records};
use skill_suggest::test_utils::fixtures::UnitTestFixture;

const SKILLS: &[(i32, &str)] = &[(1, "Go"), (2, "Rust"), (3, "Zig")];

fn known_embedder() -> FixedEmbedder {
    FixedEmbedder::new(3)
        .with_vector("go", &[1.0, 0.0, 0.0])
        .with_vector("rust", &[0.0, 1.0, 0.0])
        .with_vector("zig", &[0.0, 0.0, 1.0])
        .with_vector("systems", &[0.0, 0.9, 0.1])
}

fn service_at(
    fixture: &UnitTestFixture,
    skills: &[(i32, &str)],
    embedder: FixedEmbedder,
) -> SkillSuggester {
    let index = VectorIndex::new(
        Arc::new(InMemoryCatalog::new(records(skills))),
        Arc::new(embedder),
        Arc::new(FileSnapshotStore::new(fixture.root().join("data/skill_vectors.bin"))),
    );
    SkillSuggester::new(index, SearchConfig::default())
}

#[test]
fn restart_loads_persisted_vectors() {
    let fixture = UnitTestFixture::new();
    let first = service_at(&fixture, SKILLS, known_embedder());
    assert_eq!(first.initialize(None).unwrap(), 3);
    assert!(fixture.root().join("data/skill_vectors.bin").exists());

    // This embedder only knows the query text; rebuilding would fail.
    let second = service_at(
        &fixture,
        SKILLS,
        FixedEmbedder::new(3).with_vector("systems", &[0.0, 0.9, 0.1]),
    );
    assert_eq!(second.initialize(None).unwrap(), 3);

    let result = second.hybrid_search("Systems Engineer", 1, 0.5, true).unwrap();
    assert_eq!(result.matches[0].skill_name, "Rust");
}

#[test]
fn restart_drops_rows_for_removed_skills() {
    let fixture = UnitTestFixture::new();
    service_at(&fixture, SKILLS, known_embedder()).initialize(None).unwrap();

    let shrunk = &SKILLS[..2];
    let second = service_at(&fixture, shrunk, FixedEmbedder::new(3));
    assert_eq!(second.initialize(None).unwrap(), 2);
    assert_eq!(second.index().snapshot().unwrap().ids(), &[1, 2]);
}

#[test]
fn corrupt_file_is_rebuilt() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.create_file("data/skill_vectors.bin", "not a snapshot");

    let service = service_at(&fixture, SKILLS, known_embedder());
    assert_eq!(service.initialize(None).unwrap(), 3);

    let bytes = std::fs::read(fixture.root().join("data/skill_vectors.bin")).unwrap();
    assert_eq!(&bytes[..4], b"SKVX");
}

#[test]
fn app_context_persists_under_root() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.create_catalog_db(&[(1, "PostgreSQL"), (2, "Redis")]);

    let ctx = AppContext::with_config(fixture.root().to_path_buf(), Config::default());
    assert_eq!(ctx.initialize().unwrap(), 2);
    let written = std::fs::read(fixture.root().join("data/skill_vectors.bin")).unwrap();

    let restarted = AppContext::with_config(fixture.root().to_path_buf(), Config::default());
    assert_eq!(restarted.initialize().unwrap(), 2);
    let reread = std::fs::read(fixture.root().join("data/skill_vectors.bin")).unwrap();
    assert_eq!(written, reread);
}
