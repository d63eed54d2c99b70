//! E2E Scenario: searching a ready service
//!
//! - Curated mapping answers a known role
//! - Semantic search alone, cut at the threshold
//! - Empty catalog still serves (empty) results
//! - Searches before initialization are refused

use std::sync::Arc;

use skill_suggest::catalog::InMemoryCatalog;
use skill_suggest::mapping::{InMemoryRoleMappings, RoleMappingEntry};
use skill_suggest::search::{HashEmbedder, MatchSource, SearchMethod, ServiceHealth};
use skill_suggest::test_utils::doubles::{FixedEmbedder, records};

use super::fixture::{approx, cached_suggester, mern_service, suggester};

#[test]
fn mapped_role_returns_curated_skills() {
    let service = mern_service();

    let result = service
        .hybrid_search("Senior MERN Stack Developer", 10, 0.45, true)
        .unwrap();

    assert_eq!(result.normalized_role, "mern stack");
    assert_eq!(result.method, SearchMethod::Mapped);
    let names: Vec<&str> = result.matches.iter().map(|m| m.skill_name.as_str()).collect();
    assert_eq!(names, vec!["MongoDB", "Express.js", "React.js", "Node.js"]);
    for m in &result.matches {
        assert_eq!(m.source, MatchSource::Mapped);
        assert!(approx(m.confidence, 0.95));
    }
}

#[test]
fn mapped_results_respect_limit() {
    let service = mern_service();
    let result = service.hybrid_search("MERN Stack Lead", 2, 0.45, true).unwrap();
    assert_eq!(result.method, SearchMethod::Mapped);
    assert_eq!(result.matches.len(), 2);
    assert_eq!(result.matches[0].skill_id, 1);
}

#[test]
fn semantic_search_cuts_at_threshold() {
    let embedder = FixedEmbedder::new(3)
        .with_vector("rust", &[1.0, 0.0, 0.0])
        .with_vector("alpha", &[0.6, 0.8, 0.0])
        .with_vector("beta", &[0.5, 0.75f32.sqrt(), 0.0])
        .with_vector("gamma", &[0.3, 0.91f32.sqrt(), 0.0]);
    let service = suggester(
        Arc::new(InMemoryCatalog::new(records(&[(1, "Alpha"), (2, "Beta"), (3, "Gamma")]))),
        Arc::new(embedder),
    );
    service.initialize(None).unwrap();

    let result = service
        .hybrid_search("Senior Rust Developer", 10, 0.45, true)
        .unwrap();

    assert_eq!(result.method, SearchMethod::Semantic);
    let ids: Vec<i32> = result.matches.iter().map(|m| m.skill_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(approx(result.matches[0].confidence, 0.6));
    assert!(approx(result.matches[1].confidence, 0.5));
    assert!(result.matches.iter().all(|m| m.source == MatchSource::Semantic));
}

#[test]
fn unmapped_role_falls_back_to_semantic() {
    let embedder = FixedEmbedder::new(2)
        .with_vector("data scientist", &[1.0, 0.0])
        .with_vector("python", &[0.9, 0.1])
        .with_vector("statistics", &[0.8, 0.2]);
    let service = suggester(
        Arc::new(InMemoryCatalog::new(records(&[(10, "Python"), (11, "Statistics")]))),
        Arc::new(embedder),
    );
    let mappings = InMemoryRoleMappings::new(vec![RoleMappingEntry::new(
        "Pastry Chef",
        ["Baking"],
    )]);
    service.initialize(Some(&mappings)).unwrap();

    let result = service.hybrid_search("Data Scientist", 5, 0.45, true).unwrap();
    assert_eq!(result.method, SearchMethod::Semantic);
    assert_eq!(result.matches.len(), 2);
    assert_eq!(result.matches[0].skill_id, 10);
}

#[test]
fn mapping_topped_up_with_semantic_matches() {
    let embedder = FixedEmbedder::new(2)
        .with_vector("mern stack", &[1.0, 0.0])
        .with_vector("mongodb", &[0.2, 1.0])
        .with_vector("react.js", &[0.95, 0.3])
        .with_vector("graphql", &[0.9, 0.4]);
    let service = suggester(
        Arc::new(InMemoryCatalog::new(records(&[
            (1, "MongoDB"),
            (3, "React.js"),
            (7, "GraphQL"),
        ]))),
        Arc::new(embedder),
    );
    let mappings = InMemoryRoleMappings::new(vec![RoleMappingEntry::new(
        "MERN Stack Developer",
        ["MongoDB", "React.js", "Cobol"],
    )]);
    service.initialize(Some(&mappings)).unwrap();

    let result = service.hybrid_search("MERN Stack Developer", 3, 0.45, true).unwrap();

    assert_eq!(result.method, SearchMethod::Hybrid);
    let ids: Vec<i32> = result.matches.iter().map(|m| m.skill_id).collect();
    // Mapped first in curated order, then the new semantic hit; React.js is not repeated.
    assert_eq!(ids, vec![1, 3, 7]);
    assert_eq!(result.matches[2].source, MatchSource::Semantic);

    let semantic_only = service.search("MERN Stack Developer", 3, 0.45).unwrap();
    assert_eq!(semantic_only.method, SearchMethod::Semantic);
    assert_eq!(semantic_only.matches[0].skill_id, 3);
}

#[test]
fn empty_catalog_is_ready_and_returns_nothing() {
    let service = suggester(
        Arc::new(InMemoryCatalog::new(Vec::new())),
        Arc::new(HashEmbedder::new(384)),
    );
    assert_eq!(service.initialize(None).unwrap(), 0);
    assert_eq!(
        service.health(),
        ServiceHealth {
            initialized: true,
            skill_count: 0,
            roles_loaded: 0,
        }
    );

    let result = service.hybrid_search("Backend Engineer", 10, 0.0, true).unwrap();
    assert!(result.matches.is_empty());
    assert_eq!(result.method, SearchMethod::Semantic);
}

#[test]
fn search_before_initialize_is_not_ready() {
    let service = suggester(
        Arc::new(InMemoryCatalog::new(records(&[(1, "Rust")]))),
        Arc::new(HashEmbedder::new(64)),
    );
    let err = service.hybrid_search("Rust Developer", 5, 0.45, true).unwrap_err();
    assert_eq!(err.code(), "not_ready");
    assert!(err.is_transient());
    assert!(!service.health().initialized);
}

#[test]
fn invalid_requests_are_rejected_before_readiness() {
    let service = suggester(
        Arc::new(InMemoryCatalog::new(Vec::new())),
        Arc::new(HashEmbedder::new(64)),
    );
    for (role, limit, threshold) in [("  ", 5, 0.5), ("Dev", 0, 0.5), ("Dev", 51, 0.5), ("Dev", 5, 1.5)] {
        let err = service.hybrid_search(role, limit, threshold, true).unwrap_err();
        assert_eq!(err.code(), "invalid_input", "{role:?} {limit} {threshold}");
    }
}

#[test]
fn symbol_only_role_yields_empty_result() {
    let service = mern_service();
    let result = service.hybrid_search("???", 5, 0.45, true).unwrap();
    assert_eq!(result.normalized_role, "???");
    assert!(result.matches.is_empty());
}

#[test]
fn repeated_queries_hit_the_embedding_cache() {
    let embedder = Arc::new(FixedEmbedder::hashed(64));
    let service = cached_suggester(
        Arc::new(InMemoryCatalog::new(records(&[(1, "Kotlin"), (2, "Swift")]))),
        embedder.clone(),
    );
    service.initialize(None).unwrap();

    for _ in 0..3 {
        service.hybrid_search("Mobile Developer", 5, 0.0, true).unwrap();
    }
    assert_eq!(embedder.embed_calls(), 1);
    let stats = service.cache_stats().unwrap();
    assert_eq!((stats.hits, stats.misses), (2, 1));
}
