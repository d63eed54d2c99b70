//! E2E Scenario: editing the role knowledge base
//!
//! - New mappings take effect after a reload
//! - Removing a mapping drops back to semantic search
//! - An unreadable mapping file leaves the service semantic-only
//! - A row without skills does not hide an earlier mapping for the role

use skill_suggest::app::AppContext;
use skill_suggest::config::Config;
use skill_suggest::search::{MatchSource, SearchMethod};
use skill_suggest::test_utils::fixtures::UnitTestFixture;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn context(fixture: &UnitTestFixture) -> AppContext {
    let _ = fixture.create_catalog_db(&[
        (1, "Rust"),
        (2, "Tokio"),
        (3, "Serde"),
        (4, "Docker"),
        (5, "Kubernetes"),
    ]);
    AppContext::with_config(fixture.root().to_path_buf(), Config::default())
}

#[test]
fn added_mapping_applies_after_reload() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.create_role_mapping(&[("DevOps Engineer", &["Docker", "Kubernetes"])]);
    let ctx = context(&fixture);
    ctx.initialize().unwrap();
    assert_eq!(ctx.service.health().roles_loaded, 1);

    ctx.mappings
        .add("Rust Developer", &strings(&["Rust", "Tokio", "serde"]))
        .unwrap();
    assert_eq!(ctx.service.reload_role_mapping(&ctx.mappings).unwrap(), 2);

    let result = ctx
        .service
        .hybrid_search("Senior Rust Developer", 3, 0.45, true)
        .unwrap();
    assert_eq!(result.method, SearchMethod::Mapped);
    let names: Vec<&str> = result.matches.iter().map(|m| m.skill_name.as_str()).collect();
    assert_eq!(names, vec!["Rust", "Tokio", "Serde"]);
    assert!(result.matches.iter().all(|m| m.source == MatchSource::Mapped));
}

#[test]
fn removed_mapping_falls_back_to_semantic() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.create_role_mapping(&[("DevOps Engineer", &["Docker", "Kubernetes"])]);
    let ctx = context(&fixture);
    ctx.initialize().unwrap();

    let mapped = ctx.service.hybrid_search("DevOps Engineer", 2, 0.45, true).unwrap();
    assert_eq!(mapped.method, SearchMethod::Mapped);

    assert_eq!(ctx.mappings.remove("devops engineer").unwrap(), 1);
    assert_eq!(ctx.service.reload_role_mapping(&ctx.mappings).unwrap(), 0);

    let semantic = ctx.service.hybrid_search("DevOps Engineer", 2, 0.0, true).unwrap();
    assert_eq!(semantic.method, SearchMethod::Semantic);
}

#[test]
fn unreadable_mapping_file_is_not_fatal() {
    let fixture = UnitTestFixture::new();
    // A directory where the CSV file should be.
    std::fs::create_dir_all(fixture.root().join("training_data/role_skills.csv")).unwrap();
    let ctx = context(&fixture);

    assert_eq!(ctx.initialize().unwrap(), 5);
    let health = ctx.service.health();
    assert!(health.initialized);
    assert_eq!(health.roles_loaded, 0);
}

#[test]
fn skill_less_row_does_not_hide_mapping() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.create_file(
        "training_data/role_skills.csv",
        "role,skills\nDevOps Engineer,Docker\nDevOps Engineer,\n",
    );
    let ctx = context(&fixture);
    ctx.initialize().unwrap();
    assert_eq!(ctx.service.health().roles_loaded, 1);

    let result = ctx.service.hybrid_search("DevOps Engineer", 5, 0.99, true).unwrap();
    assert_eq!(result.method, SearchMethod::Mapped);
    assert_eq!(result.matches[0].skill_name, "Docker");
    assert_eq!(result.matches[0].source, MatchSource::Mapped);
}
