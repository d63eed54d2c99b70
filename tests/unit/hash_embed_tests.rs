use std::sync::Arc;

use skill_suggest::search::embeddings::{dot, l2_norm};
use skill_suggest::search::{EmbeddingProvider, HashEmbedder};

#[test]
fn vectors_have_configured_length_and_unit_norm() {
    let embedder = HashEmbedder::new(384);
    assert_eq!(embedder.dims(), 384);
    let vector = embedder.embed("Kubernetes").unwrap();
    assert_eq!(vector.len(), 384);
    assert!((l2_norm(&vector) - 1.0).abs() < 1e-5);
}

#[test]
fn embedding_is_deterministic() {
    let a = HashEmbedder::new(128);
    let b = HashEmbedder::new(128);
    assert_eq!(a.embed_text("react native"), b.embed_text("react native"));
}

#[test]
fn similar_names_score_higher_than_unrelated() {
    let embedder = HashEmbedder::new(384);
    let query = embedder.embed_text("react");
    let close = embedder.embed_text("react native");
    let far = embedder.embed_text("postgresql");
    assert!(dot(&query, &close) > dot(&query, &far));
}

#[test]
fn empty_text_is_rejected_by_provider() {
    let embedder = HashEmbedder::new(64);
    let err = embedder.embed("   ").unwrap_err();
    assert_eq!(err.code(), "embedding_unavailable");
    assert!(embedder.embed_text("").iter().all(|value| *value == 0.0));
}

#[test]
fn batch_preserves_order() {
    let embedder = HashEmbedder::new(64);
    let texts = vec!["go".to_string(), "rust".to_string(), "zig".to_string()];
    let batch = embedder.embed_batch(&texts).unwrap();
    for (text, vector) in texts.iter().zip(&batch) {
        assert_eq!(vector, &embedder.embed_text(text));
    }
}

#[test]
fn provider_behind_trait_object_matches_concrete_embedder() {
    let concrete = HashEmbedder::new(96);
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new(96));
    assert_eq!(provider.name(), concrete.name());
    assert!(provider.reload().is_ok());
    assert_eq!(provider.embed("node.js").unwrap(), concrete.embed_text("node.js"));
}

#[test]
fn zero_dimension_is_clamped_to_one() {
    let embedder = HashEmbedder::new(0);
    assert_eq!(embedder.dims(), 1);
    assert_eq!(embedder.embed("go").unwrap().len(), 1);
}
