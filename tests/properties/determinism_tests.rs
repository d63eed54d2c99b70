use proptest::prelude::*;

use skill_suggest::search::embeddings::l2_norm;
use skill_suggest::search::fuzzy::{DEFAULT_CONTAINMENT_BOOST, match_score, sequence_ratio};
use skill_suggest::search::normalize::normalize_text;
use skill_suggest::search::{HashEmbedder, normalize_role};

proptest! {
    #[test]
    fn test_hash_embedding_deterministic(text in ".*") {
        let embedder = HashEmbedder::new(64);
        prop_assert_eq!(embedder.embed_text(&text), embedder.embed_text(&text));
    }

    #[test]
    fn test_hash_embedding_length_and_norm(text in "[a-z]{1,12}( [a-z]{1,12}){0,3}", dim in 1usize..256usize) {
        let embedder = HashEmbedder::new(dim);
        let embedding = embedder.embed_text(&text);
        prop_assert_eq!(embedding.len(), dim);
        let norm = l2_norm(&embedding);
        // Collisions may cancel everything out in tiny dimensions.
        prop_assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_text_idempotent(text in ".{0,64}") {
        let once = normalize_text(&text);
        prop_assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_normalize_role_output_charset(text in ".{0,64}") {
        let role = normalize_role(&text);
        prop_assert!(role.chars().all(|c| !c.is_uppercase()));
        prop_assert!(!role.starts_with(' ') && !role.ends_with(' '));
        prop_assert!(!role.contains("  "));
    }

    #[test]
    fn test_sequence_ratio_bounds(a in "[a-z ]{0,20}", b in "[a-z ]{0,20}") {
        let ratio = sequence_ratio(&a, &b);
        prop_assert!((0.0..=1.0).contains(&ratio));
        prop_assert!((sequence_ratio(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_match_score_never_below_raw_ratio(a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
        let raw = sequence_ratio(&a, &b);
        let boosted = match_score(&a, &b, DEFAULT_CONTAINMENT_BOOST);
        prop_assert!(boosted >= raw);
        prop_assert!(boosted <= 1.0);
    }
}
