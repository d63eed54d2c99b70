//! E2E Scenario: refreshing a live index
//!
//! - A failed refresh keeps the previous snapshot serving
//! - Searches running during a refresh see one catalog, never a mix
//! - Concurrent refreshes are serialized
//! - A query embedded across a refresh is not cached afterwards

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use skill_suggest::Result;
use skill_suggest::search::{EmbeddingProvider, HashEmbedder, SearchMethod};
use skill_suggest::test_utils::doubles::{FixedEmbedder, SwitchableCatalog, records};

use super::fixture::{cached_suggester, suggester};

const OLD_CATALOG: &[(i32, &str)] = &[(1, "Perl"), (2, "CGI"), (3, "jQuery")];
const NEW_CATALOG: &[(i32, &str)] = &[(1, "Rust"), (2, "WebAssembly"), (3, "Axum"), (4, "Tokio")];

#[test]
fn failed_refresh_keeps_serving_previous_snapshot() {
    let catalog = Arc::new(SwitchableCatalog::new(records(OLD_CATALOG)));
    let service = suggester(catalog.clone(), Arc::new(FixedEmbedder::hashed(64)));
    service.initialize(None).unwrap();
    let before = service.index().snapshot().unwrap();

    catalog.set_failing(true);
    let err = service.refresh(false).unwrap_err();
    assert_eq!(err.code(), "catalog_fetch_failed");

    let after = service.index().snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(service.health().skill_count, 3);
    service.hybrid_search("Web Developer", 5, 0.0, true).unwrap();

    catalog.set_failing(false);
    catalog.replace(records(NEW_CATALOG));
    assert_eq!(service.refresh(false).unwrap(), 4);
    assert_eq!(service.index().snapshot().unwrap().name(1), Some("Rust"));
}

#[test]
fn failed_embedding_refresh_keeps_previous_snapshot() {
    let embedder = Arc::new(FixedEmbedder::hashed(64));
    let catalog = Arc::new(SwitchableCatalog::new(records(OLD_CATALOG)));
    let service = suggester(catalog.clone(), embedder.clone());
    service.initialize(None).unwrap();

    catalog.replace(records(NEW_CATALOG));
    embedder.set_failing(true);
    assert_eq!(service.refresh(true).unwrap_err().code(), "embedding_unavailable");
    assert_eq!(embedder.reload_count(), 1);
    assert_eq!(service.index().snapshot().unwrap().name(1), Some("Perl"));
}

#[test]
fn refresh_before_initialize_is_not_ready() {
    let catalog = Arc::new(SwitchableCatalog::new(records(OLD_CATALOG)));
    let service = suggester(catalog.clone(), Arc::new(FixedEmbedder::hashed(64)));
    assert_eq!(service.refresh(false).unwrap_err().code(), "not_ready");
    assert_eq!(catalog.fetch_count(), 0);
}

#[test]
fn searches_during_refresh_see_one_catalog() {
    let old_names: HashSet<&str> = OLD_CATALOG.iter().map(|(_, name)| *name).collect();
    let new_names: HashSet<&str> = NEW_CATALOG.iter().map(|(_, name)| *name).collect();

    let catalog = Arc::new(SwitchableCatalog::new(records(OLD_CATALOG)));
    let embedder = FixedEmbedder::hashed(64).with_delay(Duration::from_millis(150));
    let service = suggester(catalog.clone(), Arc::new(embedder));
    service.initialize(None).unwrap();
    catalog.replace(records(NEW_CATALOG));

    let done = AtomicBool::new(false);
    let (service, done, old_names, new_names) = (&service, &done, &old_names, &new_names);
    std::thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    let mut searches = 0usize;
                    while !done.load(Ordering::SeqCst) || searches == 0 {
                        let result = service.hybrid_search("Web Developer", 10, 0.0, true).unwrap();
                        let names: Vec<&str> =
                            result.matches.iter().map(|m| m.skill_name.as_str()).collect();
                        let all_old = names.iter().all(|name| old_names.contains(name));
                        let all_new = names.iter().all(|name| new_names.contains(name));
                        assert!(all_old || all_new, "mixed snapshot: {names:?}");
                        searches += 1;
                    }
                    searches
                })
            })
            .collect();

        let refreshed = service.refresh(false).unwrap();
        done.store(true, Ordering::SeqCst);
        assert_eq!(refreshed, 4);

        for reader in readers {
            assert!(reader.join().unwrap() > 0);
        }
    });

    assert_eq!(service.health().skill_count, 4);
}

#[test]
fn concurrent_refreshes_run_one_at_a_time() {
    let delay = Duration::from_millis(100);
    let catalog = Arc::new(SwitchableCatalog::new(records(NEW_CATALOG)));
    let service = suggester(
        catalog.clone(),
        Arc::new(FixedEmbedder::hashed(32).with_delay(delay)),
    );
    service.initialize(None).unwrap();
    let fetches_before = catalog.fetch_count();

    let start = Instant::now();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2).map(|_| scope.spawn(|| service.refresh(false))).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 4);
        }
    });

    assert!(start.elapsed() >= delay * 2, "refreshes overlapped: {:?}", start.elapsed());
    assert_eq!(catalog.fetch_count(), fetches_before + 2);
}

#[test]
fn refresh_clears_cached_query_embeddings() {
    let catalog = Arc::new(SwitchableCatalog::new(records(OLD_CATALOG)));
    let service = cached_suggester(catalog.clone(), Arc::new(FixedEmbedder::hashed(64)));
    service.initialize(None).unwrap();

    let result = service.hybrid_search("Web Developer", 5, 0.0, true).unwrap();
    assert_eq!(result.method, SearchMethod::Semantic);
    assert_eq!(service.cache_stats().unwrap().entries, 1);

    service.refresh(false).unwrap();
    assert_eq!(service.cache_stats().unwrap().entries, 0);
}

/// Blocks the first `embed` of `gated_text` until released.
struct GatedEmbedder {
    inner: HashEmbedder,
    gated_text: &'static str,
    gate: Mutex<Option<(Sender<()>, Receiver<()>)>>,
}

impl EmbeddingProvider for GatedEmbedder {
    fn dims(&self) -> usize {
        self.inner.dims()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text == self.gated_text {
            let gate = self.gate.lock().unwrap().take();
            if let Some((entered, release)) = gate {
                entered.send(()).unwrap();
                release.recv().unwrap();
            }
        }
        self.inner.embed(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.inner.embed_batch(texts)
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

#[test]
fn query_embedded_across_a_refresh_is_not_cached() {
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let embedder = Arc::new(GatedEmbedder {
        inner: HashEmbedder::new(64),
        gated_text: "rust",
        gate: Mutex::new(Some((entered_tx, release_rx))),
    });
    let catalog = Arc::new(SwitchableCatalog::new(records(NEW_CATALOG)));
    let service = cached_suggester(catalog, embedder);
    service.initialize(None).unwrap();

    std::thread::scope(|scope| {
        let searching = scope.spawn(|| service.search("Rust", 3, 0.0));
        entered_rx.recv().unwrap();
        service.refresh(false).unwrap();
        release_tx.send(()).unwrap();
        assert_eq!(searching.join().unwrap().unwrap().normalized_role, "rust");
    });
    assert_eq!(service.cache_stats().unwrap().entries, 0);

    service.search("Rust", 3, 0.0).unwrap();
    assert_eq!(service.cache_stats().unwrap().entries, 1);
}
