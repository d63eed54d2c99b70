//! Controllable collaborators for exercising failure and concurrency paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use crate::catalog::{InMemoryCatalog, SkillCatalogSource, SkillRecord};
use crate::error::{Result, SuggestError};
use crate::search::embeddings::{EmbeddingProvider, HashEmbedder, l2_normalize};

/// Embedder returning hand-picked vectors for known texts.
///
/// Unknown texts fall back to hash embeddings when built with
/// [`FixedEmbedder::hashed`], and are an error otherwise.
pub struct FixedEmbedder {
    dims: usize,
    vectors: RwLock<HashMap<String, Vec<f32>>>,
    fallback: Option<HashEmbedder>,
    delay: Option<Duration>,
    failing: AtomicBool,
    reloads: AtomicUsize,
    calls: AtomicUsize,
}

impl FixedEmbedder {
    #[must_use]
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            vectors: RwLock::new(HashMap::new()),
            fallback: None,
            delay: None,
            failing: AtomicBool::new(false),
            reloads: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn hashed(dims: usize) -> Self {
        Self {
            fallback: Some(HashEmbedder::new(dims)),
            ..Self::new(dims)
        }
    }

    /// Register a vector (normalized on insert) for an exact text.
    #[must_use]
    pub fn with_vector(self, text: &str, vector: &[f32]) -> Self {
        self.set_vector(text, vector);
        self
    }

    /// Sleep this long inside every batch call.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_vector(&self, text: &str, vector: &[f32]) {
        assert_eq!(vector.len(), self.dims, "vector width must match dims");
        let mut vector = vector.to_vec();
        l2_normalize(&mut vector);
        self.vectors.write().insert(text.to_string(), vector);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    /// Number of single-text `embed` calls.
    #[must_use]
    pub fn embed_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, text: &str) -> Result<Vec<f32>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SuggestError::EmbeddingProvider("embedder offline".to_string()));
        }
        if let Some(vector) = self.vectors.read().get(text) {
            return Ok(vector.clone());
        }
        match &self.fallback {
            Some(fallback) => Ok(fallback.embed_text(text)),
            None => Err(SuggestError::EmbeddingProvider(format!("no vector for '{text}'"))),
        }
    }
}

impl EmbeddingProvider for FixedEmbedder {
    fn dims(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lookup(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        texts.iter().map(|text| self.lookup(text)).collect()
    }

    fn reload(&self) -> Result<()> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Catalog that can be switched into a failing state.
#[derive(Default)]
pub struct SwitchableCatalog {
    inner: InMemoryCatalog,
    failing: AtomicBool,
    fetches: AtomicUsize,
}

impl SwitchableCatalog {
    #[must_use]
    pub fn new(records: Vec<SkillRecord>) -> Self {
        Self {
            inner: InMemoryCatalog::new(records),
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn replace(&self, records: Vec<SkillRecord>) {
        self.inner.replace(records);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SkillCatalogSource for SwitchableCatalog {
    fn fetch_active(&self) -> Result<Vec<SkillRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SuggestError::CatalogFetch("catalog offline".to_string()));
        }
        self.inner.fetch_active()
    }
}

/// Build records from `(id, name)` pairs.
#[must_use]
pub fn records(skills: &[(i32, &str)]) -> Vec<SkillRecord> {
    skills
        .iter()
        .map(|(id, name)| SkillRecord::new(*id, *name))
        .collect()
}
