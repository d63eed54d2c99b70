//! In-memory vector index with atomic snapshot replacement.
//!
//! Readers clone the current `Arc<EmbeddingSnapshot>` under a read lock and
//! release it immediately, so a query always runs against one consistent
//! snapshot. Writers build the replacement with no lock held on `current`
//! and publish it with a single pointer swap. A separate refresh lock queues
//! concurrent writers; readers never touch it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::catalog::{SkillCatalogSource, SkillId, SkillRecord};
use crate::error::{Result, SuggestError};
use crate::search::embeddings::EmbeddingProvider;
use crate::search::persistence::{SnapshotPersistence, StoredVectors};
use crate::search::snapshot::EmbeddingSnapshot;
use crate::search::types::{IndexHealth, NameMatch, SkillMatch};

pub struct VectorIndex {
    catalog: Arc<dyn SkillCatalogSource>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn SnapshotPersistence>,
    current: RwLock<Option<Arc<EmbeddingSnapshot>>>,
    refresh_lock: Mutex<()>,
}

impl VectorIndex {
    pub fn new(
        catalog: Arc<dyn SkillCatalogSource>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn SnapshotPersistence>,
    ) -> Self {
        Self {
            catalog,
            embedder,
            store,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Load the persisted snapshot, or build and persist a fresh one.
    ///
    /// Returns the number of indexed skills. An empty catalog yields an empty
    /// but ready index.
    pub fn initialize(&self) -> Result<usize> {
        let _writer = self.refresh_lock.lock();
        let start = Instant::now();

        let records = self
            .catalog
            .fetch_active()
            .map_err(|err| SuggestError::Initialization(format!("skill catalog: {err}")))?;

        let (snapshot, origin) = match self.load_persisted(&records) {
            Some(snapshot) => (snapshot, "persisted"),
            None => {
                let snapshot = EmbeddingSnapshot::build(&records, self.embedder.as_ref())?;
                if let Err(err) = self.store.save(&snapshot) {
                    warn!(error = %err, "could not persist freshly built snapshot");
                }
                (snapshot, "built")
            }
        };

        let count = snapshot.len();
        self.publish(snapshot);
        info!(
            skills = count,
            origin,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "vector index initialized"
        );
        Ok(count)
    }

    /// Rebuild from the catalog, persist, then publish.
    ///
    /// Concurrent calls queue behind one another. On any failure the
    /// previously published snapshot keeps serving reads.
    ///
    /// With `reembed`, the catalog is fetched before the provider is
    /// reloaded, so a catalog outage never swaps the model. Providers reload
    /// in place: if the rebuild fails after a successful reload, queries
    /// embed with the new model against the old vectors until the next
    /// successful refresh.
    pub fn refresh(&self, reembed: bool) -> Result<usize> {
        if !self.is_initialized() {
            return Err(SuggestError::NotReady);
        }
        let _writer = self.refresh_lock.lock();
        let start = Instant::now();

        let records = self.catalog.fetch_active()?;
        if reembed {
            info!(provider = self.embedder.name(), "reloading embedding provider");
            self.embedder.reload()?;
        }
        let snapshot = match self.rebuild(&records) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                if reembed {
                    error!(error = %err, "rebuild failed after provider reload; index vectors are stale");
                }
                return Err(err);
            }
        };

        let count = snapshot.len();
        self.publish(snapshot);
        info!(
            skills = count,
            reembed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "vector index refreshed"
        );
        Ok(count)
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Result<Arc<EmbeddingSnapshot>> {
        self.current.read().clone().ok_or(SuggestError::NotReady)
    }

    pub fn query(&self, vector: &[f32], limit: usize, threshold: f32) -> Result<Vec<SkillMatch>> {
        self.snapshot()?.query(vector, limit, threshold)
    }

    pub fn lookup_by_name(
        &self,
        name: &str,
        fuzzy_threshold: f32,
        containment_boost: f32,
    ) -> Result<Option<NameMatch>> {
        Ok(self
            .snapshot()?
            .lookup_by_name(name, fuzzy_threshold, containment_boost))
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }

    #[must_use]
    pub fn skill_count(&self) -> usize {
        self.current.read().as_ref().map_or(0, |snapshot| snapshot.len())
    }

    #[must_use]
    pub fn health(&self) -> IndexHealth {
        let current = self.current.read().clone();
        IndexHealth {
            initialized: current.is_some(),
            skill_count: current.map_or(0, |snapshot| snapshot.len()),
        }
    }

    fn rebuild(&self, records: &[SkillRecord]) -> Result<EmbeddingSnapshot> {
        let snapshot = EmbeddingSnapshot::build(records, self.embedder.as_ref())?;
        self.store.save(&snapshot)?;
        Ok(snapshot)
    }

    fn publish(&self, snapshot: EmbeddingSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(snapshot);
    }

    /// A usable snapshot from storage, reconciled against the catalog, or
    /// `None` if a fresh build is needed.
    fn load_persisted(&self, records: &[SkillRecord]) -> Option<EmbeddingSnapshot> {
        let stored = match self.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "persisted snapshot unreadable; rebuilding");
                return None;
            }
        };

        let expected = self.embedder.dims();
        if stored.dims != expected {
            warn!(stored = stored.dims, expected, "persisted snapshot has wrong dimension; rebuilding");
            return None;
        }

        let stored = retain_known(stored, records);
        match EmbeddingSnapshot::from_parts(stored.dims, stored.vectors, stored.ids, records) {
            Ok(snapshot) => {
                let missing = records.len().saturating_sub(snapshot.len());
                if missing > 0 {
                    info!(missing, "catalog has skills not in the persisted snapshot; refresh to index them");
                }
                Some(snapshot)
            }
            Err(err) => {
                warn!(error = %err, "persisted snapshot is malformed; rebuilding");
                None
            }
        }
    }
}

/// Drop stored rows whose skill id is no longer in the catalog.
fn retain_known(stored: StoredVectors, records: &[SkillRecord]) -> StoredVectors {
    let known: HashSet<SkillId> = records.iter().map(|r| r.id).collect();
    // Misaligned arrays are left for `from_parts` to reject.
    if stored.vectors.len() != stored.ids.len() * stored.dims
        || stored.ids.iter().all(|id| known.contains(id))
    {
        return stored;
    }

    let StoredVectors { dims, vectors, ids } = stored;
    let total = ids.len();
    let mut kept_vectors = Vec::with_capacity(vectors.len());
    let mut kept_ids = Vec::with_capacity(ids.len());
    for (id, row) in ids.into_iter().zip(vectors.chunks(dims)) {
        if known.contains(&id) {
            kept_vectors.extend_from_slice(row);
            kept_ids.push(id);
        } else {
            debug!(skill_id = id, "dropping persisted row for skill no longer in catalog");
        }
    }
    let dropped = total - kept_ids.len();
    warn!(dropped, "persisted snapshot referenced skills no longer in the catalog");
    StoredVectors {
        dims,
        vectors: kept_vectors,
        ids: kept_ids,
    }
}
