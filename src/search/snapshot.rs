//! Immutable embedding snapshots.
//!
//! A snapshot bundles everything a query needs: the row-major vector matrix,
//! the positionally aligned skill ids, and the two name tables. Once built it
//! is never mutated; a refresh builds a new one and swaps the pointer.

use std::collections::{BTreeMap, HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::catalog::{SkillId, SkillRecord};
use crate::error::{Result, SuggestError};
use crate::search::embeddings::{EmbeddingProvider, dot, l2_norm, l2_normalize};
use crate::search::fuzzy;
use crate::search::normalize::{light_normalize, normalize_skill_name};
use crate::search::types::{MatchSource, NameMatch, SkillMatch};

/// Allowed deviation of a stored vector's L2 norm from 1.0.
pub const NORM_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone)]
pub struct EmbeddingSnapshot {
    dims: usize,
    vectors: Vec<f32>,
    ids: Vec<SkillId>,
    name_by_id: HashMap<SkillId, String>,
    // Ordered so fuzzy scans visit names in a stable order.
    normalized_name_to_id: BTreeMap<String, SkillId>,
}

impl EmbeddingSnapshot {
    /// A ready snapshot with zero rows of width `dims`.
    #[must_use]
    pub fn empty(dims: usize) -> Self {
        Self {
            dims,
            vectors: Vec::new(),
            ids: Vec::new(),
            name_by_id: HashMap::new(),
            normalized_name_to_id: BTreeMap::new(),
        }
    }

    /// Normalize each skill name, embed them in one batch and assemble a snapshot.
    ///
    /// Records are expected in ascending id order. A record whose embedding has
    /// zero norm is skipped rather than stored.
    pub fn build(records: &[SkillRecord], embedder: &dyn EmbeddingProvider) -> Result<Self> {
        let dims = embedder.dims();
        if records.is_empty() {
            return Ok(Self::empty(dims));
        }

        let texts: Vec<String> = records.iter().map(|r| embedding_text(&r.name)).collect();
        let embeddings = embedder.embed_batch(&texts)?;
        if embeddings.len() != records.len() {
            return Err(SuggestError::EmbeddingProvider(format!(
                "provider returned {} embeddings for {} texts",
                embeddings.len(),
                records.len()
            )));
        }

        let mut vectors = Vec::with_capacity(records.len() * dims);
        let mut kept = Vec::with_capacity(records.len());
        for (record, mut embedding) in records.iter().zip(embeddings) {
            if embedding.len() != dims {
                return Err(SuggestError::EmbeddingProvider(format!(
                    "embedding for skill {} has dimension {}, expected {dims}",
                    record.id,
                    embedding.len()
                )));
            }
            if l2_norm(&embedding) == 0.0 {
                warn!(skill_id = record.id, skill_name = %record.name, "skipping skill with zero-norm embedding");
                continue;
            }
            l2_normalize(&mut embedding);
            vectors.extend_from_slice(&embedding);
            kept.push(record.clone());
        }

        let ids = kept.iter().map(|r| r.id).collect();
        Self::from_parts(dims, vectors, ids, &kept)
    }

    /// Assemble a snapshot from raw arrays plus the catalog records that name them.
    ///
    /// Fails if the arrays violate the snapshot invariants or if any id has
    /// no record.
    pub fn from_parts(
        dims: usize,
        vectors: Vec<f32>,
        ids: Vec<SkillId>,
        records: &[SkillRecord],
    ) -> Result<Self> {
        validate_arrays(dims, &vectors, &ids)?;

        let by_id: HashMap<SkillId, &SkillRecord> = records.iter().map(|r| (r.id, r)).collect();
        let mut name_by_id = HashMap::with_capacity(ids.len());
        for id in &ids {
            let record = by_id.get(id).ok_or_else(|| {
                SuggestError::Initialization(format!("no catalog record for skill id {id}"))
            })?;
            name_by_id.insert(*id, record.name.clone());
        }

        let mut ordered: Vec<SkillId> = ids.clone();
        ordered.sort_unstable();
        let mut normalized_name_to_id = BTreeMap::new();
        for id in ordered {
            let key = embedding_text(&name_by_id[&id]);
            // Lowest id keeps a colliding key.
            normalized_name_to_id.entry(key).or_insert(id);
        }

        Ok(Self {
            dims,
            vectors,
            ids,
            name_by_id,
            normalized_name_to_id,
        })
    }

    #[must_use]
    pub const fn dims(&self) -> usize {
        self.dims
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> &[SkillId] {
        &self.ids
    }

    /// Row-major `len() x dims()` matrix.
    #[must_use]
    pub fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    #[must_use]
    pub fn row(&self, index: usize) -> &[f32] {
        &self.vectors[index * self.dims..(index + 1) * self.dims]
    }

    #[must_use]
    pub fn name(&self, id: SkillId) -> Option<&str> {
        self.name_by_id.get(&id).map(String::as_str)
    }

    /// Nearest neighbors of `query` by dot product.
    ///
    /// Every row is scored, the full set is sorted by score descending (ties
    /// by ascending skill id), then cut at the first score below `threshold`
    /// and truncated to `limit`.
    pub fn query(&self, query: &[f32], limit: usize, threshold: f32) -> Result<Vec<SkillMatch>> {
        if query.len() != self.dims {
            return Err(SuggestError::EmbeddingProvider(format!(
                "query vector has dimension {}, index expects {}",
                query.len(),
                self.dims
            )));
        }
        if self.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, SkillId)> = (0..self.len())
            .into_par_iter()
            .map(|index| (dot(self.row(index), query), self.ids[index]))
            .filter(|(score, _)| score.is_finite())
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        let matches = scored
            .into_iter()
            .take_while(|(score, _)| *score >= threshold)
            .take(limit)
            .map(|(score, id)| SkillMatch {
                skill_id: id,
                skill_name: self.name(id).unwrap_or_default().to_string(),
                confidence: score.clamp(0.0, 1.0),
                source: MatchSource::Semantic,
            })
            .collect();
        Ok(matches)
    }

    /// Resolve a raw skill name: exact on the normalized table, else best fuzzy candidate.
    ///
    /// The fuzzy path is a linear scan over every known name.
    #[must_use]
    pub fn lookup_by_name(
        &self,
        name: &str,
        fuzzy_threshold: f32,
        containment_boost: f32,
    ) -> Option<NameMatch> {
        let key = embedding_text(name);
        if key.is_empty() {
            return None;
        }
        if let Some(id) = self.normalized_name_to_id.get(&key) {
            return Some(self.name_match(*id, 1.0));
        }

        let best = fuzzy::best_match(
            &key,
            self.normalized_name_to_id.keys().map(String::as_str),
            containment_boost,
        )?;
        if best.score < fuzzy_threshold {
            debug!(skill_name = name, best = best.candidate, score = best.score, "no skill name match");
            return None;
        }
        let id = self.normalized_name_to_id[best.candidate];
        Some(self.name_match(id, best.score))
    }

    fn name_match(&self, id: SkillId, score: f32) -> NameMatch {
        NameMatch {
            skill_id: id,
            canonical_name: self.name(id).unwrap_or_default().to_string(),
            score,
        }
    }

    /// Re-check every invariant; used on snapshots read back from disk.
    pub fn validate(&self) -> Result<()> {
        validate_arrays(self.dims, &self.vectors, &self.ids)
    }
}

/// Text embedded for a skill name: the normalized name, or the lowercased raw
/// name if normalization strips everything.
#[must_use]
pub fn embedding_text(name: &str) -> String {
    let normalized = normalize_skill_name(name);
    if normalized.is_empty() {
        light_normalize(name)
    } else {
        normalized
    }
}

fn validate_arrays(dims: usize, vectors: &[f32], ids: &[SkillId]) -> Result<()> {
    if dims == 0 {
        return Err(SuggestError::Persistence("snapshot dimension is zero".to_string()));
    }
    if vectors.len() != ids.len() * dims {
        return Err(SuggestError::Persistence(format!(
            "snapshot has {} floats for {} ids of dimension {dims}",
            vectors.len(),
            ids.len()
        )));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            return Err(SuggestError::Persistence(format!("duplicate skill id {id}")));
        }
    }
    for (row, chunk) in vectors.chunks_exact(dims).enumerate() {
        let norm = l2_norm(chunk);
        if (norm - 1.0).abs() > NORM_TOLERANCE {
            return Err(SuggestError::Persistence(format!(
                "row {row} (skill {}) has norm {norm}",
                ids[row]
            )));
        }
    }
    Ok(())
}
