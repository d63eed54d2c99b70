//! Hybrid search: curated role mappings topped up with semantic matches.
//!
//! Per call:
//! 1. validate the request and take one snapshot reference;
//! 2. resolve the role against the mapping table and resolve each mapped
//!    skill name against the snapshot's name table;
//! 3. if that does not fill `limit`, embed the role and query the snapshot;
//! 4. append semantic matches not already present, up to `limit`.
//!
//! Every step reads the same snapshot, so a concurrent refresh cannot mix
//! names from one catalog with vectors from another.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::SkillId;
use crate::config::SearchConfig;
use crate::error::{Result, SuggestError};
use crate::mapping::RoleMappingSource;
use crate::search::cache::{CacheStats, QueryEmbeddingCache};
use crate::search::index::VectorIndex;
use crate::search::normalize::{light_normalize, normalize_role};
use crate::search::role_mapper::RoleMapper;
use crate::search::snapshot::EmbeddingSnapshot;
use crate::search::types::{MatchSource, SearchMethod, SearchResult, SkillMatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    pub initialized: bool,
    pub skill_count: usize,
    pub roles_loaded: usize,
}

/// The suggestion service: one vector index, one role mapper.
pub struct SkillSuggester {
    index: VectorIndex,
    mapper: RoleMapper,
    settings: SearchConfig,
    cache: Option<QueryEmbeddingCache>,
}

impl SkillSuggester {
    #[must_use]
    pub fn new(index: VectorIndex, settings: SearchConfig) -> Self {
        Self {
            index,
            mapper: RoleMapper::new(),
            settings,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_query_cache(mut self, cache: QueryEmbeddingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &SearchConfig {
        &self.settings
    }

    #[must_use]
    pub const fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[must_use]
    pub const fn role_mapper(&self) -> &RoleMapper {
        &self.mapper
    }

    /// Bring up the index, then load role mappings if a source is given.
    ///
    /// A mapping failure is logged and leaves the service semantic-only.
    pub fn initialize(&self, mappings: Option<&dyn RoleMappingSource>) -> Result<usize> {
        let count = self.index.initialize()?;
        if let Some(source) = mappings {
            if let Err(err) = self.mapper.load(source) {
                warn!(error = %err, source = %source.describe(), "role mapping unavailable; serving semantic matches only");
            }
        }
        Ok(count)
    }

    /// Rebuild the index; see [`VectorIndex::refresh`].
    pub fn refresh(&self, reembed: bool) -> Result<usize> {
        let result = self.index.refresh(reembed);
        if result.is_ok() || reembed {
            if let Some(cache) = &self.cache {
                cache.clear();
            }
        }
        result
    }

    pub fn reload_role_mapping(&self, source: &dyn RoleMappingSource) -> Result<usize> {
        self.mapper.load(source)
    }

    /// Semantic-only search.
    pub fn search(&self, role: &str, limit: usize, threshold: f32) -> Result<SearchResult> {
        self.hybrid_search(role, limit, threshold, false)
    }

    pub fn hybrid_search(
        &self,
        role: &str,
        limit: usize,
        threshold: f32,
        use_mapping: bool,
    ) -> Result<SearchResult> {
        self.validate(role, limit, threshold)?;
        let snapshot = self.index.snapshot()?;
        let start = Instant::now();

        let normalized = normalize_role(role);
        if normalized.is_empty() {
            debug!(role, "role normalizes to nothing");
            return Ok(SearchResult {
                normalized_role: light_normalize(role),
                matches: Vec::new(),
                method: SearchMethod::Semantic,
            });
        }

        let mut matches = if use_mapping && !self.mapper.is_empty() {
            self.mapped_matches(&snapshot, &normalized)
        } else {
            Vec::new()
        };
        if matches.len() >= limit {
            matches.truncate(limit);
            return Ok(finish(normalized, matches, SearchMethod::Mapped, start));
        }

        let query = self.embed_query(&normalized)?;
        let semantic = snapshot.query(&query, limit, threshold)?;

        if matches.is_empty() {
            return Ok(finish(normalized, semantic, SearchMethod::Semantic, start));
        }

        let mut seen: HashSet<SkillId> = matches.iter().map(|m| m.skill_id).collect();
        let mapped_count = matches.len();
        for candidate in semantic {
            if matches.len() >= limit {
                break;
            }
            if seen.insert(candidate.skill_id) {
                matches.push(candidate);
            }
        }
        let method = if matches.len() > mapped_count {
            SearchMethod::Hybrid
        } else {
            SearchMethod::Mapped
        };
        Ok(finish(normalized, matches, method, start))
    }

    #[must_use]
    pub fn health(&self) -> ServiceHealth {
        let index = self.index.health();
        ServiceHealth {
            initialized: index.initialized,
            skill_count: index.skill_count,
            roles_loaded: self.mapper.len(),
        }
    }

    #[must_use]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(QueryEmbeddingCache::stats)
    }

    fn validate(&self, role: &str, limit: usize, threshold: f32) -> Result<()> {
        if role.trim().is_empty() {
            return Err(SuggestError::InvalidInput("role cannot be empty".to_string()));
        }
        if limit == 0 || limit > self.settings.max_limit {
            return Err(SuggestError::InvalidInput(format!(
                "limit must be between 1 and {}, got {limit}",
                self.settings.max_limit
            )));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SuggestError::InvalidInput(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(())
    }

    /// Mapped skills that resolve against the snapshot, in curated order,
    /// first occurrence per skill id.
    fn mapped_matches(&self, snapshot: &EmbeddingSnapshot, normalized_role: &str) -> Vec<SkillMatch> {
        let settings = &self.settings;
        let Some(role_match) = self.mapper.resolve(
            normalized_role,
            settings.role_fuzzy_threshold,
            settings.containment_boost,
        ) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut matches = Vec::with_capacity(role_match.skills.len());
        for skill in &role_match.skills {
            let Some(found) = snapshot.lookup_by_name(
                skill,
                settings.skill_fuzzy_threshold,
                settings.containment_boost,
            ) else {
                debug!(skill_name = %skill, role = %role_match.role, "mapped skill not in catalog");
                continue;
            };
            if seen.insert(found.skill_id) {
                matches.push(SkillMatch {
                    skill_id: found.skill_id,
                    skill_name: found.canonical_name,
                    confidence: (settings.mapped_confidence * found.score).clamp(0.0, 1.0),
                    source: MatchSource::Mapped,
                });
            }
        }
        matches
    }

    fn embed_query(&self, normalized_role: &str) -> Result<Arc<Vec<f32>>> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(self.index.embedder().embed(normalized_role)?));
        };
        // Read before the lookup so a refresh that lands mid-embed invalidates this result.
        let generation = cache.generation();
        if let Some(cached) = cache.get(normalized_role) {
            return Ok(cached);
        }
        let embedding = Arc::new(self.index.embedder().embed(normalized_role)?);
        if !cache.put_if_current(normalized_role, Arc::clone(&embedding), generation) {
            debug!(role = %normalized_role, "index refreshed during embed; not caching");
        }
        Ok(embedding)
    }
}

fn finish(
    normalized_role: String,
    matches: Vec<SkillMatch>,
    method: SearchMethod,
    start: Instant,
) -> SearchResult {
    debug!(
        role = %normalized_role,
        method = %method,
        matches = matches.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "search complete"
    );
    SearchResult {
        normalized_role,
        matches,
        method,
    }
}
