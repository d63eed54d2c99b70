//! Skill search engine
//!
//! Hybrid search: a curated role -> skills table, resolved against the
//! catalog's names, topped up by nearest-neighbor search over skill-name
//! embeddings.

pub mod cache;
pub mod embeddings;
pub mod fuzzy;
pub mod hybrid;
pub mod index;
pub mod normalize;
pub mod persistence;
pub mod role_mapper;
pub mod snapshot;
pub mod types;

pub use cache::{CacheStats, QueryEmbeddingCache};
pub use embeddings::{EmbeddingProvider, HashEmbedder};
pub use hybrid::{ServiceHealth, SkillSuggester};
pub use index::VectorIndex;
pub use normalize::{normalize_role, normalize_skill_name};
pub use persistence::{FileSnapshotStore, MemorySnapshotStore, SnapshotPersistence, StoredVectors};
pub use role_mapper::{RoleMapper, RoleMappingTable, RoleMatch};
pub use snapshot::EmbeddingSnapshot;
pub use types::{IndexHealth, MatchSource, NameMatch, SearchMethod, SearchResult, SkillMatch};
