//! Embedding providers.
//!
//! The index treats embeddings as an opaque capability behind
//! [`EmbeddingProvider`]. [`HashEmbedder`] is the built-in backend: FNV-1a
//! feature hashing over word tokens and character trigrams. It needs no model
//! files and is fully deterministic.

use rayon::prelude::*;

use crate::error::{Result, SuggestError};

/// Dimension of the reference sentence-embedding model (MiniLM-L6).
pub const DEFAULT_EMBEDDING_DIMS: usize = 384;

/// Produces unit-length vectors of a fixed dimension.
///
/// Implementations must be cheap to share across threads; the index calls
/// them outside of any internal lock.
pub trait EmbeddingProvider: Send + Sync {
    /// Output dimension; every vector returned has exactly this length.
    fn dims(&self) -> usize;

    /// Embed a single non-empty text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, preserving input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Drop any cached model state so the next call picks up a new model.
    fn reload(&self) -> Result<()> {
        Ok(())
    }

    /// Short identifier for logs and health output.
    fn name(&self) -> &'static str;
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash embedder using FNV-1a
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    /// Embedding dimension (default: 384)
    dim: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_EMBEDDING_DIMS,
        }
    }
}

impl HashEmbedder {
    /// Create embedder with specified dimension
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    /// Embed text into an L2-normalized vector; empty text maps to all zeros.
    #[must_use]
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in text.split_whitespace() {
            self.accumulate(&mut vector, token.as_bytes(), 1.0);
            let padded: Vec<char> = format!("#{token}#").chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.accumulate(&mut vector, gram.as_bytes(), 0.5);
            }
        }
        l2_normalize(&mut vector);
        vector
    }

    fn accumulate(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let slot = (hash % self.dim as u64) as usize;
        // High bit picks the sign so collisions tend to cancel instead of pile up.
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[slot] += sign * weight;
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn dims(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(SuggestError::EmbeddingProvider(
                "cannot embed empty text".to_string(),
            ));
        }
        Ok(self.embed_text(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.par_iter().map(|text| self.embed_text(text)).collect())
    }

    fn name(&self) -> &'static str {
        "hash"
    }
}

/// 64-bit FNV-1a.
#[must_use]
pub fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Scale `vector` to unit length in place; zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = l2_norm(vector);
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

#[must_use]
pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Dot product; equals cosine similarity when both inputs are unit length.
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
