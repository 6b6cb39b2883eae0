//! Deterministic content-hash embeddings.
//!
//! This module converts text into fixed-length unit vectors without any
//! model. The vector is a pseudo-random projection seeded by a digest of the
//! text, so it fingerprints content rather than capturing meaning: identical
//! text always lands on the identical vector, anything else lands somewhere
//! unrelated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use sha2::{Digest, Sha256};

/// Embedding dimensionality shared by every backend.
pub const EMBEDDING_DIM: usize = 384;

/// Guards divisions by a vector norm against all-zero vectors.
pub(crate) const NORM_EPSILON: f32 = 1e-9;

/// Generates vector embeddings from a digest of the input text.
///
/// # Example
///
/// ```
/// use ragline_core::rag::Embedder;
///
/// let embedder = Embedder::default();
/// let a = embedder.embed("Returns accepted within 14 days of purchase.");
/// let b = embedder.embed("Returns accepted within 14 days of purchase.");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 384);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Embedder {
    dim: usize,
}

impl Embedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embeds `text` as an L2-normalized vector of [`dim`](Self::dim) values.
    ///
    /// Pure and total: the empty string is valid input.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed_for(text));
        let mut vector: Vec<f32> = (0..self.dim)
            .map(|_| rng.sample::<f32, _>(StandardNormal))
            .collect();

        let norm = l2_norm(&vector) + NORM_EPSILON;
        for value in &mut vector {
            *value /= norm;
        }
        vector
    }
}

impl Default for Embedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

/// First eight digest bytes, big-endian, folded into 32 bits.
fn seed_for(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head) % (u32::MAX as u64)
}

pub(crate) fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_is_deterministic() {
        let embedder = Embedder::default();
        for text in ["", "hello", "Returns accepted within 14 days of purchase."] {
            let a = embedder.embed(text);
            let b = Embedder::default().embed(text);
            assert_eq!(a, b, "embedding of {text:?} changed between calls");
        }
    }

    #[test]
    fn test_embed_is_unit_length() {
        let embedder = Embedder::default();
        for text in ["", "a", "East Malaysia delivery within 7 business days."] {
            let norm = l2_norm(&embedder.embed(text));
            assert!((norm - 1.0).abs() < 1e-4, "norm was {norm}");
        }
    }

    #[test]
    fn test_embed_dimension() {
        assert_eq!(Embedder::default().embed("x").len(), EMBEDDING_DIM);
        assert_eq!(Embedder::new(16).embed("x").len(), 16);
    }

    #[test]
    fn test_different_text_different_vector() {
        let embedder = Embedder::default();
        assert_ne!(embedder.embed("return window"), embedder.embed("shipping SLA"));
    }

    #[test]
    fn test_seed_fits_in_32_bits() {
        assert!(seed_for("anything") < u32::MAX as u64);
    }
}
