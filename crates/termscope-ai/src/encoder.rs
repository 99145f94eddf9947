//! The seam between the classifier and whatever produces sentence vectors.

/// Produces fixed-length sentence embeddings.
///
/// Implementations must be deterministic per text: the vector for a sentence
/// may not depend on which other sentences share its batch.
pub trait TextEncoder: Send + Sync {
    /// Embedding dimensionality.
    fn dim(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input, in order.
    fn encode_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Token-hashing bag-of-words encoder.
///
/// Needs no model files. Each lower-cased alphanumeric token is hashed
/// (FNV-1a) into one of `dim` buckets and the counts are L2-normalized, so
/// similarity reflects shared vocabulary rather than meaning.
#[derive(Debug, Clone)]
pub struct HashedBowEncoder {
    dim: usize,
}

impl HashedBowEncoder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn encode_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = fnv1a(&token.to_lowercase()) as usize % self.dim;
            v[bucket] += 1.0;
        }
        normalize(&mut v);
        v
    }
}

impl Default for HashedBowEncoder {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl TextEncoder for HashedBowEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn encode_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.encode_one(t)).collect())
    }
}

fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in s.bytes() {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

/// L2-normalize a vector in place.
pub(crate) fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
