use serde::{Deserialize, Serialize};

use crate::error::SampleError;

/// Fixed-length voice embedding vector.
///
/// Immutable once created. Non-emptiness is enforced at construction;
/// dimension agreement between embeddings is checked by consumers at
/// comparison time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Creates an embedding from a raw vector.
    /// Returns [`SampleError::EmptyEmbedding`] for an empty input.
    pub fn new(values: Vec<f32>) -> Result<Self, SampleError> {
        if values.is_empty() {
            return Err(SampleError::EmptyEmbedding);
        }
        Ok(Self(values))
    }

    /// Number of dimensions in the vector.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty() {
        assert!(Embedding::new(vec![]).is_err());
    }

    #[test]
    fn test_dim() {
        let e = Embedding::new(vec![0.1, 0.2, 0.3]).unwrap();
        assert_eq!(e.dim(), 3);
        assert_eq!(e.as_slice(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_serde_transparent() {
        let e = Embedding::new(vec![1.0, 2.0]).unwrap();
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, "[1.0,2.0]");
        let back: Embedding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
