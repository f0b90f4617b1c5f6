use serde::{Deserialize, Serialize};

/// Bounding box for a detected face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

/// Face embedding vector (dimensionality fixed by the embedder, e.g. 128).
///
/// Immutable once produced; compared by Euclidean distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Compute Euclidean distance between two embeddings.
    ///
    /// Sum of squared elementwise differences, then square root. Dimensions
    /// beyond the shorter vector are ignored.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// One face found in a frame: where it is and what it looks like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bounding_box: BoundingBox,
    pub embedding: Embedding,
}
