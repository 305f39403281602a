//! Face descriptors and tolerance-based comparison

use serde::{Deserialize, Serialize};

/// Default match tolerance. Smaller values make matching stricter.
///
/// 0.5 is deliberately tighter than the 0.6 most embedding models ship
/// with: in a classroom a false "absent student spotted" alert costs more
/// than a missed detection.
pub const DEFAULT_TOLERANCE: f32 = 0.5;

/// An opaque face embedding produced by a [`crate::FaceEmbedder`].
///
/// Descriptors are only meaningful relative to each other, and only when
/// produced by the same embedder. Comparison is Euclidean distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor(Vec<f32>);

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Euclidean distance to another descriptor.
    ///
    /// Descriptors of different lengths come from different embedders and
    /// can never match; their distance is infinite.
    pub fn distance(&self, other: &Descriptor) -> f32 {
        if self.0.len() != other.0.len() {
            return f32::INFINITY;
        }
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }

    pub fn within(&self, other: &Descriptor, tolerance: f32) -> bool {
        self.distance(other) <= tolerance
    }
}

/// Compare a candidate against a list of known descriptors.
///
/// Returns one bool per known descriptor, in order, true where the
/// Euclidean distance is within tolerance.
pub fn compare_against(known: &[Descriptor], candidate: &Descriptor, tolerance: f32) -> Vec<bool> {
    known
        .iter()
        .map(|k| k.within(candidate, tolerance))
        .collect()
}
