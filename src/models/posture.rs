use std::collections::BTreeMap;

use super::NodeId;

/// A node's activity code at one instant.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    node_id: NodeId,
    code: Vec<f64>,
}

impl FeatureVector {
    pub fn new(node_id: NodeId, code: impl Into<Vec<f64>>) -> Self {
        Self {
            node_id,
            code: code.into(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn code(&self) -> &[f64] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// Full-body snapshot: at most one feature vector per node.
///
/// Iteration is ordered by node id so serialized postures are stable.
#[derive(Debug, Clone, Default)]
pub struct Posture {
    vectors: BTreeMap<NodeId, FeatureVector>,
}

impl Posture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Posture::insert`].
    pub fn with(mut self, node_id: NodeId, code: impl Into<Vec<f64>>) -> Self {
        self.insert(FeatureVector::new(node_id, code));
        self
    }

    /// Add a vector, returning the one it replaced for the same node.
    pub fn insert(&mut self, vector: FeatureVector) -> Option<FeatureVector> {
        self.vectors.insert(vector.node_id, vector)
    }

    pub fn get(&self, node_id: NodeId) -> Option<&FeatureVector> {
        self.vectors.get(&node_id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.vectors.keys().copied()
    }

    pub fn vectors(&self) -> impl Iterator<Item = &FeatureVector> {
        self.vectors.values()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl FromIterator<FeatureVector> for Posture {
    fn from_iter<I: IntoIterator<Item = FeatureVector>>(iter: I) -> Self {
        let mut posture = Posture::new();
        for vector in iter {
            posture.insert(vector);
        }
        posture
    }
}
