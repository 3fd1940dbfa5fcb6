use crate::matching::config::DistanceMetric;
use crate::models::{NodeId, Posture};

impl DistanceMetric {
    /// Distance between two codes of equal length.
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
        }
    }
}

/// Result of comparing a live posture against one learned posture.
#[derive(Debug, Clone, PartialEq)]
pub enum PostureComparison {
    /// Mean per-node distance over the nodes both postures share.
    Compared { distance: f64, nodes: usize },
    /// The postures share no node.
    NoOverlap,
    /// A shared node has codes of different length.
    LengthMismatch {
        node_id: NodeId,
        live: usize,
        learned: usize,
    },
}

/// Unweighted mean of per-node distances over shared nodes.
///
/// Nodes present in only one posture are ignored. Nodes are visited in id
/// order, so swapping the arguments yields the identical value.
pub fn posture_distance(metric: DistanceMetric, live: &Posture, learned: &Posture) -> PostureComparison {
    let mut total = 0.0;
    let mut nodes = 0usize;

    for vector in live.vectors() {
        let Some(other) = learned.get(vector.node_id()) else {
            continue;
        };
        if vector.len() != other.len() {
            return PostureComparison::LengthMismatch {
                node_id: vector.node_id(),
                live: vector.len(),
                learned: other.len(),
            };
        }
        total += metric.distance(vector.code(), other.code());
        nodes += 1;
    }

    if nodes == 0 {
        PostureComparison::NoOverlap
    } else {
        PostureComparison::Compared {
            distance: total / nodes as f64,
            nodes,
        }
    }
}

/// Map a distance onto a 0-100 accuracy with exponential decay.
///
/// `100 * exp(-distance / scale)`: distance 0 scores 100, larger distances
/// score strictly less, and the result never goes below 0.
pub fn accuracy_from_distance(distance: f64, scale: f64) -> f64 {
    if distance.is_nan() {
        return 0.0;
    }
    (100.0 * (-distance.max(0.0) / scale).exp()).clamp(0.0, 100.0)
}
