use serde::{Deserialize, Serialize};

/// Per-node metric over equal-length activity codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
}

/// Configuration for posture matching with tunable scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub metric: DistanceMetric,

    /// Mean distance at which accuracy has decayed to 100/e (about 36.8).
    /// Non-positive or non-finite values fall back to the default.
    pub decay_scale: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::Euclidean,
            decay_scale: 1.0,
        }
    }
}
