pub mod config;
pub mod distance;
pub mod engine;

pub use config::{DistanceMetric, MatchingConfig};
pub use distance::{accuracy_from_distance, posture_distance, PostureComparison};
pub use engine::{CandidateScore, MatchOutcome, MatchingEngine};
