pub mod error;
pub mod matching;
pub mod models;
pub mod recognizer;
pub mod settings;
pub mod store;
pub mod utils;

pub use error::{ActivityError, ParseFailure, Result};
pub use matching::{CandidateScore, DistanceMetric, MatchOutcome, MatchingConfig, MatchingEngine};
pub use models::{
    ActivityKind, ActivityRecord, FeatureVector, Node, NodeId, NodeRegistry, Posture, Topology,
};
pub use recognizer::{Classification, Recognizer};
pub use settings::ActivityConfig;
pub use store::ActivityStore;
pub use utils::init_logging;
