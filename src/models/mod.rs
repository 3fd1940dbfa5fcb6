pub mod activity;
pub mod node;
pub mod posture;

pub use activity::{ActivityKind, ActivityPayload, ActivityRecord, LEARNED_ACCURACY, UNKNOWN_ACTIVITY};
pub use node::{Node, NodeId, NodeRegistry, Topology};
pub use posture::{FeatureVector, Posture};
