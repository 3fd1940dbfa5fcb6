use crate::matching::config::MatchingConfig;
use crate::matching::distance::{accuracy_from_distance, posture_distance, PostureComparison};
use crate::models::{ActivityRecord, Posture};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// How one learned record scored against a live posture.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    /// Position of the record in the library it was ranked from.
    pub index: usize,
    pub name: String,
    pub distance: f64,
    pub nodes_compared: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(CandidateScore),
    /// Empty library, or no learned posture shares a node with the live one.
    NoCandidates,
}

/// Nearest-neighbour classifier over learned postures.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: MatchingConfig,
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn accuracy_for(&self, distance: f64) -> f64 {
        accuracy_from_distance(distance, self.decay_scale())
    }

    /// Score every comparable learned record, in library order.
    ///
    /// Classified records, records sharing no node with `live`, and records
    /// whose codes disagree in length with `live` are left out.
    pub fn rank(&self, live: &Posture, library: &[ActivityRecord]) -> Vec<CandidateScore> {
        let mut scores = Vec::with_capacity(library.len());

        for (index, candidate) in library.iter().enumerate() {
            let Some(learned) = candidate.posture() else {
                continue;
            };

            match posture_distance(self.config.metric, live, learned) {
                PostureComparison::Compared { distance, nodes } => {
                    // Overflowed or NaN sums still count, as the farthest possible match.
                    let distance = if distance.is_nan() { f64::INFINITY } else { distance };
                    scores.push(CandidateScore {
                        index,
                        name: candidate.name().to_string(),
                        distance,
                        nodes_compared: nodes,
                        accuracy: self.accuracy_for(distance),
                    });
                }
                PostureComparison::NoOverlap => {}
                PostureComparison::LengthMismatch { node_id, live, learned } => {
                    log_warn!(
                        "skipping '{}': node {node_id} code length {learned} does not match live length {live}",
                        candidate
                    );
                }
            }
        }

        scores
    }

    /// Pick the lowest-distance candidate; on equal distance the earlier
    /// record in the library wins.
    pub fn evaluate(&self, live: &Posture, library: &[ActivityRecord]) -> MatchOutcome {
        let best = self
            .rank(live, library)
            .into_iter()
            .reduce(|best, score| if score.distance < best.distance { score } else { best });

        match best {
            Some(score) => MatchOutcome::Matched(score),
            None => MatchOutcome::NoCandidates,
        }
    }

    /// Classify `live` against the learned library.
    ///
    /// Never fails: with nothing comparable the result is the 0-accuracy
    /// "unknown" record.
    pub fn classify(&self, live: &Posture, library: &[ActivityRecord]) -> ActivityRecord {
        match self.evaluate(live, library) {
            MatchOutcome::Matched(score) => ActivityRecord::classified(score.name, score.accuracy),
            MatchOutcome::NoCandidates => {
                log_info!(
                    "no comparable learned activity among {} candidates",
                    library.len()
                );
                ActivityRecord::unknown()
            }
        }
    }

    fn decay_scale(&self) -> f64 {
        let scale = self.config.decay_scale;
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            MatchingConfig::default().decay_scale
        }
    }
}
