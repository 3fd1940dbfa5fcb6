//! On-disk JSON shapes of activity records.
//!
//! Learned: `{"name": .., "posture": [{"id": .., "code": [..]}, ..]}`
//! Classified: `{"name": .., "accuracy": .., "date": "yyyy-MM-ddTHH:mm+0000"}`

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{ser::Error as _, Deserialize, Serialize};

use crate::error::{ActivityError, ParseFailure, Result};
use crate::models::{ActivityPayload, ActivityRecord, FeatureVector, NodeId, NodeRegistry, Posture};

/// Minute resolution, UTC offset rendered as `+0000`.
pub const CLASSIFIED_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M%z";

/// Second resolution filename stem, e.g. `261016093015`.
pub const FILE_STAMP_FORMAT: &str = "%y%m%d%H%M%S";

const CODE_PRECISION: f64 = 1000.0;

#[derive(Debug, Serialize, Deserialize)]
pub struct PostureEntry {
    pub id: NodeId,
    pub code: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LearnedFile {
    pub name: String,
    pub posture: Vec<PostureEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifiedFile {
    pub name: String,
    pub accuracy: f64,
    pub date: String,
}

/// Round to 3 decimal places, the precision learned codes are stored with.
///
/// Halves round toward positive infinity, so `-0.0005` becomes `0.0`.
pub fn round_code(value: f64) -> f64 {
    (value * CODE_PRECISION + 0.5).floor() / CODE_PRECISION
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format(CLASSIFIED_DATE_FORMAT).to_string()
}

/// Filename for the `attempt`-th write within the same second.
///
/// Attempt 0 is the bare timestamp; later attempts get a `-N` suffix.
pub fn file_name(at: DateTime<Utc>, attempt: u32, extension: &str) -> String {
    let stamp = at.format(FILE_STAMP_FORMAT);
    if attempt == 0 {
        format!("{stamp}.{extension}")
    } else {
        format!("{stamp}-{attempt}.{extension}")
    }
}

pub fn encode(record: &ActivityRecord) -> serde_json::Result<String> {
    match record.payload() {
        ActivityPayload::Learned { posture } => {
            let posture = posture
                .vectors()
                .map(encode_vector)
                .collect::<serde_json::Result<Vec<_>>>()?;
            let file = LearnedFile {
                name: record.name().to_string(),
                posture,
            };
            serde_json::to_string_pretty(&file)
        }
        ActivityPayload::Classified => {
            let file = ClassifiedFile {
                name: record.name().to_string(),
                accuracy: record.accuracy(),
                date: format_date(record.created_at()),
            };
            serde_json::to_string_pretty(&file)
        }
    }
}

/// JSON has no NaN or infinity, so such codes could never be read back.
fn encode_vector(vector: &FeatureVector) -> serde_json::Result<PostureEntry> {
    let code: Vec<f64> = vector.code().iter().copied().map(round_code).collect();
    if code.iter().any(|value| !value.is_finite()) {
        return Err(serde_json::Error::custom(format!(
            "node {} has a non-finite code value",
            vector.node_id()
        )));
    }

    Ok(PostureEntry {
        id: vector.node_id(),
        code,
    })
}

/// Parse a learned file and resolve every node against the registry.
pub fn decode_learned(
    content: &str,
    origin: &str,
    registry: &dyn NodeRegistry,
    created_at: DateTime<Utc>,
) -> Result<ActivityRecord> {
    let file: LearnedFile =
        serde_json::from_str(content).map_err(|err| ActivityError::parse(origin, err))?;

    let mut seen = HashSet::new();
    let mut posture = Posture::new();
    for entry in file.posture {
        let node = registry
            .node(entry.id)
            .ok_or_else(|| ActivityError::parse(origin, ParseFailure::UnknownNode(entry.id)))?;
        if !seen.insert(node.id) {
            return Err(ActivityError::parse(origin, ParseFailure::DuplicateNode(node.id)));
        }
        posture.insert(FeatureVector::new(node.id, entry.code));
    }

    Ok(ActivityRecord::learned_at(file.name, posture, created_at))
}
