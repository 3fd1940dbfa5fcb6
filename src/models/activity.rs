//! Learned and classified activity records.
//!
//! Both variants are write-once values: they are built, optionally logged
//! through an [`ActivityStore`], and never mutated afterwards.

use std::{fmt, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NodeRegistry, Posture};
use crate::error::Result;
use crate::store::{format, ActivityStore};

/// Certainty of a record taught from ground truth.
pub const LEARNED_ACCURACY: f64 = 100.0;

/// Name reported when nothing in the library could be compared.
pub const UNKNOWN_ACTIVITY: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Learned,
    Classified,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Learned => "learned",
            ActivityKind::Classified => "classified",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ActivityPayload {
    Learned { posture: Posture },
    Classified,
}

#[derive(Debug, Clone)]
pub struct ActivityRecord {
    name: String,
    accuracy: f64,
    created_at: DateTime<Utc>,
    payload: ActivityPayload,
}

impl ActivityRecord {
    pub fn learned(name: impl Into<String>, posture: Posture) -> Self {
        Self::learned_at(name, posture, Utc::now())
    }

    pub(crate) fn learned_at(
        name: impl Into<String>,
        posture: Posture,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            accuracy: LEARNED_ACCURACY,
            created_at,
            payload: ActivityPayload::Learned { posture },
        }
    }

    /// Accuracy is clamped into `[0, 100]`; NaN becomes 0.
    pub fn classified(name: impl Into<String>, accuracy: f64) -> Self {
        let accuracy = if accuracy.is_nan() {
            0.0
        } else {
            accuracy.clamp(0.0, LEARNED_ACCURACY)
        };

        Self {
            name: name.into(),
            accuracy,
            created_at: Utc::now(),
            payload: ActivityPayload::Classified,
        }
    }

    /// The 0-confidence result of classifying against nothing comparable.
    pub fn unknown() -> Self {
        Self::classified(UNKNOWN_ACTIVITY, 0.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn payload(&self) -> &ActivityPayload {
        &self.payload
    }

    pub fn kind(&self) -> ActivityKind {
        match self.payload {
            ActivityPayload::Learned { .. } => ActivityKind::Learned,
            ActivityPayload::Classified => ActivityKind::Classified,
        }
    }

    /// Only learned records carry a posture.
    pub fn posture(&self) -> Option<&Posture> {
        match &self.payload {
            ActivityPayload::Learned { posture } => Some(posture),
            ActivityPayload::Classified => None,
        }
    }

    pub fn is_learned(&self) -> bool {
        self.kind() == ActivityKind::Learned
    }

    /// Render the persisted JSON form of this record.
    pub fn to_json(&self) -> serde_json::Result<String> {
        format::encode(self)
    }

    /// Rebuild a learned record from its persisted JSON form.
    ///
    /// `origin` names the source in error messages (usually the file path).
    pub fn from_json(
        content: &str,
        origin: &str,
        registry: &dyn NodeRegistry,
    ) -> Result<Self> {
        format::decode_learned(content, origin, registry, Utc::now())
    }

    /// Write this record into the store directory for its kind.
    pub fn log(&self, store: &ActivityStore) -> Result<PathBuf> {
        store.persist(self)
    }
}

impl fmt::Display for ActivityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
