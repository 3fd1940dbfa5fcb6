//! Error taxonomy for the activity store and record codec.
//!
//! Matching itself never fails for well-formed input; everything here
//! lives at the filesystem / JSON boundary.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::models::NodeId;

pub type Result<T> = std::result::Result<T, ActivityError>;

#[derive(Debug, Error)]
pub enum ActivityError {
    /// Directory creation or file write failed.
    #[error("failed to persist activity to {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The target file already exists. Records are never overwritten.
    #[error("activity file {} already exists", .path.display())]
    Collision { path: PathBuf },

    /// A stored file could not be opened or read.
    #[error("failed to read activity file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored record does not have the expected shape.
    #[error("failed to parse activity from {origin}: {reason}")]
    Parse {
        origin: String,
        #[source]
        reason: ParseFailure,
    },
}

#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("node {0} is not part of the sensor network")]
    UnknownNode(NodeId),

    #[error("node {0} appears more than once in the posture")]
    DuplicateNode(NodeId),

    #[error("file is not valid UTF-8")]
    NotUtf8,
}

impl ActivityError {
    pub(crate) fn parse(origin: impl Into<String>, reason: impl Into<ParseFailure>) -> Self {
        ActivityError::Parse {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by the stored content rather than the filesystem.
    pub fn is_parse(&self) -> bool {
        matches!(self, ActivityError::Parse { .. })
    }
}
