//! Learning and classification entry points.
//!
//! Ties the store and the matching engine together and keeps the learned
//! library cached in memory between calls.

use std::{
    path::PathBuf,
    sync::{Arc, PoisonError, RwLock},
};

use crate::error::{ActivityError, Result};
use crate::matching::MatchingEngine;
use crate::models::{ActivityRecord, NodeRegistry, Posture};
use crate::settings::ActivityConfig;
use crate::store::ActivityStore;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// Outcome of a classification call.
///
/// The record is always present; storing it is best effort and a failure
/// is carried in `log_error` instead of failing the call.
#[derive(Debug)]
pub struct Classification {
    pub record: ActivityRecord,
    pub path: Option<PathBuf>,
    pub log_error: Option<ActivityError>,
}

impl Classification {
    pub fn is_logged(&self) -> bool {
        self.path.is_some()
    }
}

pub struct Recognizer {
    store: ActivityStore,
    engine: MatchingEngine,
    library: RwLock<Vec<ActivityRecord>>,
}

impl Recognizer {
    /// Build a recognizer and load the learned library from disk.
    pub fn new(config: &ActivityConfig, registry: Arc<dyn NodeRegistry>) -> Result<Self> {
        let store = ActivityStore::new(config, registry);
        let engine = MatchingEngine::new(config.matching.clone());
        Self::from_parts(store, engine)
    }

    pub fn from_parts(store: ActivityStore, engine: MatchingEngine) -> Result<Self> {
        let library = store.load_all_learned()?;
        Ok(Self {
            store,
            engine,
            library: RwLock::new(library),
        })
    }

    pub fn store(&self) -> &ActivityStore {
        &self.store
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn library_len(&self) -> usize {
        self.library
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Names of the cached learned records, earliest first.
    pub fn learned_names(&self) -> Vec<String> {
        self.library
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|record| record.name().to_string())
            .collect()
    }

    /// Store `posture` as ground truth for `name`.
    ///
    /// The record joins the library only once it has been written.
    pub fn learn(&self, name: impl Into<String>, posture: Posture) -> Result<ActivityRecord> {
        let record = ActivityRecord::learned(name, posture);
        record.log(&self.store)?;

        self.library
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(record)
    }

    pub fn classify(&self, posture: &Posture) -> Classification {
        let record = {
            let library = self.library.read().unwrap_or_else(PoisonError::into_inner);
            self.engine.classify(posture, &library)
        };

        match record.log(&self.store) {
            Ok(path) => {
                log_info!("Classified '{}' ({:.1}%)", record, record.accuracy());
                Classification {
                    record,
                    path: Some(path),
                    log_error: None,
                }
            }
            Err(err) => {
                log_error!("unable to store classified activity '{}': {err}", record);
                Classification {
                    record,
                    path: None,
                    log_error: Some(err),
                }
            }
        }
    }

    /// Re-read the learned directory, replacing the cached library.
    pub fn reload(&self) -> Result<usize> {
        let library = self.store.load_all_learned()?;
        let count = library.len();
        *self.library.write().unwrap_or_else(PoisonError::into_inner) = library;
        Ok(count)
    }
}
