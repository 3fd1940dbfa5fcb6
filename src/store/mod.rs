//! Directory-per-kind persistence for activity records.
//!
//! Every record is one JSON file named after the second it was written.
//! Writes are staged in a hidden temp file and published with a hard link,
//! which fails instead of replacing an existing file. Readers therefore
//! never see a half-written record and two writers never clobber each other.
//! Where hard links are unsupported the staged content is copied into a
//! `create_new` target, which still never replaces an existing file.

pub mod format;

use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{ActivityError, ParseFailure, Result};
use crate::models::{ActivityKind, ActivityRecord, NodeRegistry};
use crate::settings::ActivityConfig;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Same-second writes beyond this many suffixes are reported as a collision.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

pub struct ActivityStore {
    learned_dir: PathBuf,
    classified_dir: PathBuf,
    extension: String,
    registry: Arc<dyn NodeRegistry>,
}

impl ActivityStore {
    pub fn new(config: &ActivityConfig, registry: Arc<dyn NodeRegistry>) -> Self {
        Self {
            learned_dir: config.learned_dir.clone(),
            classified_dir: config.classified_dir.clone(),
            extension: config.extension.trim_start_matches('.').to_string(),
            registry,
        }
    }

    pub fn learned_dir(&self) -> &Path {
        &self.learned_dir
    }

    pub fn classified_dir(&self) -> &Path {
        &self.classified_dir
    }

    pub fn dir_for(&self, kind: ActivityKind) -> &Path {
        match kind {
            ActivityKind::Learned => &self.learned_dir,
            ActivityKind::Classified => &self.classified_dir,
        }
    }

    /// Load every learned record under the learned directory, recursively.
    ///
    /// Files that cannot be read or parsed are logged and skipped. Records
    /// come back in the order they were written (by filename stamp).
    pub fn load_all_learned(&self) -> Result<Vec<ActivityRecord>> {
        ensure_dir(&self.learned_dir)?;

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.learned_dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log_warn!("skipping unreadable entry under {}: {err}", self.learned_dir.display());
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.has_extension(path))
            .collect();
        paths.sort_by_cached_key(|path| load_order_key(path));

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            match self.load_learned(&path) {
                Ok(record) => records.push(record),
                Err(err) => log_warn!("skipping learned activity {}: {err}", path.display()),
            }
        }

        log_info!(
            "Loaded {} learned activities from {}",
            records.len(),
            self.learned_dir.display()
        );
        Ok(records)
    }

    /// Load a single learned record, surfacing any read or parse failure.
    pub fn load_learned(&self, path: &Path) -> Result<ActivityRecord> {
        let (bytes, modified) = read_file(path)?;
        let origin = path.display().to_string();
        let content = String::from_utf8(bytes)
            .map_err(|_| ActivityError::parse(origin.clone(), ParseFailure::NotUtf8))?;

        format::decode_learned(&content, &origin, self.registry.as_ref(), modified)
    }

    /// Write a record into the directory for its kind and return the new path.
    ///
    /// Writes landing in the same second get `-1`, `-2`, ... suffixes.
    pub fn persist(&self, record: &ActivityRecord) -> Result<PathBuf> {
        let dir = self.dir_for(record.kind());
        ensure_dir(dir)?;

        let content = record.to_json().map_err(|err| ActivityError::Persistence {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, err),
        })?;

        let staged = stage(dir, &content)?;
        let published = self.publish(&staged, dir, Utc::now());
        if let Err(err) = fs::remove_file(&staged) {
            log_warn!("failed to remove staged file {}: {err}", staged.display());
        }

        let path = published?;
        log_info!("Stored {} activity '{}' at {}", record.kind().as_str(), record, path.display());
        Ok(path)
    }

    fn publish(&self, staged: &Path, dir: &Path, at: DateTime<Utc>) -> Result<PathBuf> {
        let mut last = dir.join(format::file_name(at, 0, &self.extension));
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let target = dir.join(format::file_name(at, attempt, &self.extension));
            match link_new(staged, &target) {
                Ok(()) => return Ok(target),
                Err(ActivityError::Collision { path }) => last = path,
                Err(err) => return Err(err),
            }
        }
        Err(ActivityError::Collision { path: last })
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| ActivityError::Persistence {
        path: dir.to_path_buf(),
        source,
    })
}

fn stage(dir: &Path, content: &str) -> Result<PathBuf> {
    let staged = dir.join(format!(".{}.partial", Uuid::new_v4()));
    let to_err = |source| ActivityError::Persistence {
        path: staged.clone(),
        source,
    };

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&staged)
        .map_err(to_err)?;
    let written = file
        .write_all(content.as_bytes())
        .and_then(|_| file.sync_all());
    if let Err(source) = written {
        drop(file);
        if let Err(err) = fs::remove_file(&staged) {
            log_warn!("failed to remove staged file {}: {err}", staged.display());
        }
        return Err(to_err(source));
    }

    Ok(staged)
}

fn link_new(staged: &Path, target: &Path) -> Result<()> {
    match fs::hard_link(staged, target) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Err(ActivityError::Collision {
            path: target.to_path_buf(),
        }),
        Err(err) => {
            log_warn!("cannot hard link {}: {err}; copying instead", target.display());
            copy_new(staged, target)
        }
    }
}

/// Copy `staged` into `target`, failing with [`ActivityError::Collision`] if
/// `target` exists. For filesystems without hard links (FAT, exFAT, some
/// network mounts); a reader may see the target before the copy completes.
fn copy_new(staged: &Path, target: &Path) -> Result<()> {
    let to_err = |source| ActivityError::Persistence {
        path: target.to_path_buf(),
        source,
    };

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ActivityError::Collision {
                path: target.to_path_buf(),
            })
        }
        Err(source) => return Err(to_err(source)),
    };

    let copied = fs::File::open(staged)
        .and_then(|mut source| io::copy(&mut source, &mut file))
        .and_then(|_| file.sync_all());
    if let Err(source) = copied {
        drop(file);
        if let Err(err) = fs::remove_file(target) {
            log_warn!("failed to remove partial copy {}: {err}", target.display());
        }
        return Err(to_err(source));
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<(Vec<u8>, DateTime<Utc>)> {
    let to_err = |source| ActivityError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::open(path).map_err(to_err)?;
    let modified = file
        .metadata()
        .and_then(|meta| meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(to_err)?;
    Ok((bytes, modified))
}

/// Sort key that puts `stamp.json` before `stamp-1.json`, `stamp-2.json`, ...
///
/// The directory a file sits in does not matter; only its stamp does.
fn load_order_key(path: &Path) -> (String, u32, PathBuf) {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();

    let (stamp, attempt) = match stem.rsplit_once('-') {
        Some((stamp, suffix)) => match suffix.parse::<u32>() {
            Ok(attempt) => (stamp, attempt),
            Err(_) => (stem, 0),
        },
        None => (stem, 0),
    };

    (stamp.to_string(), attempt, path.to_path_buf())
}
