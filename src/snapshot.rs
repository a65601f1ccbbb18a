//! Dated snapshots of the repository collection
//!
//! Each ranking run persists one snapshot keyed by calendar date (a second
//! run on the same day overwrites). A pointer file records the most recent
//! snapshot for the fast path; when the pointer is missing or dangling, a
//! directory scan of dated files takes over. Absence of history is a normal
//! state, not an error: the first run of a fresh installation simply sees an
//! empty previous collection and reports every repository as new.

use crate::Result;
use crate::model::{RepoCollection, RepoRecord};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use ohno::IntoAppError;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};

const LOG_TARGET: &str = "snapshot";

const SNAPSHOT_PREFIX: &str = "snapshot-";
const SNAPSHOT_SUFFIX: &str = ".json";
const POINTER_FILE: &str = "last_snapshot";

/// Stores and prunes dated collection snapshots under one directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: Utf8PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Persist the collection under today's date, update the pointer, and
    /// prune everything beyond the `retention` most recent snapshot files.
    ///
    /// Retention is count-based ("keep the N most recent files"), not
    /// calendar-based, so skipped run days do not silently shrink history.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot or pointer cannot be written. Prune
    /// failures of individual stale files are logged and skipped.
    pub fn persist(&self, collection: &RepoCollection, retention: usize, today: NaiveDate) -> Result<Utf8PathBuf> {
        fs::create_dir_all(&self.dir).into_app_err_with(|| format!("unable to create snapshot directory '{}'", self.dir))?;

        let file_name = format!("{SNAPSHOT_PREFIX}{today}{SNAPSHOT_SUFFIX}");
        let path = self.dir.join(&file_name);

        let file = File::create(&path).into_app_err_with(|| format!("unable to create snapshot file '{path}'"))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, collection).into_app_err_with(|| format!("unable to write snapshot file '{path}'"))?;
        writer
            .flush()
            .into_app_err_with(|| format!("unable to flush snapshot file '{path}'"))?;

        let pointer_path = self.dir.join(POINTER_FILE);
        fs::write(&pointer_path, &file_name).into_app_err_with(|| format!("unable to write snapshot pointer '{pointer_path}'"))?;

        self.prune(retention);

        log::debug!(target: LOG_TARGET, "Persisted snapshot '{path}' ({} records)", collection.repos.len());
        Ok(path)
    }

    /// Load the previous collection as a map from identity key to record.
    ///
    /// Never fails: a missing pointer, a dangling pointer target, or an
    /// unparseable snapshot all yield an empty map (logged at debug level),
    /// which makes every delta render as `+new` downstream.
    #[must_use]
    pub fn load_previous(&self) -> HashMap<String, RepoRecord> {
        let Some(path) = self.previous_snapshot_path() else {
            log::debug!(target: LOG_TARGET, "No previous snapshot under '{}'", self.dir);
            return HashMap::new();
        };

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Unable to open previous snapshot '{path}': {e:#}");
                return HashMap::new();
            }
        };

        let collection: RepoCollection = match serde_json::from_reader(BufReader::new(file)) {
            Ok(collection) => collection,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Ignoring unparseable snapshot '{path}': {e:#}");
                return HashMap::new();
            }
        };

        log::debug!(target: LOG_TARGET, "Loaded previous snapshot '{path}' ({} records)", collection.repos.len());
        collection
            .repos
            .into_iter()
            .map(|record| (record.identity_key().to_string(), record))
            .collect()
    }

    /// Resolve the previous snapshot: pointer first, newest dated file as
    /// the fallback.
    fn previous_snapshot_path(&self) -> Option<Utf8PathBuf> {
        if let Ok(pointer) = fs::read_to_string(self.dir.join(POINTER_FILE)) {
            let target = self.dir.join(pointer.trim());
            if target.is_file() {
                return Some(target);
            }
            log::debug!(target: LOG_TARGET, "Snapshot pointer is dangling, falling back to directory scan");
        }

        // Dated names sort chronologically, so the lexicographic max wins.
        self.snapshot_files().into_iter().max()
    }

    /// All dated snapshot files in the store directory.
    fn snapshot_files(&self) -> Vec<Utf8PathBuf> {
        let Ok(entries) = self.dir.read_dir_utf8() else {
            return Vec::new();
        };

        entries
            .filter_map(|entry| entry.ok().map(|e| e.path().to_path_buf()))
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| name.starts_with(SNAPSHOT_PREFIX) && name.ends_with(SNAPSHOT_SUFFIX))
            })
            .collect()
    }

    fn prune(&self, retention: usize) {
        let mut files = self.snapshot_files();
        if files.len() <= retention {
            return;
        }

        files.sort();
        let stale = files.len() - retention;
        for path in files.into_iter().take(stale) {
            match fs::remove_file(&path) {
                Ok(()) => log::debug!(target: LOG_TARGET, "Pruned stale snapshot '{path}'"),
                Err(e) => log::warn!(target: LOG_TARGET, "Unable to prune stale snapshot '{path}': {e:#}"),
            }
        }
    }
}
