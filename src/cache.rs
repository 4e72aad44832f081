use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{error::Error, fingerprint::WorkspaceFiles, io::read_json_from_file};

pub const PROJECT_SNAPSHOT_FILENAME: &str = "project.json";

/// A directory of named cache files.
#[derive(Clone, Debug)]
pub struct FileCache {
    directory: PathBuf,
}

impl FileCache {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_owned(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }

    pub fn has(&self, file_name: &str) -> bool {
        self.file_path(file_name).is_file()
    }

    /// Write `content`, creating the cache directory if needed.
    pub fn write(&self, file_name: &str, content: &str) -> Result<(), Error> {
        let filename = self.file_path(file_name);
        fs::create_dir_all(&self.directory)
            .and_then(|_| fs::write(&filename, content))
            .map_err(|source| Error::CacheWrite { source, filename })
    }
}

/// Fingerprints of every workspace's inputs as of the last run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub workspaces: BTreeMap<String, WorkspaceFiles>,
}

impl ProjectSnapshot {
    /// Restore the snapshot from `cache`. A missing or unreadable snapshot is
    /// treated as absent.
    pub fn load(cache: &FileCache) -> Option<Self> {
        if !cache.has(PROJECT_SNAPSHOT_FILENAME) {
            return None;
        }
        match read_json_from_file(cache.file_path(PROJECT_SNAPSHOT_FILENAME)) {
            Ok(snapshot) => {
                debug!("project restored from cache {:?}", cache.directory());
                Some(snapshot)
            }
            Err(err) => {
                warn!("ignoring cached project snapshot: {}", err);
                None
            }
        }
    }

    pub fn store(&self, cache: &FileCache) -> Result<(), Error> {
        let serialized = serde_json::to_string(self)?;
        cache.write(PROJECT_SNAPSHOT_FILENAME, &serialized)
    }
}
