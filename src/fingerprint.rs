//! Content fingerprints of resolved inputs, used to tell which workspaces
//! changed since the previous run.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type WorkspaceFiles = BTreeMap<PathBuf, FileFingerprint>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    pub path: PathBuf,
    /// Hex-encoded SHA-256 of the file contents.
    pub hash: String,
    /// Modification time in milliseconds since the Unix epoch.
    pub modified: u64,
}

impl FileFingerprint {
    pub fn read<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read(path)?;
        Ok(Self {
            path: path.to_owned(),
            hash: format!("{:x}", Sha256::digest(&contents)),
            modified: modified_millis(path)?,
        })
    }

    /// Re-read the file if its modification time moved. Returns whether the
    /// contents changed along with the current fingerprint.
    pub fn refresh(&self) -> io::Result<(bool, Self)> {
        if modified_millis(&self.path)? == self.modified {
            return Ok((false, self.clone()));
        }
        let current = Self::read(&self.path)?;
        Ok((current.hash != self.hash, current))
    }
}

fn modified_millis(path: &Path) -> io::Result<u64> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default())
}

/// Fingerprint `inputs` in parallel against the `previous` fingerprints of
/// the same workspace.
///
/// The workspace is dirty when it has no previous fingerprints, or when any
/// input is new, changed, or no longer an input. Files that cannot be read
/// are logged and left out.
pub fn invalidate(
    previous: Option<&WorkspaceFiles>,
    inputs: Vec<PathBuf>,
) -> (bool, WorkspaceFiles) {
    let fingerprints: Vec<(bool, FileFingerprint)> = inputs
        .into_par_iter()
        .filter_map(|path| {
            let fingerprint = match previous.and_then(|previous| previous.get(&path)) {
                Some(known) => known.refresh(),
                None => FileFingerprint::read(&path).map(|fingerprint| (true, fingerprint)),
            };
            fingerprint
                .map_err(|err| warn!("unable to fingerprint {:?}: {}", path, err))
                .ok()
        })
        .collect();

    let mut is_dirty = previous.is_none();
    let mut files = WorkspaceFiles::new();
    for (changed, fingerprint) in fingerprints {
        is_dirty |= changed;
        files.insert(fingerprint.path.clone(), fingerprint);
    }
    if let Some(previous) = previous {
        is_dirty |= previous.keys().any(|path| !files.contains_key(path));
    }

    (is_dirty, files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_workspace_is_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.ts");
        fs::write(&file, "export {}").unwrap();

        let (is_dirty, files) = invalidate(None, vec![file.clone()]);
        assert!(is_dirty);
        assert_eq!(files.len(), 1);
        assert_eq!(files[&file].path, file);
    }

    #[test]
    fn unchanged_inputs_are_clean() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.ts");
        fs::write(&file, "export {}").unwrap();

        let (_, previous) = invalidate(None, vec![file.clone()]);
        let (is_dirty, files) = invalidate(Some(&previous), vec![file]);
        assert!(!is_dirty);
        assert_eq!(files, previous);
    }

    #[test]
    fn changed_contents_are_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.ts");
        fs::write(&file, "export {}").unwrap();
        let (_, mut previous) = invalidate(None, vec![file.clone()]);
        // force a re-read regardless of timestamp granularity
        previous.get_mut(&file).unwrap().modified = 0;
        fs::write(&file, "export const changed = true").unwrap();

        let (is_dirty, files) = invalidate(Some(&previous), vec![file.clone()]);
        assert!(is_dirty);
        assert_ne!(files[&file].hash, previous[&file].hash);
    }

    #[test]
    fn touched_but_identical_contents_are_clean() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.ts");
        fs::write(&file, "export {}").unwrap();
        let (_, mut previous) = invalidate(None, vec![file.clone()]);
        previous.get_mut(&file).unwrap().modified = 0;

        let (is_dirty, _) = invalidate(Some(&previous), vec![file]);
        assert!(!is_dirty);
    }

    #[test]
    fn removed_input_is_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.ts");
        let removed = dir.path().join("removed.ts");
        fs::write(&kept, "").unwrap();
        fs::write(&removed, "").unwrap();
        let (_, previous) = invalidate(None, vec![kept.clone(), removed]);

        let (is_dirty, files) = invalidate(Some(&previous), vec![kept]);
        assert!(is_dirty);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn unreadable_input_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (_, files) = invalidate(None, vec![dir.path().join("missing.ts")]);
        assert!(files.is_empty());
    }
}
