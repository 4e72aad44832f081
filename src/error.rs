use std::path::PathBuf;

use typescript_tools::monorepo_manifest::EnumeratePackageManifestsError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error reading monorepo manifest in {root:?}")]
    MonorepoManifest {
        #[source]
        source: typescript_tools::io::FromFileError,
        root: PathBuf,
    },

    #[error("Error enumerating workspaces in {root:?}")]
    EnumerateWorkspaces {
        #[source]
        source: EnumeratePackageManifestsError,
        root: PathBuf,
    },

    #[error("Workspace manifest is in the monorepo root: {filename:?}")]
    WorkspaceInMonorepoRoot { filename: PathBuf },

    #[error("Error writing cache file {filename:?}")]
    CacheWrite {
        #[source]
        source: std::io::Error,
        filename: PathBuf,
    },

    #[error("Error encoding project snapshot")]
    EncodeSnapshot {
        #[from]
        source: serde_json::Error,
    },

    #[error("Error fingerprinting workspace inputs")]
    Fingerprint {
        #[from]
        source: tokio::task::JoinError,
    },
}
