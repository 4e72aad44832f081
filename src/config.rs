use std::{num::NonZeroUsize, path::PathBuf};

use crate::glob::GlobOptions;

pub const DEFAULT_CACHE_DIRECTORY: &str = ".cache";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on resolution tasks in flight at once.
    pub concurrency: NonZeroUsize,
    /// Where the project snapshot lives, relative to the project root.
    pub cache_directory: PathBuf,
    pub glob: GlobOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
            cache_directory: PathBuf::from(DEFAULT_CACHE_DIRECTORY),
            glob: GlobOptions::default(),
        }
    }
}

impl Config {
    pub fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_cache_directory<P: Into<PathBuf>>(mut self, cache_directory: P) -> Self {
        self.cache_directory = cache_directory.into();
        self
    }

    pub fn with_glob_options(mut self, glob: GlobOptions) -> Self {
        self.glob = glob;
        self
    }
}
