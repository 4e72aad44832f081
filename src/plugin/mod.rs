//! Resolver plugins: each proposes the input files of a workspace for one
//! kind of project.

use std::{
    fmt::{Debug, Display},
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::io::FromFileError;

pub mod typescript;

pub use typescript::TypescriptResolver;

/// The capability every plugin provides.
///
/// Implementations decide for themselves whether they apply to a workspace,
/// typically by looking for a marker file, and return an empty list when they
/// do not. Failures are reported as [`ResolveError`] values; the aggregator
/// treats them as an empty contribution.
#[async_trait]
pub trait InputResolver: Debug + Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Absolute paths of the files this plugin considers inputs of `workspace`.
    async fn resolve(&self, workspace: &Path) -> Result<Vec<PathBuf>, ResolveError>;
}

#[derive(Debug)]
#[non_exhaustive]
pub struct ResolveError {
    workspace: PathBuf,
    kind: ResolveErrorKind,
}

impl ResolveError {
    pub fn new<P: AsRef<Path>>(workspace: P, kind: ResolveErrorKind) -> Self {
        Self {
            workspace: workspace.as_ref().to_owned(),
            kind,
        }
    }

    /// Wrap an arbitrary failure, for plugins defined outside this crate.
    pub fn other<P, E>(workspace: P, err: E) -> Self
    where
        P: AsRef<Path>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(workspace, ResolveErrorKind::Other(err.into()))
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn kind(&self) -> &ResolveErrorKind {
        &self.kind
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ResolveErrorKind::Config(err) => write!(f, "{}", err),
            ResolveErrorKind::Walk(_) => {
                write!(f, "glob walk of {:?} did not complete", self.workspace)
            }
            ResolveErrorKind::Other(err) => {
                write!(f, "unable to resolve {:?}: {}", self.workspace, err)
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ResolveErrorKind::Config(err) => Some(err),
            ResolveErrorKind::Walk(err) => Some(err),
            ResolveErrorKind::Other(err) => Some(err.as_ref()),
        }
    }
}

#[derive(Debug)]
pub enum ResolveErrorKind {
    /// The project configuration could not be read or parsed.
    #[non_exhaustive]
    Config(FromFileError),
    /// The blocking glob walk panicked or was cancelled.
    #[non_exhaustive]
    Walk(tokio::task::JoinError),
    #[non_exhaustive]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
