//! Run every plugin against a workspace and merge what they propose.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::join_all;
use log::{debug, error, warn};
use serde::Serialize;

use crate::registry::PluginRegistry;

/// The deduplicated input files of one workspace, in sorted order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolutionResult(BTreeSet<PathBuf>);

impl ResolutionResult {
    pub fn files(&self) -> &BTreeSet<PathBuf> {
        &self.0
    }

    pub fn into_files(self) -> BTreeSet<PathBuf> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode as the JSON array of path strings the scheduler expects.
    ///
    /// Fails only for paths that are not valid UTF-8.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

impl FromIterator<PathBuf> for ResolutionResult {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<PathBuf> for ResolutionResult {
    fn extend<T: IntoIterator<Item = PathBuf>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

/// A plugin that failed for one workspace and so contributed nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginFailure {
    pub plugin: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct Aggregation {
    pub files: ResolutionResult,
    pub failures: Vec<PluginFailure>,
}

#[derive(Clone, Debug)]
pub struct TaskAggregator {
    registry: Arc<PluginRegistry>,
}

impl TaskAggregator {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve `workspace` with every registered plugin concurrently and
    /// merge the results once all of them have settled.
    ///
    /// A plugin that returns an error or panics contributes nothing; the
    /// failure is logged and recorded in [`Aggregation::failures`].
    pub async fn aggregate(&self, workspace: &Path) -> Aggregation {
        let plugins = self.registry.all_for(workspace);
        let outcomes = join_all(plugins.iter().map(|plugin| {
            let plugin = Arc::clone(plugin);
            let workspace = workspace.to_owned();
            tokio::spawn(async move { plugin.resolve(&workspace).await })
        }))
        .await;

        let mut aggregation = Aggregation::default();
        for (plugin, outcome) in plugins.iter().zip(outcomes) {
            let reason = match outcome {
                Ok(Ok(files)) => {
                    debug!(
                        "plugin {} proposed {} files for {:?}",
                        plugin.name(),
                        files.len(),
                        workspace
                    );
                    aggregation.files.extend(files);
                    continue;
                }
                Ok(Err(err)) => {
                    warn!(
                        "plugin {} failed for {:?}: {}",
                        plugin.name(),
                        workspace,
                        err
                    );
                    err.to_string()
                }
                Err(err) => {
                    error!(
                        "plugin {} did not finish for {:?}: {}",
                        plugin.name(),
                        workspace,
                        err
                    );
                    err.to_string()
                }
            };
            aggregation.failures.push(PluginFailure {
                plugin: plugin.name().to_owned(),
                reason,
            });
        }

        aggregation
    }
}
