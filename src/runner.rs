//! One full pass over a monorepo: discover its workspaces, resolve their
//! inputs through the scheduler protocol, and report which workspaces changed
//! since the snapshot left by the previous pass.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, info, warn};

use crate::{
    bridge::SchedulerBridge,
    cache::{FileCache, ProjectSnapshot},
    config::Config,
    error::Error,
    fingerprint,
    registry::PluginRegistry,
    scheduler::{LocalScheduler, TaskOutcome},
    task::{Task, TaskId},
    workspace::Project,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of workspaces discovered.
    pub workspaces: usize,
    /// Names of workspaces whose inputs changed, in name order.
    pub updated: Vec<String>,
    /// Workspaces whose resolution failed, with the reason.
    pub failed: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct Orchestrator {
    root: PathBuf,
    config: Config,
    registry: Arc<PluginRegistry>,
}

impl Orchestrator {
    pub fn new<P: AsRef<Path>>(root: P, config: Config) -> Self {
        let registry = Arc::new(PluginRegistry::with_defaults(config.glob.clone()));
        Self {
            root: root.as_ref().to_owned(),
            config,
            registry,
        }
    }

    pub fn with_registry(mut self, registry: Arc<PluginRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn cache(&self) -> FileCache {
        FileCache::new(self.root.join(&self.config.cache_directory))
    }

    pub async fn run(&self) -> Result<RunSummary, Error> {
        let project = Project::discover(&self.root)?;
        let cache = self.cache();
        let previous = ProjectSnapshot::load(&cache).unwrap_or_default();

        let tasks = project
            .workspaces()
            .iter()
            .map(|workspace| {
                Task::new(
                    TaskId::resolve_inputs(&workspace.name),
                    &workspace.directory,
                )
            });
        let scheduler = Arc::new(LocalScheduler::new(tasks));
        SchedulerBridge::new(Arc::clone(&self.registry))
            .run(Arc::clone(&scheduler), self.config.concurrency)
            .await;
        let mut outcomes = scheduler.outcomes();

        let mut summary = RunSummary {
            workspaces: project.workspaces().len(),
            ..RunSummary::default()
        };
        let mut resolved: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for workspace in project.workspaces() {
            match outcomes.remove(&TaskId::resolve_inputs(&workspace.name)) {
                Some(TaskOutcome::Completed(mut inputs)) => {
                    inputs.push(workspace.manifest_file());
                    resolved.insert(workspace.name.clone(), inputs);
                }
                Some(TaskOutcome::Failed(reason)) => {
                    warn!("resolving {} failed: {}", workspace.name, reason);
                    summary.failed.push((workspace.name.clone(), reason));
                }
                None => {
                    warn!("no outcome recorded for {}", workspace.name);
                    summary
                        .failed
                        .push((workspace.name.clone(), String::from("no outcome recorded")));
                }
            }
        }

        let failed: BTreeSet<String> = summary
            .failed
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        let (updated, snapshot) = tokio::task::spawn_blocking(move || {
            let mut previous = previous.workspaces;
            let mut snapshot = ProjectSnapshot::default();
            let mut updated = Vec::new();
            for (name, inputs) in resolved {
                let known = previous.remove(&name);
                let (is_dirty, files) = fingerprint::invalidate(known.as_ref(), inputs);
                if is_dirty {
                    updated.push(name.clone());
                }
                snapshot.workspaces.insert(name, files);
            }
            // keep what we knew about workspaces that failed this time, so
            // they are compared against it on the next run
            for (name, files) in previous {
                if failed.contains(&name) {
                    snapshot.workspaces.insert(name, files);
                }
            }
            (updated, snapshot)
        })
        .await?;

        info!("updated workspaces: {:?}", updated);
        snapshot.store(&cache)?;
        debug!("project snapshot written to {:?}", cache.directory());

        summary.updated = updated;
        Ok(summary)
    }
}
