use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Opaque identifier the scheduler assigns to a resolution request.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// The id used for the input-resolution task of a named workspace.
    pub fn resolve_inputs(workspace_name: &str) -> Self {
        Self(format!("{}:resolve_inputs", workspace_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// One request to resolve the input files of a workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub workspace: PathBuf,
}

impl Task {
    pub fn new<I, P>(id: I, workspace: P) -> Self
    where
        I: Into<TaskId>,
        P: AsRef<Path>,
    {
        Self {
            id: id.into(),
            workspace: workspace.as_ref().to_owned(),
        }
    }
}
