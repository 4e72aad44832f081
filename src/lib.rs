//! Discover, per workspace of a monorepo, the files that must be treated as
//! build inputs.
//!
//! Resolution is split between a scheduler, which decides which workspaces
//! need resolving and how many may be in flight, and a set of resolver
//! plugins, which propose input files for the project types they understand.
//! The [`bridge`] module is the protocol between the two:
//!
//! 1. the scheduler calls [`BridgeHandle::on_resolve_inputs`] with a task id
//!    and a workspace path;
//! 2. every plugin in the [`PluginRegistry`] resolves the workspace
//!    concurrently, and the [`TaskAggregator`] merges their proposals into a
//!    sorted, deduplicated set;
//! 3. the set is answered back through [`Scheduler::complete_task`] as a JSON
//!    array of absolute paths;
//! 4. once the scheduler has seen every answer it needs it fires
//!    [`BridgeHandle::on_finish`], which ends the run.
//!
//! One plugin ships with this crate: the [`TypescriptResolver`], which
//! expands the `include` globs of a workspace's tsconfig.json, minus its
//! `exclude` globs and `node_modules`. From the [tsconfig exclude]
//! documentation:
//!
//! > Important: `exclude` *only* changes which files are included as a result
//! > of the `include` setting. A file specified by exclude can still become
//! > part of your codebase due to an import statement in your code, a types
//! > inclusion, a `/// <reference` directive, or being specified in the
//! > `files` list.
//!
//! This resolver performs no source-code analysis to follow imported files,
//! so its result is an estimate of what the compiler reads.
//!
//! Plugin failures never fail a task. A missing tsconfig.json contributes
//! nothing; an unreadable or malformed one is logged and contributes nothing.
//!
//! The [`Orchestrator`] ties the pieces into a full pass over a monorepo
//! with the in-process [`LocalScheduler`], fingerprints each workspace's
//! inputs, and reports which workspaces changed since the previous pass.
//!
//! [tsconfig exclude]: https://www.typescriptlang.org/tsconfig#exclude

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations)]

pub mod aggregate;
pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod glob;
pub mod io;
mod path;
pub mod plugin;
pub mod registry;
pub mod runner;
pub mod scheduler;
pub mod task;
pub mod workspace;

pub use aggregate::{Aggregation, PluginFailure, ResolutionResult, TaskAggregator};
pub use bridge::{BridgeError, BridgeHandle, RunState, Scheduler, SchedulerBridge};
pub use config::Config;
pub use error::Error;
pub use glob::GlobOptions;
pub use plugin::{InputResolver, ResolveError, ResolveErrorKind, TypescriptResolver};
pub use registry::PluginRegistry;
pub use runner::{Orchestrator, RunSummary};
pub use scheduler::{LocalScheduler, TaskOutcome};
pub use task::{Task, TaskId};
pub use workspace::{Project, Workspace};
