//! Resolve the inputs of a TypeScript workspace from its tsconfig.json.
//!
//! The `include` globs of the configuration file are expanded relative to the
//! workspace, minus the `exclude` globs and `node_modules`. The configuration
//! file itself is always an input.
//!
//! This is an estimate in the same sense the TypeScript compiler documents
//! for `exclude`: files reached through `import` statements, `files`, or
//! `/// <reference` directives are not followed.
//!
//! Every pattern is anchored to the workspace directory and the walk never
//! leaves it. An include that climbs out of the workspace, such as
//! `../shared/**/*.ts`, matches nothing.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, trace};
use serde::Deserialize;

use super::{InputResolver, ResolveError, ResolveErrorKind};
use crate::{
    glob::{self, GlobOptions},
    io::read_jsonc_from_file,
};

pub const TSCONFIG_FILENAME: &str = "tsconfig.json";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypescriptConfig {
    // an explicit null reads the same as an absent key
    #[serde(default)]
    include: Option<Vec<String>>,
    #[serde(default)]
    exclude: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default)]
pub struct TypescriptResolver {
    options: GlobOptions,
}

impl TypescriptResolver {
    pub fn new(options: GlobOptions) -> Self {
        Self { options }
    }

    async fn tsconfig_file(workspace: &Path) -> Option<PathBuf> {
        let tsconfig_file = workspace.join(TSCONFIG_FILENAME);
        match tokio::fs::metadata(&tsconfig_file).await {
            Ok(metadata) if metadata.is_file() => Some(tsconfig_file),
            _ => None,
        }
    }
}

#[async_trait]
impl InputResolver for TypescriptResolver {
    fn name(&self) -> &str {
        "typescript"
    }

    async fn resolve(&self, workspace: &Path) -> Result<Vec<PathBuf>, ResolveError> {
        let tsconfig_file = match Self::tsconfig_file(workspace).await {
            Some(tsconfig_file) => tsconfig_file,
            None => {
                trace!("no {} in {:?}", TSCONFIG_FILENAME, workspace);
                return Ok(Vec::new());
            }
        };

        let TypescriptConfig { include, exclude } = read_jsonc_from_file(&tsconfig_file)
            .await
            .map_err(|err| ResolveError::new(workspace, ResolveErrorKind::Config(err)))?;
        let include = include.unwrap_or_default();
        let exclude = exclude.unwrap_or_default();
        debug!(
            "{:?}: include {:?}, exclude {:?}",
            tsconfig_file, include, exclude
        );

        let root = workspace.to_owned();
        let options = self.options.clone();
        let included_files =
            tokio::task::spawn_blocking(move || glob::resolve(&root, &include, &exclude, &options))
                .await
                .map_err(|err| ResolveError::new(workspace, ResolveErrorKind::Walk(err)))?;

        Ok(std::iter::once(tsconfig_file)
            .chain(included_files.into_iter().map(|file| workspace.join(file)))
            .collect())
    }
}
