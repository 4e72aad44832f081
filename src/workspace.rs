use std::path::{Path, PathBuf};

use log::{debug, trace};
use typescript_tools::{configuration_file::ConfigurationFile, monorepo_manifest};

use crate::error::Error;

pub const PACKAGE_MANIFEST_FILENAME: &str = "package.json";

/// A buildable unit of the monorepo: one package with its own manifest.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Workspace {
    pub name: String,
    /// Absolute path of the directory holding the package manifest.
    pub directory: PathBuf,
}

impl Workspace {
    pub fn manifest_file(&self) -> PathBuf {
        self.directory.join(PACKAGE_MANIFEST_FILENAME)
    }
}

#[derive(Clone, Debug)]
pub struct Project {
    workspaces: Vec<Workspace>,
}

impl Project {
    /// Enumerate the workspaces declared by the monorepo manifest in `root`,
    /// ordered by package name.
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Self, Error> {
        let root = root.as_ref();
        let lerna_manifest = monorepo_manifest::MonorepoManifest::from_directory(root)
            .map_err(|source| Error::MonorepoManifest {
                source,
                root: root.to_owned(),
            })?;
        trace!("{:?}", lerna_manifest);
        let package_manifests_by_package_name = lerna_manifest
            .package_manifests_by_package_name()
            .map_err(|source| Error::EnumerateWorkspaces {
                source,
                root: root.to_owned(),
            })?;

        let mut workspaces = package_manifests_by_package_name
            .iter()
            .map(|(name, package_manifest)| -> Result<Workspace, Error> {
                let manifest_file = root.join(package_manifest.path());
                let directory = manifest_file
                    .parent()
                    .filter(|directory| *directory != root)
                    .ok_or_else(|| Error::WorkspaceInMonorepoRoot {
                        filename: manifest_file.clone(),
                    })?;
                Ok(Workspace {
                    name: name.to_owned(),
                    directory: directory.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        workspaces.sort();
        debug!("discovered {} workspaces in {:?}", workspaces.len(), root);

        Ok(Self { workspaces })
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }
}
