use std::{path::Path, sync::Arc};

use crate::{glob::GlobOptions, plugin::InputResolver, plugin::TypescriptResolver};

/// The resolver plugins consulted for every workspace, in registration order.
///
/// The list is fixed once built; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn InputResolver>>,
}

impl PluginRegistry {
    pub fn new<I>(plugins: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn InputResolver>>,
    {
        Self {
            plugins: plugins.into_iter().collect(),
        }
    }

    /// The registry shipped with this crate: the tsconfig.json resolver.
    pub fn with_defaults(options: GlobOptions) -> Self {
        Self::new([Arc::new(TypescriptResolver::new(options)) as Arc<dyn InputResolver>])
    }

    /// Plugins to attempt against `workspace`. Every plugin is attempted;
    /// each one decides for itself whether it applies.
    pub fn all_for(&self, _workspace: &Path) -> &[Arc<dyn InputResolver>] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
