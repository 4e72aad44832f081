use std::path::{Component, Path, PathBuf};

/// Anchor a tsconfig-style glob to the root of the walk.
///
/// Override globs follow gitignore rules, where a pattern without a slash
/// matches at any depth. tsconfig patterns are always relative to the
/// directory holding the configuration file, so `*.ts` must only match
/// top-level files.
pub(crate) fn anchor_pattern(pattern: &str) -> String {
    let mut pattern = pattern;
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    if pattern.starts_with('/') {
        pattern.to_owned()
    } else {
        format!("/{}", pattern)
    }
}

/// Turn a pattern into an override that removes matches from the walk.
pub(crate) fn ignore_pattern(pattern: &str) -> String {
    format!("!{}", pattern)
}

pub(crate) fn is_glob(string: &str) -> bool {
    string.contains(&['*', '?', '[', '{'][..])
}

/// True when any component of `relative_path` is a dotfile or dot-directory.
pub(crate) fn is_hidden(relative_path: &Path) -> bool {
    relative_path.components().any(|component| match component {
        Component::Normal(name) => name.to_str().map_or(false, |name| name.starts_with('.')),
        _ => false,
    })
}

pub(crate) fn relative_to(root: &Path, path: &Path) -> Option<PathBuf> {
    path.strip_prefix(root).map(ToOwned::to_owned).ok()
}
