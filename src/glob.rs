//! Expand tsconfig-style `include`/`exclude` globs into a concrete file list.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use globwalk::{FileType, GlobWalkerBuilder};
use log::{trace, warn};

use crate::path::{anchor_pattern, ignore_pattern, is_glob, is_hidden, relative_to};

pub const NODE_MODULES: &str = "node_modules";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobOptions {
    /// Match dotfiles and files below dot-directories.
    pub dot: bool,
    /// Excludes appended to every resolution, matched at any depth.
    pub implicit_excludes: Vec<String>,
}

impl Default for GlobOptions {
    fn default() -> Self {
        Self {
            dot: true,
            implicit_excludes: vec![String::from(NODE_MODULES)],
        }
    }
}

/// Enumerate the regular files under `root` matched by `include` and not
/// matched by `exclude` or the implicit excludes.
///
/// Returned paths are relative to `root`. An empty `include` matches nothing.
/// A pattern that fails to compile is skipped; the remaining patterns still
/// apply.
pub fn resolve(
    root: &Path,
    include: &[String],
    exclude: &[String],
    options: &GlobOptions,
) -> BTreeSet<PathBuf> {
    let includes: Vec<String> = include
        .iter()
        .map(|pattern| expand_directory(root, pattern))
        .map(|pattern| anchor_pattern(&pattern))
        .filter(|pattern| compiles(root, pattern))
        .collect();
    if includes.is_empty() {
        return BTreeSet::new();
    }

    let excludes = exclude
        .iter()
        .map(|pattern| ignore_pattern(&anchor_pattern(pattern)))
        .chain(
            options
                .implicit_excludes
                .iter()
                .map(|pattern| ignore_pattern(pattern)),
        )
        .filter(|pattern| compiles(root, pattern));

    // later overrides win, so excludes must follow includes
    let patterns: Vec<String> = includes.into_iter().chain(excludes).collect();
    trace!("glob patterns for {:?}: {:?}", root, patterns);

    let walker = match GlobWalkerBuilder::from_patterns(root, &patterns)
        .file_type(FileType::FILE)
        .min_depth(0)
        .build()
    {
        Ok(walker) => walker,
        Err(err) => {
            warn!("unable to build glob walker for {:?}: {}", root, err);
            return BTreeSet::new();
        }
    };

    walker
        .filter_map(|maybe_dir_entry| match maybe_dir_entry {
            Ok(dir_entry) => relative_to(root, dir_entry.path()),
            Err(err) => {
                warn!("skipping unreadable entry under {:?}: {}", root, err);
                None
            }
        })
        .filter(|path| options.dot || !is_hidden(path))
        .collect()
}

/// A literal pattern naming a directory includes everything below it.
fn expand_directory(root: &Path, pattern: &str) -> String {
    if !is_glob(pattern) && root.join(pattern).is_dir() {
        format!("{}/**/*", pattern.trim_end_matches('/'))
    } else {
        pattern.to_owned()
    }
}

fn compiles(root: &Path, pattern: &str) -> bool {
    match GlobWalkerBuilder::from_patterns(root, &[pattern]).build() {
        Ok(_) => true,
        Err(err) => {
            warn!("ignoring invalid glob {:?}: {}", pattern, err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn tree(files: &[&str]) -> tempfile::TempDir {
        let root = tempfile::tempdir().expect("should create temporary directory");
        for file in files {
            let path = root.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        root
    }

    fn strings(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|s| s.to_string()).collect()
    }

    fn check(root: &Path, include: &[&str], exclude: &[&str], expected: &[&str]) {
        let actual = resolve(
            root,
            &strings(include),
            &strings(exclude),
            &GlobOptions::default(),
        );
        let expected: BTreeSet<PathBuf> = expected.iter().map(PathBuf::from).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn excludes_configured_patterns() {
        let root = tree(&["x.ts", "skip.ts", "y.js"]);
        check(root.path(), &["*.ts"], &["skip.ts"], &["x.ts"]);
    }

    #[test]
    fn top_level_wildcard_does_not_recurse() {
        let root = tree(&["index.ts", "src/lib.ts"]);
        check(root.path(), &["*.ts"], &[], &["index.ts"]);
    }

    #[test]
    fn recursive_wildcard_descends() {
        let root = tree(&["index.ts", "src/lib.ts", "src/deep/er.ts", "src/style.css"]);
        check(
            root.path(),
            &["src/**/*.ts"],
            &[],
            &["src/deep/er.ts", "src/lib.ts"],
        );
    }

    #[test]
    fn empty_include_matches_nothing() {
        let root = tree(&["index.ts"]);
        check(root.path(), &[], &[], &[]);
    }

    #[test]
    fn node_modules_never_matches() {
        let root = tree(&[
            "src/index.ts",
            "node_modules/dep/index.ts",
            "src/node_modules/nested/index.ts",
        ]);
        check(root.path(), &["**/*.ts"], &[], &["src/index.ts"]);
    }

    #[test]
    fn excluded_directory_is_pruned() {
        let root = tree(&["src/index.ts", "src/generated/types.ts"]);
        check(root.path(), &["src/**/*"], &["src/generated"], &["src/index.ts"]);
    }

    #[test]
    fn literal_directory_includes_its_contents() {
        let root = tree(&["src/index.ts", "src/util/strings.ts", "other.ts"]);
        check(
            root.path(),
            &["src"],
            &[],
            &["src/index.ts", "src/util/strings.ts"],
        );
    }

    #[test]
    fn dotfiles_match_by_default() {
        let root = tree(&[".eslintrc.js", "src/.cache/data.js", "src/index.js"]);
        check(
            root.path(),
            &["**/*.js"],
            &[],
            &[".eslintrc.js", "src/.cache/data.js", "src/index.js"],
        );
    }

    #[test]
    fn dotfiles_can_be_skipped() {
        let root = tree(&[".eslintrc.js", "src/.cache/data.js", "src/index.js"]);
        let options = GlobOptions {
            dot: false,
            ..GlobOptions::default()
        };
        let actual = resolve(root.path(), &strings(&["**/*.js"]), &[], &options);
        assert_eq!(actual, BTreeSet::from([PathBuf::from("src/index.js")]));
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let root = tree(&["index.ts", "lib.js"]);
        check(root.path(), &["src/[", "*.ts"], &["{unclosed"], &["index.ts"]);
    }

    #[test]
    fn missing_root_matches_nothing() {
        let root = tree(&[]);
        check(&root.path().join("missing"), &["**/*"], &[], &[]);
    }
}
