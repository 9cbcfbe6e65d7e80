//! Loader configuration (spec.md §4.4.1): the standard-library root,
//! project root, and additional search paths, snapshotted once at
//! construction rather than re-read from the environment on every lookup.

use std::env;
use std::path::{Path, PathBuf};

/// Configuration for a [`crate::Loader`]. Cloneable and cheap to build;
/// callers that need per-invocation search paths (e.g. `mana-cli`'s
/// `--search-path`) construct one with [`LoaderConfig::with_search_path`].
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub std_lib_root: PathBuf,
    pub project_root: Option<PathBuf>,
    pub search_paths: Vec<PathBuf>,
}

impl LoaderConfig {
    pub fn new(std_lib_root: impl Into<PathBuf>) -> Self {
        Self {
            std_lib_root: std_lib_root.into(),
            project_root: None,
            search_paths: Vec::new(),
        }
    }

    /// Builds a config from the environment, exactly the way
    /// `ModuleLoader`'s constructor derives its standard-library root in
    /// the original implementation: `MANA_LIB` if set, otherwise
    /// `<home>/.mana/lib` where `<home>` comes from `HOME` (POSIX) or
    /// `USERPROFILE` (Windows).
    pub fn from_env() -> Self {
        let std_lib_root = env::var("MANA_LIB").map(PathBuf::from).unwrap_or_else(|_| {
            let home = env::var("HOME")
                .or_else(|_| env::var("USERPROFILE"))
                .unwrap_or_else(|_| ".".to_string());
            Path::new(&home).join(".mana").join("lib")
        });
        Self::new(std_lib_root)
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_search_paths_in_order() {
        let config = LoaderConfig::new("/lib")
            .with_search_path("/a")
            .with_search_path("/b");
        assert_eq!(
            config.search_paths,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn mana_lib_env_var_overrides_home_derivation() {
        env::set_var("MANA_LIB", "/custom/lib");
        let config = LoaderConfig::from_env();
        env::remove_var("MANA_LIB");
        assert_eq!(config.std_lib_root, PathBuf::from("/custom/lib"));
    }
}
