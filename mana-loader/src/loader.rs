//! The module loader (spec.md §4.4): resolves a module path or file path to
//! an [`AstModule`], caching the result and detecting import cycles.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use mana_ast::{AstModule, DeclKind};
use thiserror::Error;

use crate::config::LoaderConfig;
use crate::paths::{self, file_path_to_module_name};
use crate::symbol::{register_exports, Symbol};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("module not found: {0}")]
    Resolution(String),
    #[error("cannot open file: {0}")]
    Io(String),
    #[error("failed to parse: {0}: {1}")]
    Syntax(String, String),
    #[error("circular module dependency: {0}")]
    Cycle(String),
}

/// A module once loaded: its parsed AST, where it came from on disk, its
/// export table, and which other modules it transitively imports.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    pub ast: AstModule,
    pub file_path: PathBuf,
    pub exports: HashMap<String, Symbol>,
    pub dependencies: Vec<String>,
}

/// Caches loaded modules by canonical module name and detects import
/// cycles via a loading set scoped to the current call stack. `file_to_module`
/// is the reverse mapping from a canonical file path to the module name it
/// was first loaded under (spec.md §4.4.4 step 8), so that two distinct
/// module paths resolving to the same file on disk load it once.
#[derive(Debug)]
pub struct Loader {
    config: LoaderConfig,
    modules: HashMap<String, LoadedModule>,
    loading: HashSet<String>,
    file_to_module: HashMap<PathBuf, String>,
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            modules: HashMap::new(),
            loading: HashSet::new(),
            file_to_module: HashMap::new(),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Loads a module by its `::`-separated path (spec.md §4.4.4), probing
    /// candidate file locations in priority order, parsing, registering
    /// exports, and recursively resolving the module's own imports so that
    /// cycles anywhere in the transitive chain are caught by this one call.
    pub fn load_module(&mut self, module_path: &str) -> Result<&LoadedModule, LoadError> {
        self.load_module_from(module_path, None)
    }

    fn load_module_from(
        &mut self,
        module_path: &str,
        from_file: Option<&Path>,
    ) -> Result<&LoadedModule, LoadError> {
        if self.modules.contains_key(module_path) {
            log::debug!("module {module_path} already cached");
            return Ok(self.modules.get(module_path).expect("just checked"));
        }

        if self.loading.contains(module_path) {
            log::warn!("circular module dependency detected: {module_path}");
            return Err(LoadError::Cycle(module_path.to_string()));
        }

        let candidates = paths::candidate_paths(module_path, &self.config, from_file);
        let file_path = candidates
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| {
                log::warn!("module not found: {module_path}");
                LoadError::Resolution(module_path.to_string())
            })?;
        let file_path = paths::normalize_path(&file_path);

        log::info!("loading module {module_path} from {}", file_path.display());
        self.load_file_as(&file_path, module_path)
    }

    /// Loads a module directly by file path (spec.md §4.4.4's `load_file`),
    /// deriving the canonical module name from the path.
    pub fn load_file(&mut self, file_path: &Path) -> Result<&LoadedModule, LoadError> {
        let file_path = paths::normalize_path(file_path);
        let module_name = file_path_to_module_name(&file_path);
        self.load_file_as(&file_path, &module_name)
    }

    fn load_file_as(
        &mut self,
        file_path: &Path,
        module_name: &str,
    ) -> Result<&LoadedModule, LoadError> {
        if let Some(existing_name) = self.file_to_module.get(file_path) {
            log::debug!(
                "file {} already loaded as module {existing_name}",
                file_path.display()
            );
            return Ok(self
                .modules
                .get(existing_name)
                .expect("file_to_module entry without a cached module"));
        }

        let source = fs::read_to_string(file_path).map_err(|_| {
            log::warn!("cannot open file: {}", file_path.display());
            LoadError::Io(file_path.display().to_string())
        })?;

        self.loading.insert(module_name.to_string());
        let result = self.parse_and_resolve(module_name, file_path, &source);
        self.loading.remove(module_name);

        match result {
            Ok(loaded) => {
                self.file_to_module
                    .insert(file_path.to_path_buf(), module_name.to_string());
                self.modules.insert(module_name.to_string(), loaded);
                Ok(self.modules.get(module_name).expect("just inserted"))
            }
            Err(err) => Err(err),
        }
    }

    fn parse_and_resolve(
        &mut self,
        module_name: &str,
        file_path: &Path,
        source: &str,
    ) -> Result<LoadedModule, LoadError> {
        let ast = mana_parser::parse(source, module_name).map_err(|err| {
            log::warn!("failed to parse {}: {err}", file_path.display());
            LoadError::Syntax(file_path.display().to_string(), err.to_string())
        })?;

        let registration = register_exports(&ast);
        for duplicate in &registration.duplicates {
            log::warn!("duplicate public declaration: {duplicate} in module {module_name}");
        }

        // Cycles propagate upward so the whole chain fails together (spec.md
        // §4.4.5); any other dependency failure (missing file, parse error)
        // is already reported by the call that produced it and does not
        // cascade — this module still parses and caches on its own (spec.md
        // §4.4.7, §7: each load's success/failure is independent).
        let mut dependencies = Vec::new();
        for decl in &ast.decls {
            match &decl.kind {
                DeclKind::Import(import) if !import.is_file_import => {
                    match self.load_module_from(&import.name, Some(file_path)) {
                        Ok(_) => dependencies.push(import.name.clone()),
                        Err(LoadError::Cycle(cycle)) => return Err(LoadError::Cycle(cycle)),
                        Err(_) => {}
                    }
                }
                DeclKind::Import(import) => {
                    let candidates = paths::file_import_candidates(
                        &import.name,
                        Some(file_path),
                        self.config.project_root.as_deref(),
                    );
                    match candidates.into_iter().find(|p| p.is_file()) {
                        Some(resolved) => {
                            let resolved = paths::normalize_path(&resolved);
                            let dep_name = file_path_to_module_name(&resolved);
                            match self.load_file_as(&resolved, &dep_name) {
                                Ok(_) => dependencies.push(dep_name),
                                Err(LoadError::Cycle(cycle)) => return Err(LoadError::Cycle(cycle)),
                                Err(_) => {}
                            }
                        }
                        None => log::warn!("file import not found: {}", import.name),
                    }
                }
                DeclKind::Use(use_decl) => {
                    let path = paths::join_module_path(&use_decl.path);
                    match self.load_module_from(&path, Some(file_path)) {
                        Ok(_) => dependencies.push(path),
                        Err(LoadError::Cycle(cycle)) => return Err(LoadError::Cycle(cycle)),
                        Err(_) => {}
                    }
                }
                _ => {}
            }
        }

        Ok(LoadedModule {
            ast,
            file_path: file_path.to_path_buf(),
            exports: registration.exports,
            dependencies,
        })
    }

    pub fn get_module(&self, module_name: &str) -> Option<&LoadedModule> {
        self.modules.get(module_name)
    }

    pub fn get_export(&self, module_name: &str, symbol_name: &str) -> Option<&Symbol> {
        self.modules.get(module_name)?.exports.get(symbol_name)
    }

    pub fn get_all_exports(&self, module_name: &str) -> Option<&HashMap<String, Symbol>> {
        self.modules.get(module_name).map(|m| &m.exports)
    }

    pub fn modules(&self) -> impl Iterator<Item = (&String, &LoadedModule)> {
        self.modules.iter()
    }

    pub fn clear_cache(&mut self) {
        self.modules.clear();
        self.loading.clear();
        self.file_to_module.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        let mut file = fs::File::create(&path).expect("create file");
        file.write_all(contents.as_bytes()).expect("write file");
        path
    }

    #[test]
    fn loads_a_single_module_with_no_dependencies() {
        let dir = tempdir().expect("tempdir");
        write_file(
            dir.path(),
            "a.mana",
            "pub fn greet() -> i32 { return 1; }\n",
        );
        let config = LoaderConfig::new("/nonexistent").with_project_root(dir.path());
        let mut loader = Loader::new(config);
        let module = loader.load_module("a").expect("loads");
        assert!(module.exports.contains_key("greet"));
    }

    #[test]
    fn resolves_std_prefixed_module_from_stdlib_root() {
        let std_dir = tempdir().expect("tempdir");
        write_file(std_dir.path(), "std/io.mana", "pub fn read() -> i32 { return 0; }\n");
        let config = LoaderConfig::new(std_dir.path());
        let mut loader = Loader::new(config);
        let module = loader.load_module("std::io").expect("loads");
        assert!(module.exports.contains_key("read"));
    }

    #[test]
    fn loads_directory_form_module_via_mod_mana() {
        let dir = tempdir().expect("tempdir");
        write_file(dir.path(), "util/mod.mana", "pub fn helper() -> i32 { return 2; }\n");
        let config = LoaderConfig::new("/nonexistent").with_project_root(dir.path());
        let mut loader = Loader::new(config);
        let module = loader.load_module("util").expect("loads");
        assert!(module.exports.contains_key("helper"));
    }

    #[test]
    fn circular_use_is_detected_and_neither_module_is_cached() {
        let dir = tempdir().expect("tempdir");
        write_file(dir.path(), "a.mana", "use b;\npub fn a_fn() -> i32 { return 1; }\n");
        write_file(dir.path(), "b.mana", "use a;\npub fn b_fn() -> i32 { return 2; }\n");
        let config = LoaderConfig::new("/nonexistent").with_project_root(dir.path());
        let mut loader = Loader::new(config);
        let err = loader.load_module("a").expect_err("cycle should fail");
        assert!(matches!(err, LoadError::Cycle(_)));
        assert!(loader.get_module("a").is_none());
        assert!(loader.get_module("b").is_none());
    }

    #[test]
    fn missing_module_reports_resolution_error() {
        let config = LoaderConfig::new("/nonexistent");
        let mut loader = Loader::new(config);
        let err = loader.load_module("does::not::exist").expect_err("missing");
        assert!(matches!(err, LoadError::Resolution(_)));
    }

    #[test]
    fn sibling_file_directory_wins_over_search_path() {
        let project = tempdir().expect("tempdir");
        let other = tempdir().expect("tempdir");
        write_file(
            project.path(),
            "src/main.mana",
            "pub fn from_project() -> i32 { return 1; }\n",
        );
        write_file(
            other.path(),
            "util.mana",
            "pub fn from_search_path() -> i32 { return 2; }\n",
        );
        write_file(project.path(), "src/util.mana", "pub fn from_sibling() -> i32 { return 3; }\n");

        let config = LoaderConfig::new("/nonexistent")
            .with_project_root(project.path())
            .with_search_path(other.path());
        let mut loader = Loader::new(config);
        let from_file = project.path().join("src/main.mana");
        let module = loader
            .load_module_from("util", Some(&from_file))
            .expect("loads");
        assert!(module.exports.contains_key("from_sibling"));
    }

    #[test]
    fn loaded_module_file_path_is_canonical_and_absolute() {
        let dir = tempdir().expect("tempdir");
        write_file(dir.path(), "a.mana", "pub fn greet() -> i32 { return 1; }\n");
        let config = LoaderConfig::new("/nonexistent").with_project_root(dir.path());
        let mut loader = Loader::new(config);
        let module = loader.load_module("a").expect("loads");
        assert!(module.file_path.is_absolute());
        assert_eq!(
            module.file_path,
            fs::canonicalize(dir.path().join("a.mana")).expect("canonicalize")
        );
    }

    #[test]
    fn loading_the_same_file_via_two_module_paths_parses_it_once() {
        let dir = tempdir().expect("tempdir");
        write_file(dir.path(), "util/mod.mana", "pub fn helper() -> i32 { return 2; }\n");
        let config = LoaderConfig::new("/nonexistent").with_project_root(dir.path());
        let mut loader = Loader::new(config);

        let via_module_path = loader.load_module("util").expect("loads").exports.len();
        let file_path = dir.path().join("util/mod.mana");
        let via_direct_file = loader.load_file(&file_path).expect("loads").exports.len();

        assert_eq!(via_module_path, via_direct_file);
        // only "util" (derived from the directory name) is cached; the direct
        // load found the same file already recorded in `file_to_module` and
        // returned the existing entry rather than reparsing under a second name.
        assert_eq!(loader.modules().count(), 1);
        assert!(loader.get_module("util").is_some());
    }

    #[test]
    fn non_cycle_dependency_failure_does_not_prevent_the_importing_module_from_loading() {
        let dir = tempdir().expect("tempdir");
        write_file(
            dir.path(),
            "a.mana",
            "use does::not::exist;\npub fn a_fn() -> i32 { return 1; }\n",
        );
        let config = LoaderConfig::new("/nonexistent").with_project_root(dir.path());
        let mut loader = Loader::new(config);
        let module = loader.load_module("a").expect("loads despite missing dependency");
        assert!(module.exports.contains_key("a_fn"));
        assert!(module.dependencies.is_empty());
        assert!(loader.get_module("a").is_some());
    }
}
