//! Module path syntax (spec.md §6) and the path-to-file mapping (§4.4.2,
//! §4.4.3).
//!
//! All path concatenation goes through [`std::path::PathBuf`], never string
//! concatenation, per spec.md §9's platform-path-handling note.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LoaderConfig;

/// Normalizes a path to the module's identity form (spec.md §4.4.2: "its
/// canonical absolute path is the module's identity"), mirroring
/// `original_source/frontend/ModuleLoader.cpp::normalize_path`: canonicalize
/// when the path resolves (resolving symlinks and `.`/`..` components),
/// falling back to a merely-absolute path if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

/// `segment ( "::" segment )*` where `segment` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_module_path(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    path.split("::").all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits `"a::b::c"` into `["a", "b", "c"]`. Does not validate; call
/// [`is_valid_module_path`] first where validity matters.
pub fn split_module_path(path: &str) -> Vec<String> {
    path.split("::").map(str::to_string).collect()
}

/// The identity round-trip on all valid paths (spec.md §8).
pub fn join_module_path(parts: &[String]) -> String {
    parts.join("::")
}

/// `"std::io::file"` -> `Some("std::io")`. `None` for a single-segment path.
pub fn parent_module(path: &str) -> Option<String> {
    let mut parts = split_module_path(path);
    if parts.len() <= 1 {
        return None;
    }
    parts.pop();
    Some(join_module_path(&parts))
}

/// `"std::io::file"` -> `"file"`.
pub fn module_name(path: &str) -> Option<String> {
    split_module_path(path).into_iter().next_back()
}

/// The two candidate file forms for a module's relative path (spec.md
/// §4.4.2): the leaf form and the directory-with-entry form.
fn candidate_suffixes(module_path: &str) -> (PathBuf, PathBuf) {
    let parts = split_module_path(module_path);
    let mut rel = PathBuf::new();
    for part in &parts {
        rel.push(part);
    }
    let mut leaf = rel.clone();
    leaf.set_extension("mana");
    // `rel` still has no extension here; `leaf` is rel with `.mana` appended
    // as an extension, which only works cleanly because module segments
    // never contain dots. Guard against that assumption silently breaking:
    // extension-setting on a multi-segment relative path only touches the
    // final component, which is exactly what we want.
    let dir = rel.join("mod.mana");
    (leaf, dir)
}

/// Builds the ordered candidate absolute-path list for a module path,
/// exactly in the priority order of spec.md §4.4.2:
///
/// 1. sibling-of-importer forms (if `from_file` is given), prepended so
///    they take precedence over everything else,
/// 2. the standard-library root (if the path starts with `std`),
/// 3. `<project_root>/src/<candidate>` then `<project_root>/<candidate>`,
/// 4. each configured search path, in order,
/// 5. the current working directory.
pub fn candidate_paths(
    module_path: &str,
    config: &LoaderConfig,
    from_file: Option<&Path>,
) -> Vec<PathBuf> {
    let (leaf, dir) = candidate_suffixes(module_path);
    let mut candidates = Vec::new();

    if let Some(from_file) = from_file {
        if let Some(from_dir) = from_file.parent() {
            candidates.push(from_dir.join(&leaf));
            candidates.push(from_dir.join(&dir));
        }
    }

    let first_segment = module_path.split("::").next().unwrap_or("");
    if first_segment == "std" {
        candidates.push(config.std_lib_root.join(&leaf));
        candidates.push(config.std_lib_root.join(&dir));
    }

    if let Some(root) = &config.project_root {
        candidates.push(root.join("src").join(&leaf));
        candidates.push(root.join("src").join(&dir));
        candidates.push(root.join(&leaf));
        candidates.push(root.join(&dir));
    }

    for search in &config.search_paths {
        candidates.push(search.join(&leaf));
        candidates.push(search.join(&dir));
    }

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(&leaf));
        candidates.push(cwd.join(&dir));
    }

    candidates
}

/// Resolves a file-import path (spec.md §4.4.3). `raw_path` has already had
/// its surrounding quotes stripped by the parser. Forward slashes inside it
/// are native on POSIX and accepted verbatim by `Path` on Windows too.
pub fn file_import_candidates(
    raw_path: &str,
    from_file: Option<&Path>,
    project_root: Option<&Path>,
) -> Vec<PathBuf> {
    let path = Path::new(raw_path);
    if path.is_absolute() {
        return vec![path.to_path_buf()];
    }

    let mut candidates = Vec::new();
    if let Some(from_file) = from_file {
        if let Some(dir) = from_file.parent() {
            candidates.push(dir.join(path));
        }
    }
    if let Some(root) = project_root {
        candidates.push(root.join(path));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(path));
    }
    candidates
}

/// Derives a module name from a loaded file's path (spec.md §4.4.4's
/// `load_file`): the file stem, unless the stem is `mod`, in which case the
/// parent directory's name is used.
pub fn file_path_to_module_name(file_path: &Path) -> String {
    let stem = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    if stem == "mod" {
        file_path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or(stem)
            .to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_path_identifiers_are_validated() {
        assert!(is_valid_module_path("std::io::file"));
        assert!(is_valid_module_path("_private"));
        assert!(!is_valid_module_path("std::2io"));
        assert!(!is_valid_module_path(""));
        assert!(!is_valid_module_path("std::"));
    }

    #[test]
    fn split_then_join_is_identity() {
        for path in ["a", "a::b", "a::b::c", "_x::y9::z_z"] {
            let parts = split_module_path(path);
            assert_eq!(join_module_path(&parts), path);
        }
    }

    #[test]
    fn parent_then_append_recovers_original() {
        let path = "a::b::c";
        let parent = parent_module(path).expect("has a parent");
        assert_eq!(parent, "a::b");
        let name = module_name(path).expect("has a name");
        assert_eq!(format!("{parent}::{name}"), path);
    }

    #[test]
    fn single_segment_path_has_no_parent() {
        assert_eq!(parent_module("a"), None);
    }

    #[test]
    fn file_path_to_module_name_uses_parent_dir_for_mod_mana() {
        assert_eq!(
            file_path_to_module_name(Path::new("/proj/src/util/mod.mana")),
            "util"
        );
        assert_eq!(
            file_path_to_module_name(Path::new("/proj/src/util/math.mana")),
            "math"
        );
    }

    #[test]
    fn sibling_import_candidates_come_first() {
        let config = LoaderConfig::new("/opt/mana/lib").with_search_path("/search");
        let from_file = Path::new("/project/src/main.mana");
        let candidates = candidate_paths("sibling", &config, Some(from_file));
        assert_eq!(candidates[0], PathBuf::from("/project/src/sibling.mana"));
        assert_eq!(
            candidates[1],
            PathBuf::from("/project/src/sibling/mod.mana")
        );
        // configured search path still present, just lower priority.
        assert!(candidates.contains(&PathBuf::from("/search/sibling.mana")));
    }

    #[test]
    fn std_prefixed_paths_probe_the_stdlib_root_first_among_roots() {
        let config = LoaderConfig::new("/opt/mana/lib");
        let candidates = candidate_paths("std::io", &config, None);
        assert_eq!(candidates[0], PathBuf::from("/opt/mana/lib/std/io.mana"));
        assert_eq!(
            candidates[1],
            PathBuf::from("/opt/mana/lib/std/io/mod.mana")
        );
    }

    #[test]
    fn normalize_path_canonicalizes_an_existing_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a.mana");
        fs::write(&file, "").expect("write file");
        let normalized = normalize_path(&file);
        assert!(normalized.is_absolute());
        assert_eq!(normalized, fs::canonicalize(&file).expect("canonicalize"));
    }

    #[test]
    fn normalize_path_falls_back_to_absolute_for_a_path_that_does_not_exist() {
        let normalized = normalize_path(Path::new("does/not/exist.mana"));
        assert!(normalized.is_absolute());
    }
}
