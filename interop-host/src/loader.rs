//! Shared library discovery
//!
//! Resolves the platform file name of the native library and searches an
//! ordered list of candidate locations, the first existing file winning.

use crate::error::{BoundaryError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Crate name of the native library, without platform prefix or suffix
pub const LIBRARY_STEM: &str = "interop_native";

/// Platform file name: `libinterop_native.so`, `libinterop_native.dylib`
/// or `interop_native.dll`
pub fn platform_library_name() -> String {
    format!(
        "{}{}{}",
        env::consts::DLL_PREFIX,
        LIBRARY_STEM,
        env::consts::DLL_SUFFIX
    )
}

/// Candidate locations for `file_name`, most specific first, without
/// duplicates
pub fn search_paths(file_name: &str) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    // Next to the executable; cargo places the cdylib there
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir.clone());
        if let Some(profile_dir) = exe_dir.parent() {
            // Test binaries live one level down, in target/<profile>/deps
            dirs.push(profile_dir.to_path_buf());
        }
    }

    if let Ok(cwd) = env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join("dist"));
        dirs.push(cwd.join("target").join("release"));
        dirs.push(cwd.join("target").join("debug"));
    }

    if cfg!(target_os = "linux") {
        dirs.push(PathBuf::from("/usr/local/lib"));
        dirs.push(PathBuf::from("/usr/lib"));
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/usr/local/lib"));
        dirs.push(PathBuf::from("/opt/homebrew/lib"));
    }

    let mut paths: Vec<PathBuf> = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let candidate = dir.join(file_name);
        if !paths.contains(&candidate) {
            paths.push(candidate);
        }
    }
    paths
}

/// First existing file among `candidates`
pub fn find_in(candidates: &[PathBuf]) -> Option<&Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|path| path.is_file())
}

/// Locate the native library in the default search paths
pub fn find_library() -> Result<PathBuf> {
    let name = platform_library_name();
    let searched = search_paths(&name);

    match find_in(&searched) {
        Some(path) => {
            log::info!("Found {} at: {:?}", name, path);
            Ok(path.to_path_buf())
        }
        None => {
            for path in &searched {
                log::debug!("Not found: {:?}", path);
            }
            Err(BoundaryError::LibraryNotFound { name, searched })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_platform_library_name() {
        let name = platform_library_name();
        assert!(name.contains(LIBRARY_STEM));
        if cfg!(target_os = "linux") {
            assert_eq!(name, "libinterop_native.so");
        } else if cfg!(target_os = "windows") {
            assert_eq!(name, "interop_native.dll");
        } else if cfg!(target_os = "macos") {
            assert_eq!(name, "libinterop_native.dylib");
        }
    }

    #[test]
    fn test_search_paths_are_unique_and_named() {
        let paths = search_paths("libexample.so");
        assert!(!paths.is_empty());
        for (i, path) in paths.iter().enumerate() {
            assert!(path.ends_with("libexample.so"));
            assert!(!paths[i + 1..].contains(path), "duplicate: {:?}", path);
        }
    }

    #[test]
    fn test_find_in_prefers_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing").join("lib.so");
        let first = dir.path().join("first.so");
        let second = dir.path().join("second.so");
        fs::write(&first, b"").unwrap();
        fs::write(&second, b"").unwrap();

        let candidates = vec![missing, first.clone(), second];
        assert_eq!(find_in(&candidates), Some(first.as_path()));
    }

    #[test]
    fn test_find_in_nothing_exists() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![dir.path().join("a.so"), dir.path().to_path_buf()];
        // A directory is not a library
        assert_eq!(find_in(&candidates), None);
    }
}
