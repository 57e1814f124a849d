//! Project root discovery and external program checks

use crate::error::{ImportPickError, Result};
use std::path::{Path, PathBuf};

/// Walk upward from `start` and return the first directory holding any of
/// `markers`. Falls back to `start` when no ancestor matches.
pub fn find_project_root<S: AsRef<str>>(start: &Path, markers: &[S]) -> PathBuf {
    for dir in start.ancestors() {
        if markers.iter().any(|m| dir.join(m.as_ref()).exists()) {
            tracing::debug!("Project root: {:?}", dir);
            return dir.to_path_buf();
        }
    }
    tracing::debug!("No project marker above {:?}, using it as root", start);
    start.to_path_buf()
}

/// Directory to start root discovery from for `target`
pub fn start_dir(target: &Path) -> Result<PathBuf> {
    let absolute = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| ImportPickError::Io {
                source: e,
                context: "Failed to read current directory".to_string(),
            })?
            .join(target)
    };

    Ok(match absolute.parent() {
        Some(parent) if absolute.is_file() || !absolute.is_dir() => parent.to_path_buf(),
        _ => absolute,
    })
}

/// Fail with `MissingDependency` for the first program not on PATH
pub fn ensure_dependencies(programs: &[&str]) -> Result<()> {
    for program in programs {
        match which::which(program) {
            Ok(path) => tracing::debug!("Found {} at {:?}", program, path),
            Err(_) => {
                return Err(ImportPickError::MissingDependency {
                    program: program.to_string(),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_finds_nearest_marker() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("app");
        let nested = root.join("src").join("components");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("package.json"), "{}").unwrap();

        assert_eq!(find_project_root(&nested, &["package.json"]), root);
    }

    #[test]
    fn test_falls_back_to_start() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            find_project_root(&nested, &["importpick-marker-that-does-not-exist"]),
            nested
        );
    }

    #[test]
    fn test_start_dir_of_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("index.ts");
        std::fs::write(&file, "").unwrap();

        assert_eq!(start_dir(&file).unwrap(), temp_dir.path());
        assert_eq!(start_dir(temp_dir.path()).unwrap(), temp_dir.path());
    }

    #[test]
    fn test_missing_dependency() {
        let err = ensure_dependencies(&["importpick-no-such-program"]).unwrap_err();
        assert!(matches!(err, ImportPickError::MissingDependency { .. }));
        assert!(ensure_dependencies(&["sh"]).is_ok());
    }
}
