//! Module name discovery under a project's root directory.

use std::path::Path;

use walkdir::WalkDir;

use crate::{Error, Result};

/// Collect the ambient module name of every TypeScript source under `root`.
///
/// A file `src/utils/string.ts` compiled with `--outFile` shows up in the
/// emission as `declare module "utils/string"`, so names are source paths
/// relative to `root` with the `.ts` suffix dropped and `/` separators on
/// every platform. Entries come back sorted for deterministic output.
pub fn discover(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| Error::Io {
            path: root.to_path_buf(),
            source: err.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if !file_name.ends_with(".ts") {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let mut name = String::new();
        for component in relative.components() {
            if !name.is_empty() {
                name.push('/');
            }
            name.push_str(&component.as_os_str().to_string_lossy());
        }
        if let Some(name) = name.strip_suffix(".ts") {
            names.push(name.to_string());
        }
    }
    tracing::debug!("discovered {} modules under {}", names.len(), root.display());
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_discover_nested() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.ts");
        touch(dir.path(), "utils/string.ts");
        touch(dir.path(), "utils/shape/rect.ts");

        let names = discover(dir.path()).unwrap();
        assert_eq!(names, ["index", "utils/shape/rect", "utils/string"]);
    }

    #[test]
    fn test_discover_skips_other_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.ts");
        touch(dir.path(), "readme.md");
        touch(dir.path(), "data.json");

        let names = discover(dir.path()).unwrap();
        assert_eq!(names, ["index"]);
    }

    #[test]
    fn test_discover_is_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "zeta.ts");
        touch(dir.path(), "alpha.ts");
        touch(dir.path(), "mid/omega.ts");

        let names = discover(dir.path()).unwrap();
        assert_eq!(names, ["alpha", "mid/omega", "zeta"]);
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = TempDir::new().unwrap();
        assert!(discover(&dir.path().join("missing")).is_err());
    }
}
