//! Splicing third-party declaration files into the emission.
//!
//! Packages listed under `typeroll.inline` get their declaration entry
//! point wrapped in a `declare module "<name>"` block shaped like the
//! compiler's own `--outFile` output, so the flattener absorbs them like
//! any other ambient module.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    types: Option<String>,
    #[serde(default)]
    typings: Option<String>,
}

/// Read a package's declaration entry point and wrap it as an ambient
/// module block.
pub async fn load_inline_module(project_dir: &Path, name: &str) -> Result<String> {
    let package_dir =
        resolve_package_dir(project_dir, name).ok_or_else(|| Error::PackageNotFound {
            name: name.to_string(),
        })?;

    let manifest_path = package_dir.join("package.json");
    let manifest_text =
        tokio::fs::read_to_string(&manifest_path)
            .await
            .map_err(|source| Error::Io {
                path: manifest_path,
                source,
            })?;
    let manifest: PackageManifest =
        serde_json::from_str(&manifest_text).map_err(|err| Error::PackageManifest {
            name: name.to_string(),
            message: err.to_string(),
        })?;

    // package.json spells it either way; `typings` is the older field and
    // wins when both are present.
    let Some(entry) = manifest.typings.or(manifest.types) else {
        return Err(Error::MissingTypes {
            name: name.to_string(),
        });
    };

    let entry_path = package_dir.join(entry);
    let content = tokio::fs::read_to_string(&entry_path)
        .await
        .map_err(|source| Error::Io {
            path: entry_path,
            source,
        })?;
    tracing::debug!("inlining {} from {}", name, package_dir.display());
    Ok(wrap_ambient_module(name, &content))
}

/// Locate `node_modules/<name>` by walking up from `from`, the way Node
/// resolution does.
fn resolve_package_dir(from: &Path, name: &str) -> Option<PathBuf> {
    from.ancestors()
        .map(|ancestor| ancestor.join("node_modules").join(name))
        .find(|candidate| candidate.join("package.json").is_file())
}

/// Indent `content` four spaces under a `declare module` header, matching
/// the compiler's emission shape.
fn wrap_ambient_module(name: &str, content: &str) -> String {
    let mut block = format!("declare module \"{name}\" {{");
    for line in content.split('\n') {
        block.push_str("\n    ");
        block.push_str(line);
    }
    block.push_str("\n}\n");
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn install_package(root: &Path, name: &str, manifest: &str, declarations: Option<&str>) {
        let package_dir = root.join("node_modules").join(name);
        fs::create_dir_all(&package_dir).unwrap();
        fs::write(package_dir.join("package.json"), manifest).unwrap();
        if let Some(text) = declarations {
            fs::write(package_dir.join("index.d.ts"), text).unwrap();
        }
    }

    #[tokio::test]
    async fn test_inline_wraps_declarations() {
        let dir = TempDir::new().unwrap();
        install_package(
            dir.path(),
            "cosmokit",
            r#"{ "types": "index.d.ts" }"#,
            Some("export type Dict<T = any> = { [key: string]: T };"),
        );

        let block = load_inline_module(dir.path(), "cosmokit").await.unwrap();
        assert_eq!(
            block,
            "declare module \"cosmokit\" {\n    export type Dict<T = any> = { [key: string]: T };\n}\n"
        );
    }

    #[tokio::test]
    async fn test_inline_prefers_typings_field() {
        let dir = TempDir::new().unwrap();
        install_package(
            dir.path(),
            "legacy",
            r#"{ "typings": "index.d.ts", "types": "missing.d.ts" }"#,
            Some("export const n: number;"),
        );

        let block = load_inline_module(dir.path(), "legacy").await.unwrap();
        assert!(block.contains("export const n: number;"));
    }

    #[tokio::test]
    async fn test_inline_resolves_through_ancestors() {
        let dir = TempDir::new().unwrap();
        install_package(
            dir.path(),
            "shared",
            r#"{ "types": "index.d.ts" }"#,
            Some("export {};"),
        );
        let nested = dir.path().join("packages").join("core");
        fs::create_dir_all(&nested).unwrap();

        assert!(load_inline_module(&nested, "shared").await.is_ok());
    }

    #[tokio::test]
    async fn test_inline_missing_package() {
        let dir = TempDir::new().unwrap();
        let err = load_inline_module(dir.path(), "ghost").await.unwrap_err();
        assert!(matches!(err, Error::PackageNotFound { .. }));
    }

    #[tokio::test]
    async fn test_inline_package_without_types() {
        let dir = TempDir::new().unwrap();
        install_package(dir.path(), "plain", r#"{ "main": "index.js" }"#, None);

        let err = load_inline_module(dir.path(), "plain").await.unwrap_err();
        assert!(matches!(err, Error::MissingTypes { .. }));
    }
}
