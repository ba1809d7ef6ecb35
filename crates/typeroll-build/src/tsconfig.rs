//! Loading and merging of `tsconfig.json` files.
//!
//! tsconfig files are JSONC, with comments and trailing commas, so they go
//! through [`json5`] rather than strict JSON. `extends` chains resolve the
//! way `tsc` resolves them: relative and absolute specifiers against the
//! extending file's directory, bare specifiers against the `node_modules`
//! of that directory's ancestors.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tsconfig not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("cycle in tsconfig extends chain at {0}")]
    ExtendsCycle(PathBuf),

    #[error("cannot resolve tsconfig extends '{specifier}' from {from}")]
    ExtendsNotFound { specifier: String, from: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The subset of a tsconfig file the build pipeline reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    pub compiler_options: CompilerOptions,
    /// The `typeroll` section, this tool's own configuration key.
    #[serde(default)]
    pub typeroll: Option<BundleConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default)]
    pub out_file: Option<PathBuf>,
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
}

/// Bundling options under the `typeroll` key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleConfig {
    /// Third-party packages whose declarations get spliced into the bundle.
    #[serde(default)]
    pub inline: Vec<String>,
    /// Module names flattened out of the final output.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Locate the tsconfig for a project path naming either the file itself or
/// a directory containing `tsconfig.json`.
pub fn resolve_project(project: &Path) -> Result<PathBuf> {
    let candidate = if project.is_dir() {
        project.join("tsconfig.json")
    } else {
        project.to_path_buf()
    };
    candidate
        .canonicalize()
        .map_err(|_| ConfigError::NotFound(candidate))
}

/// Load a tsconfig and fold its `extends` chain into one config.
pub fn load(path: &Path) -> Result<TsConfig> {
    let mut visited = HashSet::new();
    load_chained(path, &mut visited)
}

fn load_chained(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<TsConfig> {
    let canonical = path
        .canonicalize()
        .map_err(|_| ConfigError::NotFound(path.to_path_buf()))?;
    if !visited.insert(canonical.clone()) {
        return Err(ConfigError::ExtendsCycle(canonical));
    }

    let text = fs::read_to_string(&canonical).map_err(|source| ConfigError::Io {
        path: canonical.clone(),
        source,
    })?;
    let mut config: TsConfig = json5::from_str(&text).map_err(|err| ConfigError::Parse {
        path: canonical.clone(),
        message: err.to_string(),
    })?;

    let Some(extends) = config.extends.take() else {
        return Ok(config);
    };
    let config_dir = canonical.parent().unwrap_or(Path::new("/"));
    let base_path = resolve_extends(config_dir, &extends)?;
    tracing::debug!("tsconfig {} extends {}", canonical.display(), base_path.display());
    let base = load_chained(&base_path, visited)?;
    Ok(merge(base, config))
}

fn resolve_extends(config_dir: &Path, extends: &str) -> Result<PathBuf> {
    let not_found = || ConfigError::ExtendsNotFound {
        specifier: extends.to_string(),
        from: config_dir.to_path_buf(),
    };

    if extends.starts_with('.') || Path::new(extends).is_absolute() {
        return resolve_extends_file(&config_dir.join(extends)).ok_or_else(not_found);
    }

    for ancestor in config_dir.ancestors() {
        let candidate = ancestor.join("node_modules").join(extends);
        if let Some(resolved) = resolve_extends_file(&candidate) {
            return Ok(resolved);
        }
    }
    Err(not_found())
}

fn resolve_extends_file(candidate: &Path) -> Option<PathBuf> {
    let mut attempts = vec![candidate.to_path_buf()];
    if candidate.extension().is_none() {
        attempts.push(candidate.with_extension("json"));
    }
    if candidate.is_dir() {
        attempts.push(candidate.join("tsconfig.json"));
    }
    attempts.into_iter().find(|attempt| attempt.is_file())
}

/// Later entries in an extends chain win field by field, matching `tsc`.
fn merge(base: TsConfig, overlay: TsConfig) -> TsConfig {
    TsConfig {
        extends: None,
        compiler_options: CompilerOptions {
            out_file: overlay
                .compiler_options
                .out_file
                .or(base.compiler_options.out_file),
            root_dir: overlay
                .compiler_options
                .root_dir
                .or(base.compiler_options.root_dir),
        },
        typeroll: overlay.typeroll.or(base.typeroll),
    }
}
