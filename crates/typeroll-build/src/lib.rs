//! Project-level build pipeline: load the tsconfig, run `tsc`, flatten the
//! `--outFile` declaration emission with [`typeroll`], write the bundle.
//!
//! The pipeline mirrors what the compiler itself would do, with one extra
//! step at the end:
//!
//! 1. resolve and load `tsconfig.json`, folding `extends` chains
//! 2. discover ambient module names under `compilerOptions.rootDir`
//! 3. run `tsc` against a temporary `--outFile` and capture the emission
//! 4. splice in declarations of packages listed under `typeroll.inline`
//! 5. flatten everything into one `.d.ts` at the destination
//!
//! Steps 2 and 3 run concurrently; discovery is pure filesystem work while
//! the compiler does its thing.
//!
//! ```no_run
//! # async fn demo() -> Result<(), typeroll_build::Error> {
//! use typeroll_build::BuildOptions;
//!
//! let report = BuildOptions::new("path/to/project").build().await?;
//! if let Some(destination) = report.destination {
//!     println!("bundled {} modules into {}", report.module_count, destination.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod inline;
pub mod modules;
pub mod tsconfig;

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error as ThisError;

pub use crate::tsconfig::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("tsc exited with status {code}")]
    CompilerFailed { code: i32 },

    #[error("failed to launch tsc: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    #[error("compilerOptions.outFile is set but compilerOptions.rootDir is not")]
    MissingRootDir,

    #[error("inline package not found: {name}")]
    PackageNotFound { name: String },

    #[error("invalid package.json for inline package {name}: {message}")]
    PackageManifest { name: String, message: String },

    #[error("inline package {name} has no types or typings entry")]
    MissingTypes { name: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Bundle(#[from] typeroll::Error),
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            Error::Bundle(inner) => inner.code(),
            other => Some(Box::new(match other {
                Error::Config(_) => "CONFIG_ERROR",
                Error::CompilerFailed { .. } => "COMPILER_FAILED",
                Error::Spawn { .. } => "COMPILER_SPAWN",
                Error::MissingRootDir => "MISSING_ROOT_DIR",
                Error::PackageNotFound { .. } => "PACKAGE_NOT_FOUND",
                Error::PackageManifest { .. } => "PACKAGE_MANIFEST",
                Error::MissingTypes { .. } => "MISSING_TYPES",
                Error::Io { .. } => "IO_ERROR",
                Error::Join(_) => "TASK_FAILED",
                Error::Bundle(_) => unreachable!(),
            })),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            Error::Spawn { .. } => Some(Box::new(
                "tsc was not found on PATH. Install it with `npm install -g typescript` \
                 or add typescript to the project's devDependencies.",
            )),
            Error::MissingRootDir => Some(Box::new(
                "Module names are derived from source paths relative to rootDir. \
                 Set compilerOptions.rootDir (usually \"src\") in the tsconfig.",
            )),
            Error::MissingTypes { .. } => Some(Box::new(
                "Inlined packages must point at their declarations through the \
                 types or typings field of package.json.",
            )),
            Error::Bundle(inner) => inner.help(),
            _ => None,
        }
    }
}

/// What a build produced.
#[derive(Debug)]
pub struct BuildReport {
    /// Where the bundle landed. `None` when the project has no `outFile`
    /// and compilation ran as plain `tsc`.
    pub destination: Option<PathBuf>,
    /// Ambient modules recognized in the emission, inlined packages included.
    pub module_count: usize,
}

/// Options for a single build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    project: PathBuf,
    outfile: Option<PathBuf>,
    strict: bool,
    compiler_args: Vec<String>,
}

impl BuildOptions {
    /// `project` names either a tsconfig file or a directory containing
    /// `tsconfig.json`.
    pub fn new(project: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            outfile: None,
            strict: false,
            compiler_args: Vec::new(),
        }
    }

    /// Write the bundle here instead of `compilerOptions.outFile`.
    pub fn outfile(mut self, outfile: impl Into<PathBuf>) -> Self {
        self.outfile = Some(outfile.into());
        self
    }

    /// Fail the build when the bundle still references unrecognized
    /// relative paths.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Extra arguments handed through to `tsc`.
    pub fn compiler_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compiler_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub async fn build(&self) -> Result<BuildReport> {
        build(self).await
    }
}

/// Run the whole pipeline for one project.
pub async fn build(options: &BuildOptions) -> Result<BuildReport> {
    let tsconfig_path = tsconfig::resolve_project(&options.project)?;
    let project_dir = tsconfig_path
        .parent()
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let config = tsconfig::load(&tsconfig_path)?;

    // Without outFile there is no emission to flatten; hand the project to
    // tsc untouched.
    let Some(config_out_file) = config.compiler_options.out_file.clone() else {
        tracing::debug!("no compilerOptions.outFile, running plain tsc");
        compiler::compile(&project_dir, &tsconfig_path, &options.compiler_args).await?;
        return Ok(BuildReport {
            destination: None,
            module_count: 0,
        });
    };
    let Some(root_dir) = config.compiler_options.root_dir.clone() else {
        return Err(Error::MissingRootDir);
    };

    let dest = normalize_destination(
        project_dir.join(options.outfile.as_ref().unwrap_or(&config_out_file)),
    );

    let source_root = project_dir.join(root_dir);
    let (mut module_names, mut source) = tokio::try_join!(
        async {
            let root = source_root.clone();
            tokio::task::spawn_blocking(move || modules::discover(&root)).await?
        },
        compiler::emit_declarations(&project_dir, &tsconfig_path, &dest, &options.compiler_args),
    )?;

    let bundle_config = config.typeroll.clone().unwrap_or_default();
    for name in &bundle_config.inline {
        let block = inline::load_inline_module(&project_dir, name).await?;
        source.push_str(&block);
        module_names.push(name.clone());
    }

    let output = typeroll::BundleOptions::new(module_names.iter().cloned())
        .exclude(bundle_config.exclude.iter().cloned())
        .strict(options.strict)
        .bundle(&source)?;

    tokio::fs::write(&dest, &output)
        .await
        .map_err(|source| Error::Io {
            path: dest.clone(),
            source,
        })?;
    tracing::debug!(
        "wrote {} ({} modules flattened)",
        dest.display(),
        module_names.len()
    );
    Ok(BuildReport {
        destination: Some(dest),
        module_count: module_names.len(),
    })
}

/// `outFile` in composite projects commonly names the `.js` artifact; the
/// declaration bundle always lands at the `.d.ts` sibling.
fn normalize_destination(path: PathBuf) -> PathBuf {
    let rendered = path.to_string_lossy();
    if rendered.ends_with(".d.ts") {
        return path;
    }
    if let Some(stem) = rendered.strip_suffix(".js") {
        return PathBuf::from(format!("{stem}.d.ts"));
    }
    PathBuf::from(format!("{rendered}.d.ts"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_destination() {
        assert_eq!(
            normalize_destination(PathBuf::from("lib/index.d.ts")),
            Path::new("lib/index.d.ts")
        );
        assert_eq!(
            normalize_destination(PathBuf::from("lib/index.js")),
            Path::new("lib/index.d.ts")
        );
        assert_eq!(
            normalize_destination(PathBuf::from("lib/index")),
            Path::new("lib/index.d.ts")
        );
    }

    #[tokio::test]
    async fn test_build_missing_project() {
        let err = BuildOptions::new("does/not/exist").build().await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_build_requires_root_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tsconfig.json"),
            r#"{ "compilerOptions": { "outFile": "lib/index.d.ts" } }"#,
        )
        .unwrap();

        let err = BuildOptions::new(dir.path()).build().await.unwrap_err();
        assert!(matches!(err, Error::MissingRootDir));
    }
}
