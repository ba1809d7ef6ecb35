//! # typeroll
//!
//! Flattens the ambient declaration output of `tsc --outFile` into a single
//! publishable `.d.ts`.
//!
//! The compiler emits one `declare module "<name>" { ... }` wrapper per
//! compiled unit, with the body indented four spaces. Given the list of
//! recognized module names and that emitted text, [`bundle`] dissolves the
//! wrappers, rewrites cross-module type references into direct ones,
//! consolidates external imports into one statement per module, and keeps a
//! default export only for the entry module.
//!
//! The transformation is pure text to text: no filesystem access, no
//! process spawning, no state shared between invocations. Driving the
//! compiler and discovering module names is the `typeroll-build` crate's
//! job.
//!
//! ## Quick Start
//!
//! ```
//! let source = concat!(
//!     "declare module \"utils\" {\n",
//!     "    export function half(n: number): number;\n",
//!     "}\n",
//!     "declare module \"index\" {\n",
//!     "    export * from \"utils\";\n",
//!     "}\n",
//! );
//!
//! let bundle = typeroll::bundle(["utils", "index"], source)?;
//! assert_eq!(bundle, "export function half(n: number): number;\n");
//! # Ok::<(), typeroll::Error>(())
//! ```
//!
//! Excluded modules, a different entry module, and strict checking go
//! through [`BundleOptions`]:
//!
//! ```
//! use typeroll::BundleOptions;
//!
//! let source = "declare module \"main\" {\n    export function run(): void;\n}\n";
//! let bundle = BundleOptions::new(["main"])
//!     .entry("main")
//!     .strict(true)
//!     .bundle(source)?;
//! assert_eq!(bundle, "export function run(): void;\n");
//! # Ok::<(), typeroll::Error>(())
//! ```

mod augment;
mod classify;
mod flatten;
mod imports;
mod patterns;

use std::collections::HashSet;

use patterns::ModulePatterns;

/// Error types for bundling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Strict mode found type-level references no flattened bundle can
    /// satisfy.
    #[error("unresolved internal references: {}", .paths.join(", "))]
    UnresolvedReferences { paths: Vec<String> },

    /// The module-name patterns failed to compile.
    #[error("failed to compile module name patterns: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type alias for bundling.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::UnresolvedReferences { .. } => "UNRESOLVED_REFERENCES",
            Error::Pattern(_) => "PATTERN_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::UnresolvedReferences { .. } => Some(Box::new(
                "Relative imports cannot resolve inside a flattened bundle.\n\
                 Add the referenced files to the module list, or exclude the module that references them.",
            )),
            Error::Pattern(_) => Some(Box::new(
                "This usually means the module list is pathologically large. Try excluding modules.",
            )),
        }
    }
}

/// Options for one bundle invocation.
///
/// # Examples
///
/// ```
/// use typeroll::BundleOptions;
///
/// let options = BundleOptions::new(["utils", "utils/node", "index"])
///     .exclude(["utils/node"])
///     .strict(false);
/// # let _ = options;
/// ```
#[derive(Debug, Clone)]
pub struct BundleOptions {
    files: Vec<String>,
    exclude: Vec<String>,
    entry: String,
    strict: bool,
}

impl BundleOptions {
    /// Create options for the given recognized module names.
    ///
    /// Names are `/`-separated paths without extension, in emission order.
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BundleOptions {
            files: files.into_iter().map(Into::into).collect(),
            exclude: Vec::new(),
            entry: "index".to_string(),
            strict: false,
        }
    }

    /// Drop these modules from the output entirely.
    ///
    /// An excluded module keeps no block, and import lines naming it still
    /// vanish like any recognized module's. Type-level
    /// `import("<name>").` references to it are left as written instead of
    /// being rewritten to direct references.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    /// Name of the entry module (default `index`).
    ///
    /// Only the entry module may keep a default export, and its
    /// self-references are rewritten to `import('.')`.
    pub fn entry(mut self, name: impl Into<String>) -> Self {
        self.entry = name.into();
        self
    }

    /// Fail instead of passing through relative type-level references that
    /// cannot resolve after flattening (default off).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Bundle `source`, the concatenated wrapper blocks emitted by the
    /// compiler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedReferences`] in strict mode when relative
    /// references survive flattening, and [`Error::Pattern`] when the
    /// module-name patterns cannot be compiled.
    pub fn bundle(&self, source: &str) -> Result<String> {
        let exclude: HashSet<String> = self.exclude.iter().cloned().collect();
        let recognized: HashSet<String> = self.files.iter().cloned().collect();
        // Excluded names stay recognized for structural purposes, but their
        // cross-references are left alone rather than rewritten.
        let rewrite: Vec<String> = self
            .files
            .iter()
            .filter(|name| !exclude.contains(name.as_str()))
            .cloned()
            .collect();
        let module_patterns = ModulePatterns::new(&self.files, &rewrite)?;

        let classified = classify::classify(source, &recognized, &exclude, &self.entry);
        tracing::debug!(
            "classified: {} surviving lines, {} namespace aliases, {} external import modules, {} platform groups dropped",
            classified.lines.len(),
            classified.aliases.len(),
            classified.bindings.len(),
            classified.platform_variants.len()
        );

        let body = flatten::flatten(
            classified.lines,
            &classified.aliases,
            &module_patterns,
            &self.entry,
        );
        let body = augment::resolve_markers(body, &module_patterns);

        let residual = residual_relative_refs(&body);
        if !residual.is_empty() {
            if self.strict {
                return Err(Error::UnresolvedReferences { paths: residual });
            }
            tracing::debug!(
                "passing through {} unresolved relative reference(s): {}",
                residual.len(),
                residual.join(", ")
            );
        }

        let prolog = classified.prolog.render(&classified.bindings);
        Ok(format!("{prolog}{}\n", body.join("\n")))
    }
}

/// Bundle with default options: no exclusions, entry module `index`,
/// permissive mode.
///
/// # Arguments
///
/// * `files` - The recognized module names, in emission order
/// * `source` - The concatenated `declare module` blocks to flatten
///
/// # Errors
///
/// Only [`Error::Pattern`], when the module-name patterns cannot be
/// compiled.
pub fn bundle<I, S>(files: I, source: &str) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    BundleOptions::new(files).bundle(source)
}

fn residual_relative_refs(lines: &[String]) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for line in lines {
        for cap in patterns::RELATIVE_REF.captures_iter(line) {
            let path = cap[1].to_string();
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}
