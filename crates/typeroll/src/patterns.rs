//! Structural patterns for `tsc --outFile` declaration emission.
//!
//! The emitted text is rigidly shaped: one `declare module "<name>" {`
//! wrapper per compiled unit, bodies indented four spaces, imports and
//! re-exports in fixed single-line forms. The shapes that do not depend on
//! the module-name set live here as statics; the name-dependent patterns are
//! compiled per bundle invocation from an escaped alternation of the
//! recognized names.

use std::sync::LazyLock;

use regex::Regex;

/// `declare module "<name>" {`, optionally closed inline (`{ }` or `{}`).
///
/// Group 1 is the module name, group 2 is present when the block is empty
/// and closed on the same line.
pub(crate) static MODULE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^declare module ["'](.+)["'] \{( ?\})?$"#).expect("valid pattern")
});

/// Side-effect import of a quoted path: `    import "<path>";`
pub(crate) static BARE_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^ {4}import ["'](.+)["'];$"#).expect("valid pattern"));

/// Namespace import: `    import [type] * as X from "<path>";`
pub(crate) static NAMESPACE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^ {4}import (type )?\* as (.+) from ["'](.+)["'];$"#).expect("valid pattern")
});

/// Default and/or named import: `    import [type] [D][, ]{ a, b as c } from "<path>";`
///
/// Group 2 (the default alias) matches empty for a purely named import, so
/// callers must treat an empty capture as absent.
pub(crate) static BINDING_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^ {4}import (type )?(\S*)(?:, *)?(?:\{(.*)\})? from ["'](.+)["'];$"#)
        .expect("valid pattern")
});

/// Keywords that need a `declare ` prefix once their wrapper is gone.
pub(crate) static DECLARE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(module|class|namespace|const|global|function|interface) ")
        .expect("valid pattern")
});

/// Block-opening declarations that need an `export ` prefix when promoted
/// out of an internal-marker block.
pub(crate) static EXPORT_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(abstract|class|namespace|interface) .+ \{$").expect("valid pattern")
});

/// Residual type-level reference to a relative path, e.g. `import("./x")`.
/// A flattened bundle has no files left for these to resolve against.
pub(crate) static RELATIVE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\(["'](\.\.?/[^"']*)["']\)"#).expect("valid pattern")
});

/// Patterns built from the recognized module names.
///
/// Each alternation covers a name set, in either quote style, with an
/// optional `.js`/`.ts` extension left over from source-relative
/// specifiers. Re-exports and markers match any recognized name; reference
/// rewriting skips excluded names so their qualifications survive verbatim.
pub(crate) struct ModulePatterns {
    /// `import("<name>").` qualification prefix on a cross-module reference.
    pub(crate) import_ref: Regex,
    /// `    export ... from "<name>";` re-export of another recognized module.
    pub(crate) re_export: Regex,
    /// `declare module "<name>" {` marker surfaced by a nested augmentation.
    pub(crate) marker: Regex,
}

impl ModulePatterns {
    /// `recognized` is the full module-name set; `rewrite` is the subset
    /// whose cross-references get rewritten (recognized minus excluded).
    pub(crate) fn new(recognized: &[String], rewrite: &[String]) -> Result<Self, regex::Error> {
        let recognized_ref = module_ref(recognized);
        Ok(ModulePatterns {
            import_ref: Regex::new(&format!(r"import\({}\)\.", module_ref(rewrite)))?,
            re_export: Regex::new(&format!("^ {{4}}export .+ from {recognized_ref};$"))?,
            marker: Regex::new(&format!(r"^declare module {recognized_ref} \{{$"))?,
        })
    }
}

fn module_ref(names: &[String]) -> String {
    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    format!(r#"["']({alternation})(\.[jt]s)?["']"#)
}
