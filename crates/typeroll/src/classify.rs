//! Pass 1: line classification.
//!
//! One scan over the raw emitted text decides the fate of every line:
//! structural lines (module boundaries, imports, directives, export markers)
//! are routed to the prolog buckets, the import bindings, the namespace
//! alias map, or a platform capture buffer; body content passes through for
//! the later passes. The scan is an explicit state machine so that skip
//! regions (excluded bodies, dropped default exports, platform captures)
//! consume exactly the lines they own.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::imports::{ImportBindings, Prolog};
use crate::patterns;

/// Where the classifier currently is in the emitted text.
enum State {
    /// Between module blocks.
    TopLevel,
    /// Inside a surviving `declare module` body.
    InModule { name: String },
    /// Inside a platform-variant body being captured out of the bundle.
    InPlatformCapture {
        parent: String,
        tag: String,
        buffer: Vec<String>,
    },
    /// Inside an excluded module body; everything up to and including the
    /// closing boundary is dropped.
    InExcludedBody,
    /// Inside a skipped default-export body of a non-entry module.
    InDefaultExportSkip { module: String },
}

/// Everything pass 1 produces.
#[derive(Default)]
pub(crate) struct Classified {
    /// Surviving lines, still wrapped and indented.
    pub(crate) lines: Vec<String>,
    pub(crate) prolog: Prolog,
    pub(crate) bindings: ImportBindings,
    /// Internal module name to the identifier it was namespace-imported as.
    pub(crate) aliases: IndexMap<String, String>,
    /// Captured platform-variant bodies, keyed by parent path then platform
    /// tag. Nothing re-emits these; a variant selection policy would start
    /// from this map.
    pub(crate) platform_variants: IndexMap<String, IndexMap<String, Vec<String>>>,
}

/// Classify `source` line by line.
///
/// `recognized` is the full module-name set; import lines naming any
/// recognized module are wrapper plumbing and are dropped rather than
/// preserved. `exclude` holds the names whose blocks are dropped wholesale;
/// `entry` is the only module allowed to keep a default export.
pub(crate) fn classify(
    source: &str,
    recognized: &HashSet<String>,
    exclude: &HashSet<String>,
    entry: &str,
) -> Classified {
    let mut classified = Classified::default();
    let mut state = State::TopLevel;

    for line in source.lines() {
        state = match state {
            State::InDefaultExportSkip { module } => {
                if line == "    }" {
                    State::InModule { name: module }
                } else {
                    State::InDefaultExportSkip { module }
                }
            }
            State::InPlatformCapture { parent, tag, mut buffer } => {
                if line == "}" {
                    classified
                        .platform_variants
                        .entry(parent)
                        .or_default()
                        .insert(tag, buffer);
                    State::TopLevel
                } else {
                    buffer.push(line.to_string());
                    State::InPlatformCapture { parent, tag, buffer }
                }
            }
            State::InExcludedBody => {
                if line == "}" {
                    State::TopLevel
                } else {
                    State::InExcludedBody
                }
            }
            state @ (State::TopLevel | State::InModule { .. }) => {
                step(&mut classified, state, line, recognized, exclude, entry)
            }
        };
    }

    classified
}

/// Handle one line outside any skip region.
fn step(
    classified: &mut Classified,
    state: State,
    line: &str,
    recognized: &HashSet<String>,
    exclude: &HashSet<String>,
    entry: &str,
) -> State {
    if let Some(cap) = patterns::MODULE_BOUNDARY.captures(line) {
        let name = &cap[1];
        if cap.get(2).is_some() {
            // Inline-closed empty module, nothing to keep.
            return State::TopLevel;
        }
        if exclude.contains(name) {
            return State::InExcludedBody;
        }
        if let Some((parent, tag)) = platform_split(name) {
            return State::InPlatformCapture { parent, tag, buffer: Vec::new() };
        }
        classified.lines.push(line.to_string());
        return State::InModule { name: name.to_string() };
    }

    if let Some(cap) = patterns::BARE_IMPORT.captures(line) {
        if !recognized.contains(&cap[1]) {
            classified.prolog.push_bare(line.trim_start());
        }
        return state;
    }

    if let Some(cap) = patterns::NAMESPACE_IMPORT.captures(line) {
        let path = &cap[3];
        if recognized.contains(path) {
            classified.aliases.insert(path.to_string(), cap[2].to_string());
        } else {
            classified.prolog.push_namespace(line.trim_start());
        }
        return state;
    }

    if let Some(cap) = patterns::BINDING_IMPORT.captures(line) {
        let path = &cap[4];
        if !recognized.contains(path) {
            let default = cap.get(2).map(|m| m.as_str()).filter(|s| !s.is_empty());
            let named = cap.get(3).map(|m| m.as_str());
            classified.bindings.merge(path, default, named);
        }
        return state;
    }

    if line.starts_with("///") {
        classified.prolog.push_directive(line);
        return state;
    }

    if line.starts_with("#!") {
        return state;
    }

    if line.starts_with("    export default ") {
        if let State::InModule { name } = &state {
            if name == entry {
                classified.lines.push(line.to_string());
                return state;
            }
            if line.ends_with('{') {
                let module = name.clone();
                return State::InDefaultExportSkip { module };
            }
        }
        return state;
    }

    if line.trim() == "export {};" {
        return state;
    }

    if line == "}" {
        if let State::InModule { .. } = state {
            classified.lines.push(line.to_string());
            return State::TopLevel;
        }
    }

    classified.lines.push(line.to_string());
    state
}

/// Split a platform-variant module name into its parent path and tag.
fn platform_split(name: &str) -> Option<(String, String)> {
    let (parent, last) = name.rsplit_once('/')?;
    if last == "node" || last == "browser" {
        Some((parent.to_string(), last.to_string()))
    } else {
        None
    }
}
