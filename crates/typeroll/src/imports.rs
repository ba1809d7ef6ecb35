//! External import collection and consolidation.
//!
//! Import lines inside module bodies never survive flattening in place.
//! Bindings from external modules are merged here across every block and
//! re-emitted as one `import` statement per module at the top of the bundle;
//! directives and the import forms that are preserved verbatim accumulate in
//! [`Prolog`] buckets.

use indexmap::IndexMap;

/// Bindings collected for one external module.
#[derive(Debug, Default)]
struct Binding {
    /// Local name of the default import, first sighting wins.
    default_alias: Option<String>,
    /// Exported name to local name, in first-sight order.
    named: IndexMap<String, String>,
}

/// Merged import bindings per external module, in first-sight order.
#[derive(Debug, Default)]
pub(crate) struct ImportBindings {
    modules: IndexMap<String, Binding>,
}

impl ImportBindings {
    /// Merge one import line's bindings for `module`.
    ///
    /// `named` is the raw text between the braces; entries may carry a
    /// `type ` qualifier and an `as` alias. A later default alias that
    /// conflicts with an earlier one is ignored.
    pub(crate) fn merge(&mut self, module: &str, default: Option<&str>, named: Option<&str>) {
        let binding = self.modules.entry(module.to_string()).or_default();
        if let Some(alias) = default {
            match &binding.default_alias {
                Some(existing) if existing != alias => {
                    tracing::debug!(
                        "conflicting default aliases for '{}': keeping '{}', ignoring '{}'",
                        module,
                        existing,
                        alias
                    );
                }
                Some(_) => {}
                None => binding.default_alias = Some(alias.to_string()),
            }
        }
        let Some(named) = named else { return };
        for part in named.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let part = part.strip_prefix("type ").unwrap_or(part);
            if let Some((exported, local)) = part.split_once(" as ") {
                binding
                    .named
                    .insert(exported.trim_end().to_string(), local.trim_start().to_string());
            } else {
                binding.named.insert(part.to_string(), part.to_string());
            }
        }
    }

    /// Number of external modules with at least one collected binding line.
    pub(crate) fn len(&self) -> usize {
        self.modules.len()
    }

    fn render(&self, out: &mut String) {
        for (module, binding) in &self.modules {
            let mut parts: Vec<String> = Vec::new();
            if let Some(alias) = &binding.default_alias {
                parts.push(alias.clone());
            }
            if !binding.named.is_empty() {
                let inner = binding
                    .named
                    .iter()
                    .map(|(exported, local)| {
                        if exported == local {
                            exported.clone()
                        } else {
                            format!("{exported} as {local}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                parts.push(format!("{{ {inner} }}"));
            }
            // An import with no surviving bindings has nothing to state.
            if parts.is_empty() {
                continue;
            }
            out.push_str("import ");
            out.push_str(&parts.join(", "));
            out.push_str(&format!(" from '{module}';\n"));
        }
    }
}

/// Preserved top-of-bundle material, rendered before the flattened body.
///
/// Order is fixed: reference directives, side-effect imports, namespace
/// imports, then the consolidated import statements. Every bucket keeps
/// first-sight order and drops exact duplicates.
#[derive(Debug, Default)]
pub(crate) struct Prolog {
    directives: Vec<String>,
    bare: Vec<String>,
    namespaces: Vec<String>,
}

impl Prolog {
    pub(crate) fn push_directive(&mut self, line: &str) {
        push_unique(&mut self.directives, line);
    }

    pub(crate) fn push_bare(&mut self, line: &str) {
        push_unique(&mut self.bare, line);
    }

    pub(crate) fn push_namespace(&mut self, line: &str) {
        push_unique(&mut self.namespaces, line);
    }

    pub(crate) fn render(&self, bindings: &ImportBindings) -> String {
        let mut out = String::new();
        for line in self.directives.iter().chain(&self.bare).chain(&self.namespaces) {
            out.push_str(line);
            out.push('\n');
        }
        bindings.render(&mut out);
        out
    }
}

fn push_unique(bucket: &mut Vec<String>, line: &str) {
    if !bucket.iter().any(|existing| existing == line) {
        bucket.push(line.to_string());
    }
}
