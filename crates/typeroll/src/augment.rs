//! Pass 3: internal-marker resolution.
//!
//! A module body can augment another recognized module
//! (`module "<name>" { ... }` nested inside a wrapper). Flattening turns
//! that nested block into a top-level `declare module "<name>" {` line,
//! which is not a real wrapper but a marker around declarations grouped for
//! internal visibility. This pass removes the marker and its closing brace,
//! unindents the marked run, and exports block-opening declarations so the
//! grouped symbols stay referencable from the rest of the bundle.
//!
//! The pass runs on its own state; nothing carries over from flattening.

use crate::patterns::{self, ModulePatterns};

pub(crate) fn resolve_markers(lines: Vec<String>, module_patterns: &ModulePatterns) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut in_marker = false;

    for line in lines {
        if module_patterns.marker.is_match(&line) {
            in_marker = true;
        } else if line == "}" {
            if in_marker {
                in_marker = false;
            } else {
                out.push(line);
            }
        } else {
            let mut line = if in_marker {
                line.strip_prefix("    ").unwrap_or(&line).to_string()
            } else {
                line
            };
            if patterns::EXPORT_KEYWORD.is_match(&line) {
                line.insert_str(0, "export ");
            }
            if !line.is_empty() {
                out.push(line);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &[&str], names: &[&str]) -> Vec<String> {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        let module_patterns = ModulePatterns::new(&names, &names).unwrap();
        resolve_markers(input.iter().map(|s| s.to_string()).collect(), &module_patterns)
    }

    #[test]
    fn test_marker_block_promoted_and_exported() {
        let out = run(
            &[
                "export function main(): void;",
                "declare module \"index\" {",
                "    interface Config {",
                "        debug?: boolean;",
                "    }",
                "    class Registry {",
                "    }",
                "}",
                "export const VERSION: string;",
            ],
            &["index"],
        );
        assert_eq!(
            out,
            vec![
                "export function main(): void;",
                "export interface Config {",
                "    debug?: boolean;",
                "}",
                "export class Registry {",
                "}",
                "export const VERSION: string;",
            ]
        );
    }

    #[test]
    fn test_unrecognized_module_left_as_written() {
        let out = run(
            &[
                "declare module \"express\" {",
                "    interface Request {",
                "    }",
                "}",
            ],
            &["index"],
        );
        assert_eq!(
            out,
            vec![
                "declare module \"express\" {",
                "    interface Request {",
                "    }",
                "}",
            ]
        );
    }

    #[test]
    fn test_abstract_class_exported_outside_marker() {
        let out = run(&["abstract class Base {", "}"], &["index"]);
        assert_eq!(out, vec!["export abstract class Base {", "}"]);
    }

    #[test]
    fn test_closing_brace_outside_marker_kept() {
        let out = run(&["declare namespace dom {", "}"], &["index"]);
        assert_eq!(out, vec!["declare namespace dom {", "}"]);
    }
}
