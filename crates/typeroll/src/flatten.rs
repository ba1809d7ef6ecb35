//! Pass 2: module wrapper flattening.
//!
//! Surviving `declare module` wrappers dissolve here. A block another module
//! imported as a namespace keeps its braces and becomes
//! `declare namespace <alias> {`; every other block loses its boundary lines
//! and one level of body indentation. Body lines also lose their
//! `import("<name>").` qualification on cross-module references, have the
//! entry module's self-reference rewritten to `import('.')`, and gain a
//! `declare ` prefix on keywords that require one at the top level.

use indexmap::IndexMap;

use crate::patterns::{self, ModulePatterns};

/// The block currently being flattened.
enum Block {
    /// Between blocks.
    None,
    /// A block whose boundaries vanish and whose body is unindented.
    Plain,
    /// A namespace-aliased block; boundaries stay, indentation stays.
    Aliased,
}

pub(crate) fn flatten(
    lines: Vec<String>,
    aliases: &IndexMap<String, String>,
    module_patterns: &ModulePatterns,
    entry: &str,
) -> Vec<String> {
    let self_reference = format!("import(\"{entry}\")");
    let mut out = Vec::with_capacity(lines.len());
    let mut block = Block::None;

    for line in lines {
        if let Some(cap) = patterns::MODULE_BOUNDARY.captures(&line) {
            block = match aliases.get(&cap[1]) {
                Some(alias) => {
                    out.push(format!("declare namespace {alias} {{"));
                    Block::Aliased
                }
                None => Block::Plain,
            };
        } else if line == "}" {
            if matches!(block, Block::Aliased) {
                out.push(line);
            }
            block = Block::None;
        } else if module_patterns.re_export.is_match(&line) {
            // Re-exports of other recognized modules are redundant once
            // everything lives at the top level.
        } else {
            let flattened = flatten_body_line(
                &line,
                matches!(block, Block::Aliased),
                module_patterns,
                &self_reference,
            );
            if !flattened.is_empty() {
                out.push(flattened);
            }
        }
    }

    out
}

fn flatten_body_line(
    line: &str,
    aliased: bool,
    module_patterns: &ModulePatterns,
    self_reference: &str,
) -> String {
    let line = if aliased {
        line
    } else {
        line.strip_prefix("    ").unwrap_or(line)
    };
    let line = module_patterns.import_ref.replace_all(line, "");
    let mut line = line.replace(self_reference, "import('.')");
    if patterns::DECLARE_KEYWORD.is_match(&line) {
        line.insert_str(0, "declare ");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run(input: &[&str], aliases: &[(&str, &str)], names: &[&str]) -> Vec<String> {
        let aliases: IndexMap<String, String> = aliases
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        let module_patterns = ModulePatterns::new(&names, &names).unwrap();
        flatten(lines(input), &aliases, &module_patterns, "index")
    }

    #[test]
    fn test_plain_block_dissolves() {
        let out = run(
            &[
                "declare module \"utils\" {",
                "    export function half(n: number): number;",
                "    export interface Options {",
                "        strict?: boolean;",
                "    }",
                "}",
            ],
            &[],
            &["utils"],
        );
        assert_eq!(
            out,
            vec![
                "export function half(n: number): number;",
                "export interface Options {",
                "    strict?: boolean;",
                "}",
            ]
        );
    }

    #[test]
    fn test_aliased_block_becomes_namespace() {
        let out = run(
            &[
                "declare module \"dom\" {",
                "    export function h(tag: string): Element;",
                "}",
            ],
            &[("dom", "dom")],
            &["dom"],
        );
        assert_eq!(
            out,
            vec![
                "declare namespace dom {",
                "    export function h(tag: string): Element;",
                "}",
            ]
        );
    }

    #[test]
    fn test_internal_re_export_dropped() {
        let out = run(
            &[
                "declare module \"index\" {",
                "    export * from \"utils\";",
                "    export { half } from \"utils\";",
                "    export function run(): void;",
                "}",
            ],
            &[],
            &["index", "utils"],
        );
        assert_eq!(out, vec!["export function run(): void;"]);
    }

    #[test]
    fn test_cross_reference_rewrites() {
        let out = run(
            &[
                "declare module \"utils\" {",
                "    export type Loader = typeof import(\"index\").load;",
                "    export const app: import(\"index\").App;",
                "    export const root: typeof import(\"index\");",
                "}",
            ],
            &[],
            &["index", "utils"],
        );
        assert_eq!(
            out,
            vec![
                "export type Loader = typeof load;",
                "export const app: App;",
                "export const root: typeof import('.');",
            ]
        );
    }

    #[test]
    fn test_declare_prefix_added_to_bare_keywords() {
        let out = run(
            &[
                "declare module \"conf\" {",
                "    const VERSION: string;",
                "    function setup(): void;",
                "    interface Shape {",
                "    }",
                "    namespace inner {",
                "    }",
                "}",
            ],
            &[],
            &["conf"],
        );
        assert_eq!(
            out,
            vec![
                "declare const VERSION: string;",
                "declare function setup(): void;",
                "declare interface Shape {",
                "}",
                "declare namespace inner {",
                "}",
            ]
        );
    }

    #[test]
    fn test_unprefixed_lines_pass_through() {
        // Lines without the body indent are left alone rather than truncated.
        let out = run(&["stray content"], &[], &["index"]);
        assert_eq!(out, vec!["stray content"]);
    }

    #[test]
    fn test_blank_lines_removed() {
        let out = run(
            &["declare module \"a\" {", "    export const n: number;", "", "    ", "}"],
            &[],
            &["a"],
        );
        assert_eq!(out, vec!["export const n: number;"]);
    }
}
