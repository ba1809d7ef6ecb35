//! Invoking `tsc` and capturing its `--outFile` declaration emission.
//!
//! The compiler inherits stdio so its own diagnostics reach the terminal
//! unchanged. Declarations are emitted to a temporary sibling of the
//! destination, read back, and removed.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::{Error, Result};

/// Flags the pipeline sets itself. Caller-provided forms are stripped from
/// the passthrough list so the forced values win.
const OWNED_VALUE_FLAGS: &[&str] = &["--outfile", "-p", "--project"];
const OWNED_BOOLEAN_FLAGS: &[&str] = &["--composite", "--incremental"];

/// Run `tsc -p <project>` and return the declaration text emitted for
/// `dest`'s temporary sibling.
pub async fn emit_declarations(
    cwd: &Path,
    project: &Path,
    dest: &Path,
    extra_args: &[String],
) -> Result<String> {
    let temporary = temporary_path(dest);
    tracing::debug!("emitting declarations to {}", temporary.display());

    let status = Command::new("tsc")
        .arg("-p")
        .arg(project)
        .arg("--outFile")
        .arg(&temporary)
        .args(["--composite", "false", "--incremental", "false"])
        .args(strip_owned_flags(extra_args))
        .current_dir(cwd)
        .status()
        .await
        .map_err(|source| Error::Spawn { source })?;
    if !status.success() {
        return Err(Error::CompilerFailed {
            code: status.code().unwrap_or(1),
        });
    }

    let source = tokio::fs::read_to_string(&temporary)
        .await
        .map_err(|source| Error::Io {
            path: temporary.clone(),
            source,
        })?;
    tokio::fs::remove_file(&temporary)
        .await
        .map_err(|source| Error::Io {
            path: temporary.clone(),
            source,
        })?;
    Ok(source)
}

/// Plain `tsc -p <project>` for projects without an `outFile`. Nothing is
/// captured; the compiler writes wherever the project says.
pub async fn compile(cwd: &Path, project: &Path, extra_args: &[String]) -> Result<()> {
    let status = Command::new("tsc")
        .arg("-p")
        .arg(project)
        .args(extra_args)
        .current_dir(cwd)
        .status()
        .await
        .map_err(|source| Error::Spawn { source })?;
    if !status.success() {
        return Err(Error::CompilerFailed {
            code: status.code().unwrap_or(1),
        });
    }
    Ok(())
}

/// `lib/index.d.ts` emits through `lib/index.tmp.d.ts` so a failed run
/// never clobbers the published bundle.
fn temporary_path(dest: &Path) -> PathBuf {
    let rendered = dest.to_string_lossy();
    let stem = rendered.strip_suffix(".d.ts").unwrap_or(&rendered);
    PathBuf::from(format!("{stem}.tmp.d.ts"))
}

fn strip_owned_flags(args: &[String]) -> Vec<String> {
    let mut kept = Vec::with_capacity(args.len());
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if OWNED_VALUE_FLAGS.iter().any(|flag| arg.eq_ignore_ascii_case(flag)) {
            // The flag's value travels with it.
            if iter.peek().is_some_and(|value| !value.starts_with('-')) {
                iter.next();
            }
            continue;
        }
        if OWNED_BOOLEAN_FLAGS.iter().any(|flag| arg.eq_ignore_ascii_case(flag)) {
            // Boolean flags take at most an explicit true/false; anything
            // else after them is a separate argument.
            if iter.peek().is_some_and(|value| {
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
            }) {
                iter.next();
            }
            continue;
        }
        kept.push(arg.clone());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_temporary_path_replaces_declaration_suffix() {
        assert_eq!(
            temporary_path(Path::new("lib/index.d.ts")),
            Path::new("lib/index.tmp.d.ts")
        );
    }

    #[test]
    fn test_temporary_path_appends_otherwise() {
        assert_eq!(
            temporary_path(Path::new("lib/index")),
            Path::new("lib/index.tmp.d.ts")
        );
    }

    #[test]
    fn test_strip_owned_flags_removes_flag_and_value() {
        assert_eq!(
            strip_owned_flags(&args(&["--composite", "true", "--strictNullChecks"])),
            args(&["--strictNullChecks"])
        );
    }

    #[test]
    fn test_strip_owned_flags_is_case_insensitive() {
        assert_eq!(
            strip_owned_flags(&args(&["--outFile", "lib/other.d.ts", "--watch"])),
            args(&["--watch"])
        );
    }

    #[test]
    fn test_strip_owned_flags_keeps_value_of_other_flags() {
        assert_eq!(
            strip_owned_flags(&args(&["--target", "es2022", "--incremental"])),
            args(&["--target", "es2022"])
        );
    }

    #[test]
    fn test_strip_owned_flags_leaves_following_flag_alone() {
        assert_eq!(
            strip_owned_flags(&args(&["--project", "--watch"])),
            args(&["--watch"])
        );
    }

    #[test]
    fn test_strip_owned_flags_keeps_positional_after_boolean() {
        assert_eq!(
            strip_owned_flags(&args(&["--incremental", "extra.ts"])),
            args(&["extra.ts"])
        );
    }
}
