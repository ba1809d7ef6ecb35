//! Command-line interface definition.
//!
//! typeroll is a single-command tool: it builds the project named by
//! `--project` and everything after `--` goes to `tsc` unchanged.

use std::path::PathBuf;

use clap::Parser;

/// typeroll - bundle TypeScript declaration output
#[derive(Parser, Debug)]
#[command(
    name = "typeroll",
    version,
    about = "Bundle TypeScript declaration output into a single .d.ts",
    long_about = "Typeroll drives tsc against a project compiled with compilerOptions.outFile,\n\
                  flattens the ambient `declare module` blocks of the emission, and writes one\n\
                  publishable .d.ts with external imports consolidated at the top."
)]
pub struct Cli {
    /// Project to build
    ///
    /// Either a tsconfig file or a directory containing tsconfig.json.
    #[arg(short = 'p', long, default_value = ".", value_name = "PATH")]
    pub project: PathBuf,

    /// Where to write the bundle
    ///
    /// Defaults to compilerOptions.outFile from the tsconfig.
    #[arg(long, value_name = "FILE")]
    pub outfile: Option<PathBuf>,

    /// Fail when the bundle still references unrecognized relative paths
    ///
    /// Without this flag leftover `import("./...")` references are reported
    /// at debug level and left in the output for inspection.
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Extra arguments handed through to tsc
    ///
    /// Example: typeroll -p packages/core -- --noEmitOnError
    #[arg(last = true, value_name = "TSC_ARGS")]
    pub compiler_args: Vec<String>,
}
