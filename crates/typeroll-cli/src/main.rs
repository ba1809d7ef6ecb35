//! typeroll CLI entry point: argument parsing, logging setup, one build.

use clap::Parser;
use miette::Result;
use typeroll_build::{BuildOptions, Error};
use typeroll_cli::{cli, logger};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let mut options = BuildOptions::new(args.project)
        .strict(args.strict)
        .compiler_args(args.compiler_args);
    if let Some(outfile) = args.outfile {
        options = options.outfile(outfile);
    }

    match options.build().await {
        Ok(report) => {
            match report.destination {
                Some(destination) => tracing::info!(
                    "bundled {} modules into {}",
                    report.module_count,
                    destination.display()
                ),
                None => tracing::info!("no outFile configured, compiled without bundling"),
            }
            Ok(())
        }
        // tsc already reported its own diagnostics through inherited stdio.
        Err(Error::CompilerFailed { code }) => std::process::exit(code),
        Err(error) => Err(miette::Report::new(error)),
    }
}
