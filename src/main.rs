//! msvscpp-convert
//!
//! Converts a Visual Studio 2008 C/C++ solution into a newer format.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use msvscpp_convert::{ConverterBuilder, VsVersion};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "msvscpp-convert",
    about = "Convert Visual Studio 2008 C/C++ solution and project files",
    version
)]
struct Cli {
    /// Visual Studio 2008 solution (.sln) file
    solution: Option<PathBuf>,

    /// Output format version
    #[arg(long = "to", value_name = "VERSION", default_value = "2010")]
    to: String,

    /// Output directory, must not exist (default: the output version)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(solution) = cli.solution else {
        eprintln!("{}", Cli::command().render_usage());
        eprintln!("missing solution file");
        return ExitCode::FAILURE;
    };

    let output_version = match cli.to.parse::<VsVersion>() {
        Ok(version) => version,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut builder = ConverterBuilder::new().output_version(output_version);
    if let Some(output) = cli.output {
        builder = builder.output_directory(output);
    }

    let result = builder.build().and_then(|converter| converter.convert(&solution));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
