//! Build the review page from the assets directory.
//!
//! With no flags this scans `./assets`, reads `./gallery.json` when present
//! and writes `./index.html`. A missing assets directory or an empty one is
//! logged and leaves the previous output untouched without failing.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use gallery_builder::{
    BuildOptions, BuildOutcome, DEFAULT_ASSETS_DIR, DEFAULT_OUTPUT, GalleryConfig, run_build,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `gallery-build` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gallery-build",
    about = "Generate the design review page from a directory of theme folders",
    version
)]
struct CliArgs {
    /// Directory containing one folder per theme.
    #[arg(long, value_name = "dir", default_value = DEFAULT_ASSETS_DIR)]
    assets: Utf8PathBuf,
    /// Page configuration JSON; built-in defaults apply when it is absent.
    #[arg(long, value_name = "path", default_value = "gallery.json")]
    config: Utf8PathBuf,
    /// Output HTML file.
    #[arg(long, value_name = "path", default_value = DEFAULT_OUTPUT)]
    output: Utf8PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    let args = CliArgs::parse();

    let config = match GalleryConfig::load_or_default(&args.config) {
        Ok(config) => config,
        Err(err) => return fail(&err),
    };
    let options = BuildOptions {
        assets_dir: args.assets,
        output: args.output,
    };

    match run_build(&options, &config) {
        Ok(BuildOutcome::Written(report)) => {
            info!(output = %report.output, "open the page in a browser to start reviewing");
            ExitCode::SUCCESS
        }
        Ok(BuildOutcome::AssetsMissing { .. } | BuildOutcome::NoThemes) => ExitCode::SUCCESS,
        Err(err) => fail(&err),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stdout)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

fn fail(err: &dyn std::error::Error) -> ExitCode {
    if let Err(write_err) = writeln!(io::stderr().lock(), "gallery-build: {err}") {
        drop(write_err);
    }
    ExitCode::FAILURE
}
