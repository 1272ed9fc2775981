//! Command-line interface for snapping drawn paths onto the road network.
#![forbid(unsafe_code)]

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

mod error;
mod fs;
mod headless;
mod match_cmd;

pub use error::CliError;
pub use headless::{AlertLog, HeadlessSurface, PanelText};

use match_cmd::{MatchArgs, run_match};

pub(crate) const ARG_MATCH_FEATURES: &str = "features";
pub(crate) const ARG_MATCH_ACCESS_TOKEN: &str = "access-token";
pub(crate) const ARG_MATCH_BASE_URL: &str = "base-url";
pub(crate) const ARG_MATCH_PROFILE: &str = "profile";
pub(crate) const ARG_MATCH_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_MATCH_OUTPUT: &str = "output";
pub(crate) const ENV_MATCH_FEATURES: &str = "TRAILSNAP_CMDS_MATCH_FEATURES";
pub(crate) const ENV_MATCH_ACCESS_TOKEN: &str = "TRAILSNAP_CMDS_MATCH_ACCESS_TOKEN";

/// Run the trailsnap CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] describing the first failure; argument errors
/// include help and version requests.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    match cli.command {
        Command::Match(args) => run_match(args),
    }
}

/// Install `env_logger` on stderr.
///
/// `RUST_LOG` directives take precedence over the `-v` count.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let installed = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .try_init();
    if installed.is_err() {
        log::debug!("logger already installed");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "trailsnap",
    about = "Snap hand-drawn paths onto the road network",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match the last line drawn in a GeoJSON feature collection.
    Match(MatchArgs),
}

#[cfg(test)]
mod tests;
