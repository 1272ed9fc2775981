//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use trailsnap_cli::CliError;

fn main() {
    match trailsnap_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("trailsnap: {err}");
            std::process::exit(1);
        }
    }
}
