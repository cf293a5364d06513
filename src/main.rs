// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, build an
//   authenticated client and hand the subcommand to `commands`.
// - Any error is logged to stderr and turns into exit status 1.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use release_me::api::{ApiClient, Endpoints};
use release_me::cli::Cli;
use release_me::error::CommandError;
use release_me::{commands, logging, token};
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log = logging::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CommandError> {
    let token = token::resolve(cli.token.as_deref())?;
    let client = ApiClient::new(&token, Endpoints::new(&cli.api_url, &cli.upload_url))?;

    let stdout = io::stdout();
    commands::run(&client, &cli.command, &mut stdout.lock())
}
