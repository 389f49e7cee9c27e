mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, discover, listen};
use terminal::logging;
use tracing::error;

fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);

    let result = match commands.command {
        Some(Commands::Listen { interface, count }) => {
            listen::listen(interface.as_deref(), count).map(|()| ExitCode::SUCCESS)
        }
        None => discover::discover(&commands.scan),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
