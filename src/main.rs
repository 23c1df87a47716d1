#[macro_use]
extern crate async_trait;

mod configuration;
mod error;
mod generator;
mod point;
mod run;
mod submitter;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use configuration::http_command::{self, HttpCommand};
use error::{Error, EXIT_OK, EXIT_USAGE};

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let code = dispatch(std::env::args()).await;
    std::process::exit(code);
}

async fn dispatch(mut args: impl Iterator<Item = String>) -> i32 {
    // Skip the first arg
    args.next();

    let command = match args.next() {
        Some(command) => command,
        None => {
            eprintln!("{}", commands_help());
            return EXIT_USAGE;
        }
    };

    match command.as_str() {
        "-h" | "-help" | "--help" => {
            println!("{}", commands_help());
            EXIT_OK
        }
        "-v" | "-version" | "--version" => {
            println!("{}", VERSION);
            EXIT_OK
        }
        http_command::NAME => match http_command::parse_http_args(args) {
            Ok(HttpCommand::Help) => {
                println!("{}", http_command::help_text());
                EXIT_OK
            }
            Ok(HttpCommand::Run(config)) => {
                init_logging(config.debug);
                run::run(Arc::new(config)).await
            }
            Err(err @ Error::Usage(_)) => {
                eprintln!("{}\n\n{}", err, http_command::help_text());
                err.exit_code()
            }
            Err(err) => {
                eprintln!("{}", err);
                err.exit_code()
            }
        },
        other => {
            eprintln!("Unknown command: {}\n\n{}", other, commands_help());
            EXIT_USAGE
        }
    }
}

fn commands_help() -> String {
    format!(
        "Usage: {} [--version] [--help] <command> [<args>]\n\nAvailable commands are:\n    {:<8}{}",
        APP_NAME,
        http_command::NAME,
        http_command::SYNOPSIS
    )
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
