use std::convert::TryFrom;
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

use crate::configuration::goflags::{FlagValue, GoFlagSet, ParseOutcome};
use crate::configuration::{Endpoint, Iterations, KeyspaceList, LoadDescription};
use crate::error::Error;

pub const NAME: &str = "http";
pub const SYNOPSIS: &str = "Send points using http protocol";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BATCH_SIZE: i64 = 750;
const DEFAULT_KEYSPACE_FILE: &str = "keyspaces.json";

pub enum HttpCommand {
    Run(LoadDescription),
    Help,
}

struct HttpFlags {
    host: FlagValue<String>,
    port: FlagValue<u16>,
    timeout: FlagValue<Duration>,
    iterations: FlagValue<i64>,
    size: FlagValue<i64>,
    unique_series: FlagValue<i64>,
    keyspace_file: FlagValue<String>,
    debug: FlagValue<bool>,
}

fn define_flags() -> (GoFlagSet, HttpFlags) {
    let mut flag = GoFlagSet::new();

    let flags = HttpFlags {
        host: flag.string_var("host", "", "hostname of Mycenae (REQUIRED)"),
        port: flag.var("port", DEFAULT_PORT, DEFAULT_PORT, "http port of Mycenae", |s| {
            Ok(s.parse()?)
        }),
        timeout: flag.duration_var("timeout", DEFAULT_TIMEOUT, "timeout duration"),
        iterations: flag.var(
            "iter",
            0,
            "infinity",
            "number of requests to send",
            |s| Ok(s.parse()?),
        ),
        size: flag.i64_var("size", DEFAULT_BATCH_SIZE, "number of points per request"),
        unique_series: flag.i64_var("ts", i64::MAX, "number of unique timeseries"),
        keyspace_file: flag.string_var(
            "ks",
            DEFAULT_KEYSPACE_FILE,
            "path to keyspaces file",
        ),
        debug: flag.bool_var("debug", false, "print information about the request"),
    };

    (flag, flags)
}

pub fn help_text() -> String {
    let (flag, _) = define_flags();
    format!(
        "{}\n\nAccepted arguments:\n\n{}",
        SYNOPSIS,
        flag.usage().trim_end()
    )
}

/// Parses the arguments following the `http` subcommand and loads the
/// keyspace file they point to.
pub fn parse_http_args(args: impl Iterator<Item = String>) -> Result<HttpCommand, Error> {
    let (flag, flags) = define_flags();

    match flag.parse_args(args) {
        Ok(ParseOutcome::Parsed) => {}
        Ok(ParseOutcome::HelpRequested) => return Ok(HttpCommand::Help),
        Err(err) => return Err(Error::Usage(err.to_string())),
    }

    let host = flags.host.get();
    if host.is_empty() {
        return Err(Error::Usage("missing required flag -host".to_owned()));
    }

    let batch_size = non_negative("size", flags.size.get())?;
    let iterations = non_negative("iter", flags.iterations.get())?;
    let host_bound = NonZeroU64::new(non_negative("ts", flags.unique_series.get())?)
        .ok_or_else(|| Error::Usage("flag -ts must be greater than zero".to_owned()))?;

    let keyspaces = KeyspaceList::load(&PathBuf::from(flags.keyspace_file.get()))?;

    Ok(HttpCommand::Run(LoadDescription {
        endpoint: Endpoint {
            host,
            port: flags.port.get(),
        },
        timeout: flags.timeout.get(),
        iterations: Iterations::from_count(iterations),
        batch_size,
        host_bound,
        keyspaces,
        debug: flags.debug.get(),
    }))
}

fn non_negative<T: TryFrom<i64>>(name: &str, value: i64) -> Result<T, Error> {
    if value < 0 {
        return Err(Error::Usage(format!("flag -{} must not be negative", name)));
    }
    T::try_from(value).map_err(|_| Error::Usage(format!("flag -{} is too large", name)))
}
