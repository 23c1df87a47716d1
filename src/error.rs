use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Exit code for a successful run.
pub const EXIT_OK: i32 = 0;
/// Exit code for invalid command line arguments.
pub const EXIT_USAGE: i32 = 1;
/// Exit code for I/O, decoding and transport failures.
pub const EXIT_FATAL: i32 = 2;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error("failed to open keyspace file {}: {source}", path.display())]
    KeyspaceFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode keyspace file {}: {source}", path.display())]
    KeyspaceDecode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("keyspace file {} does not list any keyspace", .0.display())]
    NoKeyspaces(PathBuf),

    #[error("failed to serialize points: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Transport(#[source] BoxError),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => EXIT_USAGE,
            Error::KeyspaceFile { .. }
            | Error::KeyspaceDecode { .. }
            | Error::NoKeyspaces(_)
            | Error::Serialize(_)
            | Error::Transport(_) => EXIT_FATAL,
        }
    }
}
