mod goflags;
pub mod http_command;
mod keyspaces;

use std::fmt;
use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Duration;

pub use keyspaces::KeyspaceList;

/// Everything a run needs, validated.
#[derive(Clone, Debug)]
pub struct LoadDescription {
    pub endpoint: Endpoint,
    pub timeout: Duration,
    pub iterations: Iterations,
    pub batch_size: usize,
    // Host ids are drawn from [0, host_bound)
    pub host_bound: NonZeroU64,
    pub keyspaces: KeyspaceList,
    pub debug: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn put_url(&self) -> String {
        format!("http://{}:{}/api/put", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Iterations {
    Bounded(NonZeroUsize),
    Unbounded,
}

impl Iterations {
    /// Zero means "run until something fails".
    pub fn from_count(count: usize) -> Self {
        match NonZeroUsize::new(count) {
            Some(count) => Iterations::Bounded(count),
            None => Iterations::Unbounded,
        }
    }
}
