use std::fs::File;
use std::io::BufReader;
use std::ops::Deref;
use std::path::Path;

use crate::error::Error;

/// The keyspaces points are spread over, in the order they were configured.
///
/// The list is never empty: the first keyspace is the default pick for every
/// generated point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyspaceList(Vec<String>);

impl KeyspaceList {
    pub fn new(keyspaces: Vec<String>) -> Option<Self> {
        if keyspaces.is_empty() {
            return None;
        }
        Some(Self(keyspaces))
    }

    /// Reads a JSON array of keyspace names, e.g. `["ks1", "ks2"]`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|source| Error::KeyspaceFile {
            path: path.to_owned(),
            source,
        })?;

        let keyspaces: Vec<String> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                Error::KeyspaceDecode {
                    path: path.to_owned(),
                    source,
                }
            })?;

        Self::new(keyspaces).ok_or_else(|| Error::NoKeyspaces(path.to_owned()))
    }
}

impl Deref for KeyspaceList {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}
