use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const KEYSPACE_TAG: &str = "ksid";
pub const HOST_TAG: &str = "host";

/// A single measurement, in the shape the `/api/put` endpoint accepts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub value: f64,
    pub metric: String,
    pub tags: HashMap<String, String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[cfg(test)]
impl Point {
    pub fn keyspace(&self) -> Option<&str> {
        self.tags.get(KEYSPACE_TAG).map(String::as_str)
    }

    pub fn host(&self) -> Option<&str> {
        self.tags.get(HOST_TAG).map(String::as_str)
    }
}

pub type Batch = Vec<Point>;

#[cfg(test)]
mod tests {
    use super::{Batch, Point};

    #[test]
    fn test_wire_format() {
        let point = Point {
            value: 0.5,
            metric: "sendPoints-1700000000".to_owned(),
            tags: vec![("ksid".to_owned(), "ks1".to_owned())]
                .into_iter()
                .collect(),
            timestamp: 1_700_000_000_123,
        };

        let json: serde_json::Value = serde_json::to_value(vec![point]).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{
                "value": 0.5,
                "metric": "sendPoints-1700000000",
                "tags": {"ksid": "ks1"},
                "timestamp": 1_700_000_000_123i64,
            }])
        );
    }

    #[test]
    fn test_batch_survives_serialization() {
        let batch: Batch = (0..3)
            .map(|i| Point {
                value: 0.25 * i as f64,
                metric: "sendPoints-42".to_owned(),
                tags: vec![
                    ("ksid".to_owned(), format!("ks{}", i)),
                    ("host".to_owned(), format!("h-{}", i * 7)),
                ]
                .into_iter()
                .collect(),
                timestamp: 1_000 + i,
            })
            .collect();

        let bytes = serde_json::to_vec(&batch).unwrap();
        let decoded: Batch = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded, batch);
        assert_eq!(decoded[2].keyspace(), Some("ks2"));
        assert_eq!(decoded[2].host(), Some("h-14"));
    }
}
