use std::num::NonZeroU64;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Distribution as RandDistribution;
use rand::{Rng, SeedableRng};
use rand_distr::Uniform;
use rand_pcg::Pcg64Mcg;

use crate::point::{Batch, Point, HOST_TAG, KEYSPACE_TAG};

pub type RngGen = Pcg64Mcg;

const METRIC_PREFIX: &str = "sendPoints";

enum Seeding {
    // Reseed from the wall clock at the start of every batch
    Clock,
    Fixed,
}

/// Fabricates batches of random points.
pub struct PointFactory {
    gen: RngGen,
    seeding: Seeding,
}

impl PointFactory {
    pub fn new() -> Self {
        Self {
            gen: RngGen::seed_from_u64(clock_seed()),
            seeding: Seeding::Clock,
        }
    }

    /// A factory whose output only depends on `seed`, apart from the metric
    /// name and timestamps.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            gen: RngGen::seed_from_u64(seed),
            seeding: Seeding::Fixed,
        }
    }

    pub fn generate(
        &mut self,
        batch_size: usize,
        keyspaces: &[String],
        host_bound: NonZeroU64,
    ) -> Batch {
        if let Seeding::Clock = self.seeding {
            self.gen = RngGen::seed_from_u64(clock_seed());
        }

        let metric = format!("{}-{}", METRIC_PREFIX, unix_now().as_secs());
        let hosts = Uniform::new(0, host_bound.get());

        (0..batch_size)
            .map(|_| {
                let keyspace = pick_keyspace(&mut self.gen, keyspaces);
                let value: f64 = self.gen.gen();
                let host = format!("h-{}", hosts.sample(&mut self.gen));

                Point {
                    value,
                    metric: metric.clone(),
                    tags: vec![
                        (KEYSPACE_TAG.to_owned(), keyspace.to_owned()),
                        (HOST_TAG.to_owned(), host),
                    ]
                    .into_iter()
                    .collect(),
                    timestamp: unix_now().as_millis() as i64,
                }
            })
            .collect()
    }
}

// The random draw only happens when the *name* of the first keyspace is
// longer than one byte, and an index other than zero is shifted down by
// one, so the last keyspace is never picked.
fn pick_keyspace<'a>(gen: &mut RngGen, keyspaces: &'a [String]) -> &'a str {
    let first = &keyspaces[0];
    if first.len() <= 1 {
        return first;
    }

    let mut idx = gen.gen_range(0..keyspaces.len());
    if idx != 0 {
        idx -= 1;
    }
    &keyspaces[idx]
}

fn unix_now() -> std::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

fn clock_seed() -> u64 {
    unix_now().as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::num::NonZeroU64;

    use super::PointFactory;

    fn keyspaces(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn bound(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    fn host_id(host: &str) -> u64 {
        host.strip_prefix("h-").unwrap().parse().unwrap()
    }

    #[test]
    fn test_batch_size() {
        let mut factory = PointFactory::new();
        let ks = keyspaces(&["ks1", "ks2"]);

        for &size in &[0, 1, 17, 750] {
            assert_eq!(factory.generate(size, &ks, bound(10)).len(), size);
        }
    }

    #[test]
    fn test_metric_is_shared_within_batch() {
        let mut factory = PointFactory::with_seed(7);
        let batch = factory.generate(500, &keyspaces(&["ks1"]), bound(10));

        let metrics: HashSet<_> = batch.iter().map(|p| p.metric.as_str()).collect();
        assert_eq!(metrics.len(), 1);
        assert!(batch[0].metric.starts_with("sendPoints-"));
    }

    #[test]
    fn test_value_and_host_ranges() {
        let mut factory = PointFactory::with_seed(1);
        let batch = factory.generate(2000, &keyspaces(&["ks1", "ks2", "ks3"]), bound(5));

        let mut hosts = HashSet::new();
        for point in &batch {
            assert!(point.value >= 0.0 && point.value < 1.0);
            assert_eq!(point.tags.len(), 2);
            let id = host_id(point.host().unwrap());
            assert!(id < 5);
            hosts.insert(id);
        }
        assert_eq!(hosts.len(), 5);
    }

    #[test]
    fn test_timestamps_are_epoch_millis_taken_per_point() {
        let mut factory = PointFactory::with_seed(2);

        let before = super::unix_now().as_millis() as i64;
        let batch = factory.generate(20_000, &keyspaces(&["ks1"]), bound(10));
        let after = super::unix_now().as_millis() as i64;

        for point in &batch {
            assert!(point.timestamp >= before && point.timestamp <= after);
        }
        assert!(batch.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_host_bound_of_one() {
        let mut factory = PointFactory::with_seed(3);
        let batch = factory.generate(100, &keyspaces(&["ks1"]), bound(1));

        assert!(batch.iter().all(|p| p.host() == Some("h-0")));
    }

    #[test]
    fn test_single_keyspace() {
        let mut factory = PointFactory::with_seed(11);

        for name in &["k", "a_much_longer_keyspace"] {
            let batch = factory.generate(300, &keyspaces(&[*name]), bound(100));
            assert!(batch.iter().all(|p| p.keyspace() == Some(*name)));
        }
    }

    #[test]
    fn test_short_first_keyspace_disables_selection() {
        let mut factory = PointFactory::with_seed(5);
        let batch = factory.generate(1000, &keyspaces(&["a", "bbb", "ccc", "ddd"]), bound(100));

        assert!(batch.iter().all(|p| p.keyspace() == Some("a")));

        let batch = factory.generate(1000, &keyspaces(&["", "bbb", "ccc"]), bound(100));
        assert!(batch.iter().all(|p| p.keyspace() == Some("")));
    }

    #[test]
    fn test_first_keyspace_length_is_counted_in_bytes() {
        let mut factory = PointFactory::with_seed(1);

        // One character, two bytes
        let batch = factory.generate(1000, &keyspaces(&["é", "b", "c"]), bound(10));
        let picked: HashSet<_> = batch.iter().map(|p| p.keyspace().unwrap()).collect();
        let expected: HashSet<_> = vec!["é", "b"].into_iter().collect();
        assert_eq!(picked, expected);
    }

    #[test]
    fn test_last_keyspace_is_never_picked() {
        let mut factory = PointFactory::with_seed(9);

        let batch = factory.generate(1000, &keyspaces(&["ks1", "ks2"]), bound(100));
        assert!(batch.iter().all(|p| p.keyspace() == Some("ks1")));

        let batch = factory.generate(3000, &keyspaces(&["ks1", "ks2", "ks3", "ks4"]), bound(100));
        let picked: HashSet<_> = batch.iter().map(|p| p.keyspace().unwrap()).collect();
        let expected: HashSet<_> = vec!["ks1", "ks2", "ks3"].into_iter().collect();
        assert_eq!(picked, expected);

        // Index 0 and 1 both land on the first keyspace
        let first = batch.iter().filter(|p| p.keyspace() == Some("ks1")).count();
        let second = batch.iter().filter(|p| p.keyspace() == Some("ks2")).count();
        assert!(first > second);
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let ks = keyspaces(&["ks1", "ks2", "ks3"]);
        let a = PointFactory::with_seed(42).generate(50, &ks, bound(1000));
        let b = PointFactory::with_seed(42).generate(50, &ks, bound(1000));

        let strip = |batch: &Vec<crate::point::Point>| -> Vec<_> {
            batch
                .iter()
                .map(|p| (p.value, p.tags.clone()))
                .collect()
        };
        assert_eq!(strip(&a), strip(&b));
    }

    #[test]
    fn test_generated_batch_survives_serialization() {
        let mut factory = PointFactory::with_seed(13);
        let batch = factory.generate(100, &keyspaces(&["ks1", "ks2", "ks3"]), bound(1 << 40));

        let bytes = serde_json::to_vec(&batch).unwrap();
        let decoded: crate::point::Batch = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded, batch);
    }
}
