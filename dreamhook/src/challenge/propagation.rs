use std::time::Duration;

use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, trace};

use super::dns::Resolver;
use crate::error::{Error, Result};

/// Number of confirming lookups required before a record counts as propagated
pub const DEFAULT_CONFIRMATIONS: u32 = 3;

/// Outcome of a single lookup of the challenge record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The expected value is among the returned TXT values
    Seen,
    /// The lookup succeeded but the value is not there yet
    Missing,
    /// The lookup itself failed
    Failed,
}

pub async fn observe<R: Resolver + ?Sized>(resolver: &R, record: &str, value: &str) -> Observation {
    match resolver.txt_lookup(record).await {
        Ok(values) if values.iter().any(|v| v == value) => Observation::Seen,
        Ok(values) => {
            trace!(record, ?values, "record not yet propagated");
            Observation::Missing
        }
        Err(error) => {
            debug!(error=?error, record, "DNS lookup");
            Observation::Failed
        }
    }
}

/// Tracks confirming lookups for one record during one run.
///
/// Only a [`Observation::Seen`] moves the counter. Misses and failed
/// lookups leave it where it is.
#[derive(Debug)]
pub struct Watch {
    interval: Duration,
    threshold: u32,
    hits: u32,
}

impl Watch {
    pub fn new(interval: Duration, threshold: u32) -> Self {
        Self {
            interval,
            threshold: threshold.max(1),
            hits: 0,
        }
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn is_propagated(&self) -> bool {
        self.hits >= self.threshold
    }

    /// Records an observation, returning whether the threshold is reached
    pub fn record(&mut self, observation: Observation) -> bool {
        if observation == Observation::Seen {
            self.hits += 1;
            info!("new record seen {} times", self.hits);
        }
        self.is_propagated()
    }

    /// Polls until the value has been seen `threshold` times. There is
    /// no upper bound, see [`Watch::wait_until`] for a bounded wait.
    pub async fn wait<R: Resolver + ?Sized>(&mut self, resolver: &R, record: &str, value: &str) {
        loop {
            let observation = observe(resolver, record, value).await;
            if self.record(observation) {
                return;
            }
            info!(
                record,
                "DNS not propagated, waiting {}s",
                self.interval.as_secs()
            );
            sleep(self.interval).await;
        }
    }

    /// Same as [`Watch::wait`], but gives up once `deadline` elapses
    pub async fn wait_until<R: Resolver + ?Sized>(
        &mut self,
        resolver: &R,
        record: &str,
        value: &str,
        deadline: Option<Duration>,
    ) -> Result<()> {
        let start = Instant::now();
        match deadline {
            None => self.wait(resolver, record, value).await,
            Some(limit) => timeout(limit, self.wait(resolver, record, value))
                .await
                .map_err(|_| Error::PropagationTimeout {
                    record: record.to_string(),
                    elapsed: limit,
                })?,
        }
        debug!("DNS propagation took {:?}", start.elapsed());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::testing::{lookup_failure, ScriptedResolver};

    const RECORD: &str = "_acme-challenge.example.com";

    #[test]
    fn test_failure_holds_counter() {
        let mut watch = Watch::new(Duration::ZERO, 3);
        assert!(!watch.record(Observation::Seen));
        assert!(!watch.record(Observation::Seen));
        assert!(!watch.record(Observation::Failed));
        assert_eq!(2, watch.hits());
        assert!(!watch.record(Observation::Missing));
        assert_eq!(2, watch.hits());
        assert!(watch.record(Observation::Seen));
        assert_eq!(3, watch.hits());
    }

    #[test]
    fn test_zero_threshold_needs_one_hit() {
        let mut watch = Watch::new(Duration::ZERO, 0);
        assert!(!watch.is_propagated());
        assert!(watch.record(Observation::Seen));
    }

    #[tokio::test]
    async fn test_observe() {
        let resolver = ScriptedResolver::new(vec![
            Ok(vec!["other".to_string(), "token".to_string()]),
            Ok(vec!["other".to_string()]),
            Err(lookup_failure()),
        ]);
        assert_eq!(Observation::Seen, observe(&resolver, RECORD, "token").await);
        assert_eq!(Observation::Missing, observe(&resolver, RECORD, "token").await);
        assert_eq!(Observation::Failed, observe(&resolver, RECORD, "token").await);
    }

    #[tokio::test]
    async fn test_wait_stops_on_third_hit() {
        let seen = || Ok(vec!["token".to_string()]);
        let resolver = ScriptedResolver::new(vec![
            seen(),
            Err(lookup_failure()),
            seen(),
            Ok(vec![]),
            seen(),
            seen(),
        ]);
        let mut watch = Watch::new(Duration::ZERO, DEFAULT_CONFIRMATIONS);
        watch.wait(&resolver, RECORD, "token").await;
        assert_eq!(3, watch.hits());
        assert_eq!(5, resolver.lookups());
        assert_eq!(vec![RECORD.to_string(); 5], resolver.queried());
    }

    #[tokio::test]
    async fn test_wait_until_times_out() {
        let resolver = ScriptedResolver::new(vec![]);
        let mut watch = Watch::new(Duration::from_millis(5), DEFAULT_CONFIRMATIONS);
        let result = watch
            .wait_until(&resolver, RECORD, "token", Some(Duration::from_millis(50)))
            .await;
        match result {
            Err(Error::PropagationTimeout { record, elapsed }) => {
                assert_eq!(RECORD, record);
                assert_eq!(Duration::from_millis(50), elapsed);
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(0, watch.hits());
    }

    #[tokio::test]
    async fn test_wait_until_within_deadline() {
        let resolver =
            ScriptedResolver::new((0..3).map(|_| Ok(vec!["token".to_string()])).collect());
        let mut watch = Watch::new(Duration::ZERO, DEFAULT_CONFIRMATIONS);
        watch
            .wait_until(&resolver, RECORD, "token", Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert!(watch.is_propagated());
    }
}
