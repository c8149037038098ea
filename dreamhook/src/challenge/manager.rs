use std::time::Duration;

use libdreamhook::api::Record;
use libdreamhook::record::challenge_record_name;
use tokio::time::sleep;
use tracing::info;

use super::dns::{Provider, Resolver, SystemResolver};
use super::dreamhost;
use super::propagation::{Watch, DEFAULT_CONFIRMATIONS};
use crate::error::{Error, Result};
use crate::settings::{self, Settings};

/// Pauses and thresholds used while publishing and removing records
#[derive(Debug, Clone)]
pub struct Timings {
    pub settle: Duration,
    pub poll_interval: Duration,
    pub cleanup_delay: Duration,
    pub confirmations: u32,
    pub deadline: Option<Duration>,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(10),
            poll_interval: Duration::from_secs(30),
            cleanup_delay: Duration::from_secs(30),
            confirmations: DEFAULT_CONFIRMATIONS,
            deadline: None,
        }
    }
}

impl From<&settings::Challenge> for Timings {
    fn from(challenge: &settings::Challenge) -> Self {
        Self {
            settle: Duration::from_secs(challenge.settle_secs),
            poll_interval: Duration::from_secs(challenge.poll_interval_secs),
            cleanup_delay: Duration::from_secs(challenge.cleanup_delay_secs),
            confirmations: challenge.confirmations,
            deadline: challenge.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Runs the lifecycle of the `_acme-challenge` TXT record of a domain
pub struct Manager {
    provider: Box<dyn Provider + Send + Sync>,
    resolver: Box<dyn Resolver + Send + Sync>,
    timings: Timings,
}

impl Manager {
    pub fn new(
        provider: Box<dyn Provider + Send + Sync>,
        resolver: Box<dyn Resolver + Send + Sync>,
        timings: Timings,
    ) -> Self {
        Self {
            provider,
            resolver,
            timings,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let key = settings
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingApiKey)?;
        let provider = dreamhost::Provider::new(
            &settings.api_url,
            key,
            Duration::from_secs(settings.api_timeout_secs),
        )?;
        let resolver = SystemResolver::new(&settings.challenge.nameservers)?;
        Ok(Self::new(
            Box::new(provider),
            Box::new(resolver),
            Timings::from(&settings.challenge),
        ))
    }

    async fn existing(&self, record: &str) -> Result<Vec<Record>> {
        info!(record, "checking if TXT record exists");
        let records = self.provider.list_records().await?;
        Ok(records.into_iter().filter(|r| r.matches(record)).collect())
    }

    async fn remove(&self, records: &[Record]) -> Result<()> {
        for record in records {
            let status = self
                .provider
                .remove_record(&record.record, &record.value)
                .await?;
            info!(record = record.record, value = record.value, status, "removed TXT record");
        }
        Ok(())
    }

    async fn settle(&self) {
        info!("settling down for {}s", self.timings.settle.as_secs());
        sleep(self.timings.settle).await;
    }

    /// Publishes `token` for `domain` and returns once resolvers return it
    /// consistently. Stale records are removed before the new one is added.
    pub async fn deploy(&self, domain: &str, token: &str) -> Result<()> {
        let record = challenge_record_name(domain);

        let stale = self.existing(&record).await?;
        if !stale.is_empty() {
            info!(record, count = stale.len(), "old TXT record found, removing");
            self.remove(&stale).await?;
            self.settle().await;
        }

        info!(record, value = token, "adding new TXT record");
        let status = self.provider.add_record(&record, token).await?;
        info!(record, status, "added TXT record");
        self.settle().await;

        let mut watch = Watch::new(self.timings.poll_interval, self.timings.confirmations);
        watch
            .wait_until(&*self.resolver, &record, token, self.timings.deadline)
            .await?;
        info!(record, "DNS propagated");
        Ok(())
    }

    /// Removes any challenge record left for `domain`
    pub async fn clean(&self, domain: &str) -> Result<()> {
        let record = challenge_record_name(domain);

        let leftover = self.existing(&record).await?;
        if leftover.is_empty() {
            info!(record, "no TXT record found, nothing to clean");
            return Ok(());
        }

        info!(
            record,
            "old TXT record found, waiting {}s before removing",
            self.timings.cleanup_delay.as_secs()
        );
        sleep(self.timings.cleanup_delay).await;
        self.remove(&leftover).await
    }
}
