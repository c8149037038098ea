use std::net::IpAddr;

use async_trait::async_trait;
use libdreamhook::api::Record;
use libdreamhook::record::txt_value;
use trust_dns_resolver::{
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    system_conf::read_system_conf,
    TokioAsyncResolver,
};

use crate::error::{io_error, Result};

const RESOLV_CONF: &str = "/etc/resolv.conf";

/// Record store holding the challenge TXT records.
///
/// Each call is a single request. Adding a record whose name already
/// exists creates a second record instead of replacing the first one.
#[async_trait]
pub trait Provider {
    async fn list_records(&self) -> Result<Vec<Record>>;
    async fn add_record(&self, record: &str, value: &str) -> Result<String>;
    async fn remove_record(&self, record: &str, value: &str) -> Result<String>;
}

/// Source of the TXT values currently visible for a name
#[async_trait]
pub trait Resolver {
    async fn txt_lookup(&self, record: &str) -> Result<Vec<String>>;
}

pub struct SystemResolver {
    resolver: TokioAsyncResolver,
}

impl SystemResolver {
    /// Queries the given nameservers, or the ones from the system
    /// configuration when the list is empty. Answers are never cached.
    pub fn new(nameservers: &[IpAddr]) -> Result<Self> {
        let (config, mut opts) = if nameservers.is_empty() {
            read_system_conf().map_err(io_error(RESOLV_CONF))?
        } else {
            let config = ResolverConfig::from_parts(
                None,
                vec![],
                NameServerConfigGroup::from_ips_clear(nameservers, 53, true),
            );
            (config, ResolverOpts::default())
        };
        opts.cache_size = 0;
        let resolver = TokioAsyncResolver::tokio(config, opts);
        Ok(Self { resolver })
    }
}

#[async_trait]
impl Resolver for SystemResolver {
    async fn txt_lookup(&self, record: &str) -> Result<Vec<String>> {
        let response = self.resolver.txt_lookup(record).await?;
        Ok(response
            .iter()
            .map(|txt| {
                txt_value(
                    txt.txt_data()
                        .iter()
                        .map(|data| String::from_utf8_lossy(data).into_owned()),
                )
            })
            .collect())
    }
}
