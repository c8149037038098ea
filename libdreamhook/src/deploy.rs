use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::action::Action;
use crate::error::{Error, Result};

/// Where the issuance client stores the certificates it obtained
pub const DEFAULT_CERTS_DIR: &str = "/etc/dehydrated/certs";

/// Maps a file-type tag (`privkey`, `cert`, `chain`, `fullchain`) to the
/// path of the file currently deployed for it.
pub type Location = BTreeMap<String, PathBuf>;

/// Domains with their locations, in the order the config file lists them
pub type Domains = Vec<(String, Vec<Location>)>;

#[derive(Deserialize, Debug, Default)]
pub struct DeployConfig {
    #[serde(default, deserialize_with = "in_file_order")]
    pub domains: Domains,
    #[serde(default)]
    pub post_actions: Vec<Action>,
}

impl DeployConfig {
    pub fn locations(&self, domain: &str) -> Option<&[Location]> {
        self.domains
            .iter()
            .find(|(name, _)| name == domain)
            .map(|(_, locations)| locations.as_slice())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                Error::ConfigNotFound(path.to_path_buf())
            } else {
                Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        serde_yaml::from_str(&data).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

struct DomainsVisitor;

impl<'de> Visitor<'de> for DomainsVisitor {
    type Value = Domains;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of domains to lists of locations")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut domains = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, Vec<Location>>()? {
            domains.push(entry);
        }
        Ok(domains)
    }
}

fn in_file_order<'de, D>(deserializer: D) -> std::result::Result<Domains, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(DomainsVisitor)
}

/// Path of the newly issued file of the given type for a domain
pub fn new_file_path<P: AsRef<Path>>(certs_dir: P, domain: &str, file_type: &str) -> PathBuf {
    certs_dir
        .as_ref()
        .join(domain)
        .join(format!("{}.pem", file_type))
}
