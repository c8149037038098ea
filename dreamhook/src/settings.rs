use std::net::IpAddr;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use libdreamhook::api::DEFAULT_API_URL;
use libdreamhook::deploy::DEFAULT_CERTS_DIR;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Challenge {
    /// Pause after each write so the provider backend converges
    pub settle_secs: u64,
    pub poll_interval_secs: u64,
    /// Pause before removing a record during cleanup
    pub cleanup_delay_secs: u64,
    pub confirmations: u32,
    /// Upper bound for the propagation wait, unbounded when missing
    pub timeout_secs: Option<u64>,
    /// Resolvers used for propagation checks, the system ones when empty
    #[serde(default)]
    pub nameservers: Vec<IpAddr>,
}

#[derive(Debug, Deserialize)]
pub struct Deploy {
    pub config_file: PathBuf,
    pub certs_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api_key: Option<String>,
    pub api_url: String,
    pub api_timeout_secs: u64,
    pub challenge: Challenge,
    pub deploy: Deploy,
}

static ENV_PREFIX: &str = "DREAMHOST";

/// Serializes tests that read or change `DREAMHOST_*` variables
#[cfg(test)]
pub(crate) static TEST_ENV_MUTEX: std::sync::Mutex<i32> = std::sync::Mutex::new(1);

/// Directory holding both the hook settings and the deployment config
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("dehydrated")
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_dir(config_dir())
    }

    /// Reads `dreamhook.{toml,yaml,json}` from `dir` if present, then
    /// the `DREAMHOST_` environment, over the built-in defaults.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let settings_file = dir.join("dreamhook");
        let deploy_file = dir.join("deploy.conf");

        let s = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("api_timeout_secs", 30)?
            .set_default("challenge.settle_secs", 10)?
            .set_default("challenge.poll_interval_secs", 30)?
            .set_default("challenge.cleanup_delay_secs", 30)?
            .set_default("challenge.confirmations", 3)?
            .set_default("deploy.config_file", deploy_file.to_string_lossy().as_ref())?
            .set_default("deploy.certs_dir", DEFAULT_CERTS_DIR)?
            .add_source(File::with_name(&settings_file.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let settings: Self = s.try_deserialize()?;
        if settings.challenge.confirmations == 0 {
            return Err(ConfigError::Message(
                "challenge.confirmations must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }
}
