mod actions;
mod files;

use std::path::{Path, PathBuf};

use libdreamhook::deploy::new_file_path;
use libdreamhook::{DeployConfig, Location};
use tracing::info;

use crate::error::{Error, Result};
use crate::settings;

pub use actions::Outcome;
pub use files::{backup_path, deploy_file, same_contents};

/// A single file to replace: the new copy and the deployed one
#[derive(Debug, PartialEq, Eq)]
struct Swap {
    file_type: String,
    old: PathBuf,
    new: PathBuf,
}

#[derive(Debug, Default)]
pub struct Summary {
    /// Domains where at least one file changed
    pub changed: Vec<String>,
    /// Post-deployment action results, empty when nothing changed
    pub actions: Vec<Outcome>,
}

impl Summary {
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

pub struct Deployer {
    config: DeployConfig,
    certs_dir: PathBuf,
}

impl Deployer {
    pub fn new<P: AsRef<Path>>(config: DeployConfig, certs_dir: P) -> Self {
        Self {
            config,
            certs_dir: certs_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(settings: &settings::Deploy) -> Result<Self> {
        info!(
            path = %settings.config_file.display(),
            "using deployment config file"
        );
        let config = DeployConfig::load(&settings.config_file)?;
        Ok(Self::new(config, &settings.certs_dir))
    }

    /// Every file that needs comparing for a domain. Fails before anything
    /// is written if any new or deployed file is missing.
    fn plan(&self, domain: &str, locations: &[Location]) -> Result<Vec<Swap>> {
        let mut swaps = Vec::new();
        for location in locations {
            for (file_type, old) in location {
                let new = new_file_path(&self.certs_dir, domain, file_type);
                if !new.exists() {
                    return Err(Error::MissingFile {
                        kind: format!("new {}", file_type),
                        path: new,
                    });
                }
                if !old.exists() {
                    return Err(Error::MissingFile {
                        kind: format!("old {}", file_type),
                        path: old.clone(),
                    });
                }
                swaps.push(Swap {
                    file_type: file_type.clone(),
                    old: old.clone(),
                    new,
                });
            }
        }
        Ok(swaps)
    }

    /// Deploys the new files of one domain, returning whether any changed
    pub fn deploy_domain(&self, domain: &str, locations: &[Location]) -> Result<bool> {
        info!(domain, "deploying new files");
        let swaps = self.plan(domain, locations)?;
        let mut deployed = 0;
        for swap in &swaps {
            if deploy_file(&swap.file_type, &swap.old, &swap.new)? {
                deployed += 1;
            }
        }
        info!(domain, deployed, total = swaps.len(), "domain done");
        Ok(deployed > 0)
    }

    /// Deploys every configured domain, then runs the post-deployment
    /// actions if any file changed.
    pub fn run(&self) -> Result<Summary> {
        info!("starting new file deployment");
        let mut summary = Summary::default();

        for (domain, locations) in &self.config.domains {
            if self.deploy_domain(domain, locations)? {
                summary.changed.push(domain.clone());
            }
        }

        if summary.has_changes() {
            info!(
                actions = self.config.post_actions.len(),
                "starting post-deployment actions"
            );
            summary.actions = actions::run_all(&self.config.post_actions);
        } else {
            info!("no files changed, skipping post-deployment actions");
        }

        info!(changed = ?summary.changed, "new file deployment done");
        Ok(summary)
    }
}
