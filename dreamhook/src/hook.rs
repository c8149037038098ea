use tracing::{info, warn};

use crate::challenge::Manager;
use crate::deploy::Deployer;
use crate::error::Result;
use crate::settings::Settings;

/// Hook events sent by the issuance client, one invocation each
#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Publish the challenge token and wait until it is visible
    #[command(name = "deploy_challenge")]
    DeployChallenge {
        domain: String,
        #[arg(allow_hyphen_values = true)]
        token_filename: String,
        #[arg(allow_hyphen_values = true)]
        token: String,
        #[arg(hide = true, allow_hyphen_values = true)]
        rest: Vec<String>,
    },
    /// Remove the challenge record
    #[command(name = "clean_challenge")]
    CleanChallenge {
        domain: String,
        #[arg(hide = true, allow_hyphen_values = true)]
        rest: Vec<String>,
    },
    /// Copy the newly issued files to their configured locations
    #[command(name = "deploy_cert")]
    DeployCert {
        domain: String,
        privkey: String,
        cert: String,
        fullchain: String,
        #[arg(hide = true, allow_hyphen_values = true)]
        rest: Vec<String>,
    },
    #[command(name = "unchanged_cert")]
    UnchangedCert {
        domain: String,
        #[arg(hide = true, allow_hyphen_values = true)]
        rest: Vec<String>,
    },
    #[command(name = "invalid_challenge")]
    InvalidChallenge {
        domain: String,
        #[arg(allow_hyphen_values = true)]
        error: String,
    },
    #[command(name = "startup_hook")]
    StartupHook {
        #[arg(hide = true, allow_hyphen_values = true)]
        rest: Vec<String>,
    },
    #[command(name = "exit_hook")]
    ExitHook {
        #[arg(hide = true, allow_hyphen_values = true)]
        rest: Vec<String>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::DeployChallenge { .. } => "deploy_challenge",
            Command::CleanChallenge { .. } => "clean_challenge",
            Command::DeployCert { .. } => "deploy_cert",
            Command::UnchangedCert { .. } => "unchanged_cert",
            Command::InvalidChallenge { .. } => "invalid_challenge",
            Command::StartupHook { .. } => "startup_hook",
            Command::ExitHook { .. } => "exit_hook",
        }
    }
}

pub async fn dispatch(command: Command, settings: &Settings) -> Result<()> {
    info!(hook = command.name(), "hook executing");
    match command {
        Command::DeployChallenge { domain, token, .. } => {
            Manager::from_settings(settings)?
                .deploy(&domain, &token)
                .await?
        }
        Command::CleanChallenge { domain, .. } => {
            Manager::from_settings(settings)?.clean(&domain).await?
        }
        Command::DeployCert {
            domain,
            privkey,
            cert,
            fullchain,
            ..
        } => {
            info!(domain, "private key: {}", privkey);
            info!(domain, "certificate: {}", cert);
            info!(domain, "full chain: {}", fullchain);
            Deployer::load(&settings.deploy)?.run()?;
        }
        Command::UnchangedCert { domain, .. } => {
            info!(domain, "existing cert is unchanged, skipping hook");
        }
        Command::InvalidChallenge { domain, error } => {
            warn!(domain, error, "invalid challenge");
        }
        Command::StartupHook { .. } | Command::ExitHook { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::settings::TEST_ENV_MUTEX;

    #[derive(clap::Parser)]
    struct Arguments {
        #[command(subcommand)]
        command: Command,
    }

    fn parse(args: &[&str]) -> std::result::Result<Command, clap::Error> {
        Arguments::try_parse_from(std::iter::once("dreamhook").chain(args.iter().copied()))
            .map(|a| a.command)
    }

    #[test]
    fn test_parse_deploy_challenge() {
        let command = parse(&["deploy_challenge", "example.com", "file", "tokenABC"]).unwrap();
        assert_eq!(
            Command::DeployChallenge {
                domain: "example.com".into(),
                token_filename: "file".into(),
                token: "tokenABC".into(),
                rest: vec![],
            },
            command
        );
    }

    #[test]
    fn test_parse_ignores_trailing_arguments() {
        let command = parse(&[
            "deploy_cert",
            "example.com",
            "/k.pem",
            "/c.pem",
            "/f.pem",
            "/chain.pem",
            "1700000000",
        ])
        .unwrap();
        match command {
            Command::DeployCert {
                domain, fullchain, ..
            } => {
                assert_eq!("example.com", domain);
                assert_eq!("/f.pem", fullchain);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(parse(&["clean_challenge", "example.com", "file", "token"]).is_ok());
        assert!(parse(&["exit_hook"]).is_ok());
    }

    #[test]
    fn test_parse_tokens_starting_with_hyphen() {
        let command = parse(&["deploy_challenge", "example.com", "-abc", "-xyz"]).unwrap();
        assert_eq!(
            Command::DeployChallenge {
                domain: "example.com".into(),
                token_filename: "-abc".into(),
                token: "-xyz".into(),
                rest: vec![],
            },
            command
        );

        let command = parse(&["clean_challenge", "example.com", "-tokenfile", "-tok"]).unwrap();
        assert_eq!(
            Command::CleanChallenge {
                domain: "example.com".into(),
                rest: vec!["-tokenfile".into(), "-tok".into()],
            },
            command
        );
    }

    #[test]
    fn test_parse_invalid_challenge() {
        let command = parse(&["invalid_challenge", "example.com", "-1: bad token"]).unwrap();
        assert_eq!("invalid_challenge", command.name());
    }

    #[test]
    fn test_unknown_operation_is_an_error() {
        assert!(parse(&["request_failure", "500"]).is_err());
        assert!(parse(&["deploy_challenge", "example.com"]).is_err());
    }

    #[tokio::test]
    async fn test_noop_hooks_need_no_configuration() {
        let _guard = TEST_ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_dir(dir.path()).unwrap();
        for args in [
            vec!["startup_hook"],
            vec!["exit_hook"],
            vec!["unchanged_cert", "example.com"],
            vec!["invalid_challenge", "example.com", "{}"],
        ] {
            dispatch(parse(&args).unwrap(), &settings).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_deploy_cert_requires_config_file() {
        let _guard = TEST_ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_dir(dir.path()).unwrap();
        let command = parse(&["deploy_cert", "example.com", "k", "c", "f"]).unwrap();
        assert!(dispatch(command, &settings).await.is_err());
    }
}
