use std::process::Command;

use libdreamhook::Action;
use tracing::{error, info, warn};

/// What happened when an action was run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The process ran; `None` when it was killed by a signal
    Exited(Option<i32>),
    /// The process could not be started
    NotLaunched(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Exited(Some(0)))
    }
}

pub fn run(action: &Action) -> Outcome {
    info!(%action, "attempting action");
    match Command::new(action.program()).args(action.args()).status() {
        Ok(status) => {
            let outcome = Outcome::Exited(status.code());
            if outcome.is_success() {
                info!(%action, status = ?status.code(), "action exited");
            } else {
                warn!(%action, status = ?status.code(), "action exited");
            }
            outcome
        }
        Err(err) => {
            error!(error=?err, %action, "launching action");
            Outcome::NotLaunched(err.to_string())
        }
    }
}

/// Runs every action in order. A failing action never stops the ones after it.
pub fn run_all(actions: &[Action]) -> Vec<Outcome> {
    actions.iter().map(run).collect()
}
