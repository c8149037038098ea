pub mod action;
pub mod api;
pub mod deploy;
pub mod error;
pub mod record;

pub use action::Action;
pub use deploy::{DeployConfig, Location};
pub use error::Error;
